//! View state of a product catalog page.
//!
//! [CatalogView] keeps the products, the derived categories,
//! the selected filter and the loading and error state of one page
//! in sync with the catalog service.
//! [form] validates product candidates before they are submitted.

pub mod form;
mod state;
mod view;

pub use state::{derive_categories, CategoryFilter, ViewState, ViewStatus, ALL_CATEGORIES};
pub use view::CatalogView;
