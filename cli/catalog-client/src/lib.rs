//! HTTP client for the product catalog service.
//!
//! This crate provides:
//! - [ClientTrait], the catalog operations used by views and commands
//! - [CatalogClient], the HTTP+JSON implementation with a fixed request timeout
//! - [MockClient], a queue of canned responses for tests and offline use
//! - [RequestError], the single failure type of every request
//!
//! ## Usage
//!
//! ```ignore
//! use catalog_client::{CatalogClient, CatalogClientConfig, ClientTrait};
//!
//! let client = CatalogClient::new(CatalogClientConfig::new("http://localhost:5000"))?;
//! let products = client.products_by_category("Home & Garden").await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod types;

pub use client::{category_path, check_category, CatalogClient, Client, ClientTrait};
pub use config::{clean_base_url, CatalogClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::{CatalogClientError, RequestError};
pub use mock::{GenericResponse, MockClient, MockDataError, MockRequest, Response};
pub use types::{ConnectionTest, NewProduct, Product, ProductId};
