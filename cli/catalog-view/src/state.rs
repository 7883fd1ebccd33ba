use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use catalog_client::Product;

/// Filter value selecting every product.
pub const ALL_CATEGORIES: &str = "all";

/// The category filter selected in a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for CategoryFilter {
    fn from(label: &str) -> Self {
        if label == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(label.to_string())
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "{ALL_CATEGORIES}"),
            CategoryFilter::Category(label) => write!(f, "{label}"),
        }
    }
}

/// What the presentation layer should show for a [ViewState].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Loaded,
    Failed,
}

/// Snapshot driving the presentation of a catalog view.
///
/// `products` and `categories` are only ever replaced together
/// by a successful unfiltered load,
/// or `products` alone by a successful filtered load.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Current result set, in server order
    pub products: Vec<Product>,
    /// Distinct non-empty categories of the last unfiltered load
    pub categories: BTreeSet<String>,
    pub filter: CategoryFilter,
    /// Whether the latest fetch is still outstanding
    pub loading: bool,
    /// User facing message if the latest fetch failed
    pub error: Option<String>,
}

impl Default for ViewState {
    /// A freshly mounted view, waiting for its first load.
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: BTreeSet::new(),
            filter: CategoryFilter::All,
            loading: true,
            error: None,
        }
    }
}

impl ViewState {
    pub fn status(&self) -> ViewStatus {
        if self.loading {
            ViewStatus::Loading
        } else if self.error.is_some() {
            ViewStatus::Failed
        } else {
            ViewStatus::Loaded
        }
    }
}

/// Distinct non-empty categories of `products`.
pub fn derive_categories(products: &[Product]) -> BTreeSet<String> {
    products
        .iter()
        .filter_map(Product::category_label)
        .map(ToString::to_string)
        .collect()
}
