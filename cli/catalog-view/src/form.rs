//! Validation and submission of new products.

use catalog_client::{ClientTrait, NewProduct, Product, RequestError};
use thiserror::Error;
use tracing::debug;

/// Raw text of a product creation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub stock_quantity: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Product name is required")]
    MissingName,
    #[error("Price '{0}' is not a valid non-negative number")]
    InvalidPrice(String),
    #[error("Category is required")]
    MissingCategory,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("Failed to create product")]
    Request(#[source] RequestError),
}

impl ProductForm {
    /// Turn the form into a product candidate.
    ///
    /// Name, price and category are required.
    /// The stock quantity is read from its leading digits, `"3.7"` is 3;
    /// a blank, negative or non-numeric quantity counts as 0.
    pub fn parse(&self) -> Result<NewProduct, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(|| ValidationError::InvalidPrice(self.price.clone()))?;

        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }

        let stock_quantity = leading_quantity(&self.stock_quantity);

        Ok(NewProduct {
            name: name.to_string(),
            description: non_blank(&self.description),
            price,
            category: category.to_string(),
            image_url: non_blank(&self.image_url),
            stock_quantity,
        })
    }
}

/// The integer formed by the leading digits of `value`, or 0.
fn leading_quantity(value: &str) -> u32 {
    let value = value.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    digits.parse().unwrap_or(0)
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Validate `form` and create the product it describes.
///
/// Nothing is sent if validation fails.
pub async fn submit(client: &impl ClientTrait, form: &ProductForm) -> Result<Product, FormError> {
    let candidate = form.parse()?;
    debug!(name = %candidate.name, "submitting product");
    client
        .create_product(&candidate)
        .await
        .map_err(FormError::Request)
}
