//! Catalog interaction types.
//!
//! These types describe the catalog service's JSON payloads.
//! Responses arrive wrapped in an [Envelope],
//! which is validated before any data reaches the caller.

use derive_more::{Display, From, FromStr};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::error::RequestError;

/// Server assigned product identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, FromStr, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

/// A catalog item as returned by the service.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub stock_quantity: u32,
}

impl Product {
    /// The product's category, if it has a non-empty one.
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// A product candidate submitted for creation.
///
/// The identifier is assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub stock_quantity: u32,
}

impl NewProduct {
    /// Check the fields the service requires.
    pub fn check_required(&self) -> Result<(), RequestError> {
        if self.name.trim().is_empty() {
            return Err(RequestError::invalid_request("product name is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(RequestError::invalid_request(
                "product price must be a non-negative number",
            ));
        }
        if self.category.trim().is_empty() {
            return Err(RequestError::invalid_request("product category is required"));
        }
        Ok(())
    }
}

/// Response body of every product endpoint.
///
/// Only `success` is mandatory;
/// `data` must be present whenever `success` is true.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl<T> Envelope<T> {
    pub(crate) fn into_data(self, status: StatusCode) -> Result<T, RequestError> {
        match self {
            Envelope {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            Envelope { success: true, .. } => Err(RequestError::response(
                status,
                "malformed response body: missing 'data'",
            )),
            Envelope {
                success: false,
                error,
                ..
            } => Err(RequestError::response(
                status,
                error.unwrap_or_else(|| "request was not successful".to_string()),
            )),
        }
    }
}

/// Error body of a non-2xx response, if the server sent one.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

/// Outcome of [crate::ClientTrait::test_connection].
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionTest {
    Ok { duration: std::time::Duration },
    Failed { error: RequestError },
}
