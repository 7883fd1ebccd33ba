//! A catalog client that answers from a queue of canned responses.
//!
//! Responses are consumed in call order.
//! They can be pushed by tests or read from a JSON file,
//! which lets the CLI run against fixed data without a server.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::client::{check_category, ClientTrait};
use crate::error::RequestError;
use crate::types::{NewProduct, Product, ProductId};

// Clones share the queue and the request log,
// so a test can keep a clone to inspect `requests()` after handing one out.
type MockField<T> = Arc<Mutex<T>>;

/// A canned answer of the [MockClient].
///
/// Variants are tried in order when reading mock data:
/// an array is [Response::Products], an object with product fields a [Response::Product],
/// an object with a `message` (and optional numeric `status`) an [Response::Error].
/// Anything else, e.g. `{"status": "healthy"}`, is a [Response::Health] payload,
/// so health payloads in mock files must not carry a `message` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Products(Vec<Product>),
    Product(Product),
    Error(GenericResponse),
    Health(serde_json::Value),
}

/// A canned error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    /// HTTP status, `None` for a failure without response
    pub status: Option<u16>,
    pub message: String,
}

impl TryFrom<GenericResponse> for RequestError {
    type Error = MockDataError;

    fn try_from(value: GenericResponse) -> Result<Self, Self::Error> {
        let status = value
            .status
            .map(|code| {
                StatusCode::from_u16(code)
                    .map_err(|_| MockDataError::InvalidData("invalid status code".into()))
            })
            .transpose()?;
        Ok(RequestError {
            message: value.message,
            status,
        })
    }
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the mock data file
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
    /// The data was parsed as JSON but it wasn't semantically valid
    #[error("invalid mocked data: {0}")]
    InvalidData(String),
}

/// A request received by the [MockClient].
#[derive(Debug, Clone, PartialEq)]
pub enum MockRequest {
    Health,
    Products,
    ProductsByCategory(String),
    Product(ProductId),
    CreateProduct(NewProduct),
}

#[derive(Debug)]
struct Queued {
    response: Response,
    delay: Option<Duration>,
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<Vec<Response>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    serde_json::from_str(&contents).map_err(MockDataError::ParseJson)
}

/// A catalog client that can be seeded with mock responses
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    mock_responses: MockField<VecDeque<Queued>>,
    requests: MockField<Vec<MockRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client answering with the responses stored at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MockDataError> {
        let path = path.as_ref();
        let responses = read_mock_responses(path)?;
        debug!(path = %path.display(), n_responses = responses.len(), "read mock responses");
        let client = Self::new();
        for response in responses {
            client.push(response, None);
        }
        Ok(client)
    }

    fn push(&self, response: Response, delay: Option<Duration>) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(Queued { response, delay });
    }

    /// Push a new response into the list of mock responses
    pub fn push_products_response(&self, products: Vec<Product>) {
        self.push(Response::Products(products), None);
    }

    /// Push a product list answered only after `delay`
    pub fn push_delayed_products_response(&self, products: Vec<Product>, delay: Duration) {
        self.push(Response::Products(products), Some(delay));
    }

    /// Push a new response into the list of mock responses
    pub fn push_product_response(&self, product: Product) {
        self.push(Response::Product(product), None);
    }

    /// Push a new response into the list of mock responses
    pub fn push_health_response(&self, payload: serde_json::Value) {
        self.push(Response::Health(payload), None);
    }

    /// Push an error response, `status: None` simulates a transport failure
    pub fn push_error_response(&self, status: Option<u16>, message: impl Into<String>) {
        self.push(
            Response::Error(GenericResponse {
                status,
                message: message.into(),
            }),
            None,
        );
    }

    /// Push an error response answered only after `delay`
    pub fn push_delayed_error_response(
        &self,
        status: Option<u16>,
        message: impl Into<String>,
        delay: Duration,
    ) {
        self.push(
            Response::Error(GenericResponse {
                status,
                message: message.into(),
            }),
            Some(delay),
        );
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .clone()
    }

    /// Number of responses not consumed yet.
    pub fn pending_responses(&self) -> usize {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .len()
    }

    /// Record `request` and wait for the next queued response.
    async fn answer(&self, request: MockRequest) -> Result<Response, RequestError> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .push(request.clone());

        let queued = self
            .mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front();

        let Some(Queued { response, delay }) = queued else {
            return Err(RequestError::transport(format!(
                "no mock response left for {request:?}"
            )));
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Response::Error(err) => match RequestError::try_from(err) {
                Ok(err) => Err(err),
                Err(invalid) => Err(RequestError::transport(invalid.to_string())),
            },
            other => Ok(other),
        }
    }
}

fn unexpected(expected: &str, found: Response) -> RequestError {
    RequestError::transport(format!(
        "expected {expected} mock response, found {found:?}"
    ))
}

impl ClientTrait for MockClient {
    async fn health_check(&self) -> Result<serde_json::Value, RequestError> {
        match self.answer(MockRequest::Health).await? {
            Response::Health(payload) => Ok(payload),
            other => Err(unexpected("health", other)),
        }
    }

    async fn products(&self) -> Result<Vec<Product>, RequestError> {
        match self.answer(MockRequest::Products).await? {
            Response::Products(products) => Ok(products),
            other => Err(unexpected("products", other)),
        }
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, RequestError> {
        check_category(category)?;
        match self
            .answer(MockRequest::ProductsByCategory(category.to_string()))
            .await?
        {
            Response::Products(products) => Ok(products),
            other => Err(unexpected("products", other)),
        }
    }

    async fn product(&self, id: ProductId) -> Result<Product, RequestError> {
        match self.answer(MockRequest::Product(id)).await? {
            Response::Product(product) => Ok(product),
            other => Err(unexpected("product", other)),
        }
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RequestError> {
        product.check_required()?;
        match self
            .answer(MockRequest::CreateProduct(product.clone()))
            .await?
        {
            Response::Product(product) => Ok(product),
            other => Err(unexpected("product", other)),
        }
    }
}
