//! Catalog client for the product catalog REST service.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{clean_base_url, CatalogClientConfig};
use crate::error::{CatalogClientError, RequestError};
use crate::mock::MockClient;
use crate::types::*;

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The complete catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog service via [`CatalogClient`]
/// - **Mock**: canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Liveness probe of the catalog service.
    ///
    /// The payload is not interpreted.
    async fn health_check(&self) -> Result<serde_json::Value, RequestError>;

    /// Get all products.
    async fn products(&self) -> Result<Vec<Product>, RequestError>;

    /// Get the products in a category.
    ///
    /// Matching is done by the server.
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, RequestError>;

    /// Get a single product.
    ///
    /// An unknown id is reported by the server as a 404 [RequestError].
    async fn product(&self, id: ProductId) -> Result<Product, RequestError>;

    /// Create a product and return it with its server assigned id.
    async fn create_product(&self, product: &NewProduct) -> Result<Product, RequestError>;

    /// Time a [ClientTrait::health_check], never failing.
    async fn test_connection(&self) -> ConnectionTest {
        let start = Instant::now();
        match self.health_check().await {
            Ok(_) => {
                let duration = start.elapsed();
                debug!(?duration, "connection test successful");
                ConnectionTest::Ok { duration }
            },
            Err(error) => {
                warn!(%error, "connection test failed");
                ConnectionTest::Failed { error }
            },
        }
    }
}

/// Path of the category listing, with `category` encoded as a URI component.
pub fn category_path(category: &str) -> String {
    format!(
        "/products/category/{}",
        url_escape::encode_component(category)
    )
}

/// Check that `category` can be addressed as a path segment.
///
/// URL parsing resolves `.` and `..` segments, encoded or not,
/// so those labels would silently address a different endpoint.
pub fn check_category(category: &str) -> Result<(), RequestError> {
    match category {
        "." | ".." => Err(RequestError::invalid_request(format!(
            "category '{category}' cannot be requested"
        ))),
        _ => Ok(()),
    }
}

/// A client for the catalog service.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url = clean_base_url(&config.catalog_url);
        Url::parse(&base_url).map_err(|source| CatalogClientError::InvalidUrl {
            url: base_url.clone(),
            source,
        })?;

        let http = build_http_client(&config)?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Get the normalized base URL requests are sent to.
    pub fn catalog_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and return the status and body of a 2xx response.
    async fn send(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), RequestError> {
        debug!(method, url, "sending catalog request");

        let response = request.send().await.map_err(|err| {
            let err = RequestError::from_reqwest(err, self.config.timeout);
            warn!(method, url, error = %err, "catalog request failed");
            err
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            let err = RequestError {
                status: Some(status),
                ..RequestError::from_reqwest(err, self.config.timeout)
            };
            warn!(method, url, error = %err, "reading catalog response failed");
            err
        })?;

        if !status.is_success() {
            // The body may well be an HTML error page, only keep a structured message.
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_string()
                });
            warn!(method, url, %status, reason = %message, "catalog request failed");
            return Err(RequestError::response(status, message));
        }

        debug!(method, url, %status, "catalog response received");
        Ok((status, body.to_vec()))
    }

    async fn send_for_data<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, RequestError> {
        let (status, body) = self.send(method, url, request).await?;

        let envelope: Envelope<T> = serde_json::from_slice(&body).map_err(|err| {
            warn!(method, url, %status, %err, "malformed catalog response");
            RequestError::response(status, format!("malformed response body: {err}"))
        })?;

        if let Some(count) = envelope.count {
            debug!(method, url, count, "catalog response count");
        }

        envelope.into_data(status).inspect_err(|err| {
            warn!(method, url, error = %err, "catalog reported failure");
        })
    }
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all)]
    async fn health_check(&self) -> Result<serde_json::Value, RequestError> {
        let url = self.endpoint("/health");
        let (status, body) = self.send("GET", &url, self.http.get(&url)).await?;
        serde_json::from_slice(&body).map_err(|err| {
            RequestError::response(status, format!("malformed response body: {err}"))
        })
    }

    #[instrument(skip_all)]
    async fn products(&self) -> Result<Vec<Product>, RequestError> {
        let url = self.endpoint("/products");
        let products: Vec<Product> = self
            .send_for_data("GET", &url, self.http.get(&url))
            .await?;
        debug!(n_products = products.len(), "fetched products");
        Ok(products)
    }

    #[instrument(skip_all, fields(category = %category))]
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, RequestError> {
        check_category(category)?;
        let url = self.endpoint(&category_path(category));
        let products: Vec<Product> = self
            .send_for_data("GET", &url, self.http.get(&url))
            .await?;
        debug!(n_products = products.len(), "fetched category products");
        Ok(products)
    }

    #[instrument(skip_all, fields(%id))]
    async fn product(&self, id: ProductId) -> Result<Product, RequestError> {
        let url = self.endpoint(&format!("/products/{id}"));
        self.send_for_data("GET", &url, self.http.get(&url)).await
    }

    #[instrument(skip_all, fields(name = %product.name))]
    async fn create_product(&self, product: &NewProduct) -> Result<Product, RequestError> {
        product.check_required().inspect_err(|err| {
            warn!(error = %err, "refusing to submit product");
        })?;

        let url = self.endpoint("/products");
        let created: Product = self
            .send_for_data("POST", &url, self.http.post(&url).json(product))
            .await?;
        debug!(id = %created.id, "created product");
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client with the catalog's fixed JSON headers and timeout.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key)
                .map_err(|_| CatalogClientError::InvalidHeader(key.clone()))?,
            HeaderValue::from_str(value)
                .map_err(|_| CatalogClientError::InvalidHeader(key.clone()))?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        timeout = ?config.timeout,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.timeout)
        .timeout(config.timeout);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder.build().map_err(CatalogClientError::Build)
}

#[cfg(test)]
pub mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn client_config(url: &str) -> CatalogClientConfig {
        CatalogClientConfig::new(url)
    }

    fn widget_json() -> serde_json::Value {
        json!({
            "id": 1,
            "name": "Widget",
            "price": 9.99,
            "category": "Tools",
            "stock_quantity": 5,
        })
    }

    fn widget() -> Product {
        Product {
            id: ProductId(1),
            name: "Widget".to_string(),
            description: None,
            price: 9.99,
            category: Some("Tools".to_string()),
            image_url: None,
            stock_quantity: 5,
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = CatalogClient::new(client_config("not a url"));
        assert!(
            matches!(result, Err(CatalogClientError::InvalidUrl { .. })),
            "expected InvalidUrl, found: {result:?}"
        );
    }

    #[test]
    fn base_url_is_cleaned() {
        let client = CatalogClient::new(client_config("http://localhost:5000/api")).unwrap();
        assert_eq!(client.catalog_url(), "http://localhost:5000");
    }

    #[test]
    fn category_path_is_percent_encoded() {
        assert_eq!(
            category_path("Home & Garden"),
            "/products/category/Home%20%26%20Garden"
        );
        assert_eq!(category_path("a/b?c#d"), "/products/category/a%2Fb%3Fc%23d");
    }

    proptest! {
        #[test]
        fn category_path_round_trips(label in "\\PC*") {
            let path = category_path(&label);
            let segment = path.strip_prefix("/products/category/").unwrap();
            prop_assert!(!segment.contains('/'));
            prop_assert_eq!(url_escape::decode(segment).to_string(), label);
        }
    }

    #[tokio::test]
    async fn products_returns_envelope_data() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/products")
                    .header("accept", "application/json")
                    .header("content-type", "application/json");
                then.status(200)
                    .json_body(json!({"success": true, "data": [widget_json()], "count": 1}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let products = client.products().await.unwrap();

        assert_eq!(products, vec![widget()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn products_by_category_hits_category_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/products/category/");
                then.status(200)
                    .json_body(json!({"success": true, "data": [widget_json()]}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let products = client.products_by_category("Home & Garden").await.unwrap();

        assert_eq!(products, vec![widget()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dot_segment_category_is_not_sent() {
        let server = MockServer::start_async().await;
        let unfiltered = server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/products");
                then.status(200)
                    .json_body(json!({"success": true, "data": [widget_json()]}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        for label in [".", ".."] {
            let err = client.products_by_category(label).await.unwrap_err();
            assert_eq!(err.status, None, "label {label:?}");
        }
        assert_eq!(unfiltered.hits_async().await, 0);

        // dots next to other characters stay a regular segment
        assert_eq!(category_path("..."), "/products/category/...");
        assert!(check_category("a.b").is_ok());
    }

    #[tokio::test]
    async fn product_by_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/products/1");
                then.status(200)
                    .json_body(json!({"success": true, "data": widget_json()}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let product = client.product(ProductId(1)).await.unwrap();

        assert_eq!(product, widget());
        mock.assert_async().await;
    }

    /// Not found is an ordinary [RequestError] with the 404 status
    #[tokio::test]
    async fn product_not_found_is_request_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/products/42");
                then.status(404)
                    .json_body(json!({"success": false, "error": "404 Not Found: product"}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let err = client.product(ProductId(42)).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.message, "404 Not Found: product");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_without_json_body_uses_reason() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/products");
                then.status(500).body("<html>oops</html>");
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let err = client.products().await.unwrap_err();

        assert_eq!(
            err,
            RequestError::response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_request_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/products");
                then.status(200)
                    .json_body(json!({"success": false, "error": "database unavailable"}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let err = client.products().await.unwrap_err();

        assert_eq!(err.status, Some(StatusCode::OK));
        assert_eq!(err.message, "database unavailable");
    }

    #[tokio::test]
    async fn malformed_body_is_request_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/products");
                then.status(200).json_body(json!({"items": []}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let err = client.products().await.unwrap_err();

        assert_eq!(err.status, Some(StatusCode::OK));
        assert!(
            err.message.starts_with("malformed response body"),
            "unexpected message: {}",
            err.message
        );
    }

    #[tokio::test]
    async fn request_fails_after_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/products");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"success": true, "data": []}));
            })
            .await;

        let config = CatalogClientConfig {
            timeout: Duration::from_millis(200),
            ..client_config(&server.base_url())
        };
        let client = CatalogClient::new(config).unwrap();
        let err = client.products().await.unwrap_err();

        assert_eq!(err.status, None);
        assert!(
            err.message.contains("timed out"),
            "unexpected message: {}",
            err.message
        );
    }

    #[tokio::test]
    async fn unreachable_server_has_no_status() {
        // Nothing listens on the discard port.
        let client = CatalogClient::new(client_config("http://127.0.0.1:9")).unwrap();
        let err = client.products().await.unwrap_err();
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn create_product_posts_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/products").json_body(json!({
                    "name": "Widget",
                    "price": 9.99,
                    "category": "Tools",
                    "stock_quantity": 5,
                }));
                then.status(201)
                    .json_body(json!({"success": true, "data": widget_json()}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let created = client
            .create_product(&NewProduct {
                name: "Widget".to_string(),
                description: None,
                price: 9.99,
                category: "Tools".to_string(),
                image_url: None,
                stock_quantity: 5,
            })
            .await
            .unwrap();

        assert_eq!(created, widget());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_product_with_empty_name_is_not_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/products");
                then.status(201)
                    .json_body(json!({"success": true, "data": widget_json()}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let err = client
            .create_product(&NewProduct {
                name: String::new(),
                description: None,
                price: 5.0,
                category: "Books".to_string(),
                image_url: None,
                stock_quantity: 0,
            })
            .await
            .unwrap_err();

        assert_eq!(err.status, None);
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn health_check_returns_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200)
                    .json_body(json!({"status": "healthy", "message": "Catalog server is running"}));
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let payload = client.health_check().await.unwrap();
        assert_eq!(payload["status"], "healthy");

        assert!(matches!(
            client.test_connection().await,
            ConnectionTest::Ok { .. }
        ));
    }

    #[tokio::test]
    async fn test_connection_reports_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(503);
            })
            .await;

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        match client.test_connection().await {
            ConnectionTest::Failed { error } => {
                assert_eq!(error.status, Some(StatusCode::SERVICE_UNAVAILABLE))
            },
            other => panic!("expected failed connection test, found: {other:?}"),
        }
    }

    #[tokio::test]
    async fn configured_headers_sent_with_requests() {
        let extra_headers = BTreeMap::from([("x-api-key".to_string(), "secret".to_string())]);

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.header("x-api-key", "secret");
                then.status(200).json_body(json!({"success": true, "data": []}));
            })
            .await;

        let config = CatalogClientConfig {
            extra_headers,
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.products().await;
        mock.assert_async().await;
    }

    #[test]
    fn invalid_header_value_fails_construction() {
        let config = CatalogClientConfig {
            extra_headers: BTreeMap::from([("x-api-key".to_string(), "line\nbreak".to_string())]),
            ..client_config("http://localhost:5000")
        };
        assert!(matches!(
            CatalogClient::new(config),
            Err(CatalogClientError::InvalidHeader(name)) if name == "x-api-key"
        ));
    }

    #[tokio::test]
    async fn user_agent_sent_with_requests() {
        let expected_agent = "catalog/0.1.0";

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.header("user-agent", expected_agent);
                then.status(200).json_body(json!({"success": true, "data": []}));
            })
            .await;

        let config = CatalogClientConfig {
            user_agent: Some(expected_agent.to_owned()),
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.products().await;
        mock.assert_async().await;
    }
}
