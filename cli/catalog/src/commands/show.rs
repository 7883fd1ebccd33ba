use anyhow::{bail, Context, Result};
use bpaf::Bpaf;
use catalog_client::{Client, ClientTrait, ProductId};
use tracing::instrument;

use crate::utils::render::DisplayProduct;

// Show details about a single product
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Display the product as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Identifier of the product
    #[bpaf(positional("id"))]
    pub id: ProductId,
}

impl Show {
    #[instrument(name = "show", fields(id = %self.id), skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        let product = match client.product(self.id).await {
            Err(err) if err.is_not_found() => {
                bail!("There is no product #{} in the catalog", self.id)
            },
            result => result.with_context(|| format!("Failed to load product #{}", self.id))?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&product)?);
        } else {
            println!("{}", DisplayProduct(&product));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use catalog_client::MockClient;

    use super::*;

    #[tokio::test]
    async fn unknown_product_is_reported_as_missing() {
        let mock = MockClient::new();
        mock.push_error_response(Some(404), "Product not found");

        let err = Show {
            json: false,
            id: ProductId(42),
        }
        .handle(Client::from(mock))
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "There is no product #42 in the catalog");
    }

    #[tokio::test]
    async fn other_failures_keep_the_request_error() {
        let mock = MockClient::new();
        mock.push_error_response(Some(500), "boom");

        let err = Show {
            json: false,
            id: ProductId(42),
        }
        .handle(Client::from(mock))
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Failed to load product #42");
        assert_eq!(
            err.root_cause().to_string(),
            "Server Error (500 Internal Server Error): boom"
        );
    }
}
