use anyhow::{bail, Result};
use bpaf::Bpaf;
use catalog_client::{Client, ClientTrait, ConnectionTest};
use tracing::instrument;

use crate::utils::message;

// Check that the catalog service is reachable
#[derive(Debug, Bpaf, Clone)]
pub struct Health {}

impl Health {
    #[instrument(name = "health", skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        let target = match &client {
            Client::Catalog(catalog) => catalog.catalog_url().to_string(),
            Client::Mock(_) => "mock catalog".to_string(),
        };

        match client.test_connection().await {
            ConnectionTest::Ok { duration } => {
                message::updated(format!(
                    "Connected to {target} in {}ms",
                    duration.as_millis()
                ));
                Ok(())
            },
            ConnectionTest::Failed { error } => bail!("Could not reach {target}: {error}"),
        }
    }
}
