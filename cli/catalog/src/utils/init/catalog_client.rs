use anyhow::{Context, Result};
use catalog_client::{CatalogClient, Client, MockClient};
use log::debug;

use crate::config::Config;

/// Create the client commands talk to.
///
/// With `mock_data` configured, requests are answered from that file
/// instead of the catalog service.
pub fn init_catalog_client(config: &Config) -> Result<Client> {
    if let Some(path) = &config.mock_data {
        debug!("using mock catalog client with responses from {}", path.display());
        let client = MockClient::from_file(path)
            .with_context(|| format!("Could not load mock responses from {}", path.display()))?;
        return Ok(Client::from(client));
    }

    let client_config = config.client_config();
    debug!(
        "using catalog client for url: {}, timeout: {:?}",
        client_config.catalog_url, client_config.timeout
    );
    let client = CatalogClient::new(client_config).context("Could not create catalog client")?;
    Ok(Client::from(client))
}
