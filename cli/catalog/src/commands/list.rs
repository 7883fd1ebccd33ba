use anyhow::{bail, Result};
use bpaf::Bpaf;
use catalog_client::Client;
use catalog_view::{ViewStatus, ALL_CATEGORIES};
use itertools::Itertools;
use log::debug;
use tracing::instrument;

use super::mount_view;
use crate::config::Config;
use crate::utils::message;
use crate::utils::render::DisplayView;

// List the products of the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct List {
    /// Display the products as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Only list products of this category, 'all' lists every product
    #[bpaf(long, short, argument("category"))]
    pub category: Option<String>,
}

impl List {
    #[instrument(name = "list", fields(json = self.json, category = ?self.category), skip_all)]
    pub async fn handle(self, config: Config, client: Client) -> Result<()> {
        let view = mount_view(&config, client);

        view.load_all().await;
        if let Some(category) = &self.category {
            let unknown = {
                let state = view.state();
                state.status() == ViewStatus::Loaded
                    && category != ALL_CATEGORIES
                    && !state.categories.contains(category.as_str())
            };
            if unknown {
                message::warning(format!("'{category}' is not one of the listed categories"));
            }
            debug!("selecting category: {category}");
            view.select_category(category).await;
        }

        let state = view.snapshot();
        if let Some(error) = &state.error {
            bail!(error.clone());
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&state.products)?);
            return Ok(());
        }

        println!("{}", DisplayView(&state));
        if self.category.is_none() && !state.categories.is_empty() {
            message::plain(format!(
                "\nCategories: {}",
                state.categories.iter().join(", ")
            ));
        }
        Ok(())
    }
}
