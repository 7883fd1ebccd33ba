use std::fmt::{self, Display};

use anyhow::{bail, Result};
use bpaf::Bpaf;
use catalog_client::Client;
use catalog_view::{CategoryFilter, ViewState, ViewStatus};
use inquire::InquireError;
use log::debug;
use tracing::instrument;

use super::mount_view;
use crate::config::Config;
use crate::utils::dialog::{Dialog, Select};
use crate::utils::message;
use crate::utils::render::DisplayView;

// Browse the catalog interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {}

/// An action offered below the product list.
#[derive(Debug, Clone, PartialEq)]
enum BrowseChoice {
    Filter(CategoryFilter),
    TryAgain,
    SignOut,
}

impl Display for BrowseChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowseChoice::Filter(CategoryFilter::All) => write!(f, "All Products"),
            BrowseChoice::Filter(CategoryFilter::Category(label)) => write!(f, "{label}"),
            BrowseChoice::TryAgain => write!(f, "Try again"),
            BrowseChoice::SignOut => write!(f, "Sign out"),
        }
    }
}

/// Actions for `state`, the current filter first.
fn choices(state: &ViewState) -> Vec<BrowseChoice> {
    let mut choices = Vec::new();
    if state.status() == ViewStatus::Failed {
        choices.push(BrowseChoice::TryAgain);
    }

    let filters = std::iter::once(CategoryFilter::All).chain(
        state
            .categories
            .iter()
            .map(|label| CategoryFilter::Category(label.clone())),
    );
    let (current, others): (Vec<_>, Vec<_>) = filters.partition(|filter| *filter == state.filter);
    choices.extend(current.into_iter().chain(others).map(BrowseChoice::Filter));

    choices.push(BrowseChoice::SignOut);
    choices
}

impl Browse {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, config: Config, client: Client) -> Result<()> {
        let identity = config.auth.require()?;
        debug!(
            "identity provider: user pool {} (client {}), identity pool {} in {}",
            identity.user_pool_id,
            identity.user_pool_client_id,
            identity.identity_pool_id,
            identity.region
        );

        if !Dialog::can_prompt() {
            bail!("'catalog browse' needs an interactive terminal, use 'catalog list' instead");
        }

        let view = mount_view(&config, client);
        message::plain(format!("Welcome, {}!", config.user_name()));
        view.load_all().await;

        loop {
            let state = view.snapshot();
            println!("\n{}\n", DisplayView(&state));

            let dialog = Dialog {
                message: "Browse by category",
                help_message: Some("Pick a category or sign out"),
                typed: Select {
                    options: choices(&state),
                },
            };

            match dialog.prompt().await {
                Ok(BrowseChoice::Filter(filter)) => view.select_category(&filter.to_string()).await,
                Ok(BrowseChoice::TryAgain) => view.retry().await,
                Ok(BrowseChoice::SignOut)
                | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    message::plain("Signed out.");
                    return Ok(());
                },
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn state(filter: CategoryFilter, error: Option<&str>) -> ViewState {
        ViewState {
            products: vec![],
            categories: BTreeSet::from(["Books".to_string(), "Tools".to_string()]),
            filter,
            loading: false,
            error: error.map(ToString::to_string),
        }
    }

    #[test]
    fn all_products_first_when_unfiltered() {
        let choices = choices(&state(CategoryFilter::All, None));
        assert_eq!(
            choices.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["All Products", "Books", "Tools", "Sign out"]
        );
    }

    #[test]
    fn current_category_first() {
        let choices = choices(&state(CategoryFilter::Category("Tools".to_string()), None));
        assert_eq!(choices, vec![
            BrowseChoice::Filter(CategoryFilter::Category("Tools".to_string())),
            BrowseChoice::Filter(CategoryFilter::All),
            BrowseChoice::Filter(CategoryFilter::Category("Books".to_string())),
            BrowseChoice::SignOut,
        ]);
    }

    #[test]
    fn failed_view_offers_retry() {
        let choices = choices(&state(CategoryFilter::All, Some("Failed to load products")));
        assert_eq!(choices.first(), Some(&BrowseChoice::TryAgain));
        assert_eq!(choices.last(), Some(&BrowseChoice::SignOut));
    }
}
