//! The catalog view controller.
//!
//! A [CatalogView] owns the [ViewState] of one mounted view
//! and drives it through loads and filter selections.
//!
//! Operations take `&self` so that several of them can be in flight at once,
//! e.g. when a user clicks through filters faster than the server answers.
//! Every operation draws a new sequence token when it starts;
//! only the completion carrying the latest token is applied,
//! completions of superseded operations are dropped entirely.

use std::cell::{Cell, Ref, RefCell};

use catalog_client::{ClientTrait, Product, RequestError};
use tracing::{debug, instrument, warn};

use crate::state::{derive_categories, CategoryFilter, ViewState};

/// Whether a view probes the service before its first fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preflight {
    Disabled,
    Pending,
    Done,
}

/// The kind of product fetch an operation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fetch {
    /// Mount or reload, derives the category set.
    Load,
    /// The `all` filter, keeps the category set.
    All,
    Category(String),
}

impl Fetch {
    fn failure_context(&self) -> String {
        match self {
            Fetch::Load | Fetch::All => "Failed to load products".to_string(),
            Fetch::Category(label) => format!("Failed to load products in category \"{label}\""),
        }
    }
}

pub struct CatalogView<C> {
    client: C,
    state: RefCell<ViewState>,
    latest: Cell<u64>,
    preflight: Cell<Preflight>,
}

impl<C: ClientTrait> CatalogView<C> {
    /// Mount a view, in the loading state without data.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: RefCell::new(ViewState::default()),
            latest: Cell::new(0),
            preflight: Cell::new(Preflight::Disabled),
        }
    }

    /// Probe the service with a health check before the first product fetch.
    ///
    /// A failed probe never prevents the fetch.
    /// If the fetch fails as well, its error message names the probe failure.
    pub fn with_preflight_health_check(self) -> Self {
        self.preflight.set(Preflight::Pending);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Borrow the current state.
    ///
    /// The borrow must be released before an operation completes.
    pub fn state(&self) -> Ref<'_, ViewState> {
        self.state.borrow()
    }

    /// Clone the current state.
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Load all products and derive the category set from them.
    #[instrument(skip_all)]
    pub async fn load_all(&self) {
        let token = self.begin(CategoryFilter::All);
        let probe_failure = self.run_preflight().await;
        let result = self.client.products().await;
        self.complete(token, Fetch::Load, result, probe_failure);
    }

    /// Select a filter and load the products matching it.
    ///
    /// The category set is left as derived by the last [Self::load_all].
    #[instrument(skip_all, fields(category = label))]
    pub async fn select_category(&self, label: &str) {
        let filter = CategoryFilter::from(label);
        let token = self.begin(filter.clone());
        let probe_failure = self.run_preflight().await;

        let (fetch, result) = match filter {
            CategoryFilter::All => (Fetch::All, self.client.products().await),
            CategoryFilter::Category(label) => {
                let result = self.client.products_by_category(&label).await;
                (Fetch::Category(label), result)
            },
        };
        self.complete(token, fetch, result, probe_failure);
    }

    /// Repeat the fetch for the current filter.
    pub async fn retry(&self) {
        let filter = self.state.borrow().filter.clone();
        match filter {
            CategoryFilter::All => self.load_all().await,
            CategoryFilter::Category(label) => self.select_category(&label).await,
        }
    }

    /// Start an operation and return its sequence token.
    fn begin(&self, filter: CategoryFilter) -> u64 {
        let token = self.latest.get() + 1;
        self.latest.set(token);

        let mut state = self.state.borrow_mut();
        state.filter = filter;
        state.loading = true;
        state.error = None;

        debug!(token, filter = %state.filter, "fetch started");
        token
    }

    /// Run the health check if it is still pending.
    ///
    /// Returns the failure message of a failed probe.
    async fn run_preflight(&self) -> Option<String> {
        if self.preflight.get() != Preflight::Pending {
            return None;
        }
        self.preflight.set(Preflight::Done);

        match self.client.health_check().await {
            Ok(_) => {
                debug!("preflight health check passed");
                None
            },
            Err(err) => {
                warn!(error = %err, "preflight health check failed, fetching anyway");
                Some(err.to_string())
            },
        }
    }

    /// Apply the result of the operation holding `token`,
    /// unless a newer operation has started since.
    fn complete(
        &self,
        token: u64,
        fetch: Fetch,
        result: Result<Vec<Product>, RequestError>,
        probe_failure: Option<String>,
    ) {
        let latest = self.latest.get();
        if token != latest {
            debug!(token, latest, "discarding stale response");
            return;
        }

        let mut state = self.state.borrow_mut();
        state.loading = false;

        match result {
            Ok(products) => {
                debug!(token, n_products = products.len(), ?fetch, "fetch completed");
                if fetch == Fetch::Load {
                    state.categories = derive_categories(&products);
                }
                state.products = products;
                state.error = None;
            },
            Err(err) => {
                let mut message = user_message(&fetch.failure_context(), &err);
                if let Some(probe_failure) = probe_failure {
                    message.push_str(&format!(" (health check failed: {probe_failure})"));
                }
                warn!(token, error = %err, "fetch failed");
                state.error = Some(message);
            },
        }
    }
}

/// Message shown to the user for a failed fetch.
///
/// Server supplied details are preferred,
/// requests that never got a response get a generic connectivity message.
fn user_message(context: &str, err: &RequestError) -> String {
    match err.status {
        Some(status) => format!("{context}. Server Error ({status}): {}", err.message),
        None => format!("{context}. Error connecting to server. Please try again later."),
    }
}
