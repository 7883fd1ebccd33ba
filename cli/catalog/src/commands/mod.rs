mod add;
mod browse;
mod health;
mod list;
mod show;

use anyhow::Result;
use bpaf::Bpaf;
use catalog_client::Client;
use catalog_view::CatalogView;
use indoc::indoc;
use log::debug;

use crate::config::Config;
use crate::utils::init::init_catalog_client;

static CATALOG_DESCRIPTION: &'_ str = indoc! {"
    Browse and manage the products of a catalog service.\n\n

    The service URL and identity provider settings are read from 'catalog.toml'
    and from 'CATALOG_*' environment variables."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(CATALOG_DESCRIPTION))]
pub struct CatalogCli(#[bpaf(external(catalog_args))] pub CatalogArgs);

/// Main catalog args parser
///
/// To parse the catalog CLI, use [`CatalogCli`] instead using [`catalog_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct CatalogArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands))]
    command: Commands,
}

impl CatalogArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        debug!("using catalog at {}", config.api_url);
        let client = init_catalog_client(&config)?;
        self.command.handle(config, client).await
    }
}

#[derive(Debug, Bpaf, Clone)]
enum Commands {
    /// List the products of the catalog
    #[bpaf(command)]
    List(#[bpaf(external(list::list))] list::List),

    /// Show details about a single product
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),

    /// Add a product to the catalog
    #[bpaf(command)]
    Add(#[bpaf(external(add::add))] add::Add),

    /// Check that the catalog service is reachable
    #[bpaf(command)]
    Health(#[bpaf(external(health::health))] health::Health),

    /// Browse the catalog interactively
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),
}

impl Commands {
    async fn handle(self, config: Config, client: Client) -> Result<()> {
        match self {
            Commands::List(args) => args.handle(config, client).await?,
            Commands::Show(args) => args.handle(client).await?,
            Commands::Add(args) => args.handle(client).await?,
            Commands::Health(args) => args.handle(client).await?,
            Commands::Browse(args) => args.handle(config, client).await?,
        }
        Ok(())
    }
}

/// Mount a catalog view as configured.
fn mount_view(config: &Config, client: Client) -> CatalogView<Client> {
    let view = CatalogView::new(client);
    if config.preflight_health_check {
        debug!("pre-flight health check enabled");
        view.with_preflight_health_check()
    } else {
        view
    }
}
