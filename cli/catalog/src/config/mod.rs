use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use catalog_client::CatalogClientConfig;
use config::{Config as HierarchicalConfig, Environment};
use itertools::{Either, Itertools};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xdg::BaseDirectories;

/// Name of the catalog config directory
const CATALOG_DIR_NAME: &str = "catalog";
const CATALOG_CONFIG_DIR_VAR: &str = "CATALOG_CONFIG_DIR";
const CATALOG_ENV_PREFIX: &str = "CATALOG_";
pub const CATALOG_CONFIG_FILE: &str = "catalog.toml";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_USER_NAME: &str = "User";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Base URL of the catalog service
    pub api_url: String,

    /// Seconds after which a request fails
    pub timeout_secs: u64,

    /// Probe the service once before the first product fetch of a view
    pub preflight_health_check: bool,

    /// Answer requests from a JSON file of canned responses
    #[serde(default)]
    pub mock_data: Option<PathBuf>,

    /// Display name of the signed-in user
    #[serde(default)]
    pub user_name: Option<String>,

    /// Identity provider settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Headers sent with every catalog request, e.g. an API gateway key
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AuthConfig {
    pub user_pool_id: Option<String>,
    pub user_pool_client_id: Option<String>,
    pub identity_pool_id: Option<String>,
    pub region: Option<String>,
}

/// Identity provider settings with every key present.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentitySettings {
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub identity_pool_id: String,
    pub region: String,
}

#[derive(Debug, Error, PartialEq)]
#[error(
    "The identity provider is not configured.\nMissing settings: {}",
    .missing.join(", ")
)]
pub struct MissingAuthConfig {
    pub missing: Vec<&'static str>,
}

impl AuthConfig {
    /// Check that all identity provider settings are present.
    ///
    /// Every missing setting is reported, not only the first one.
    pub fn require(&self) -> Result<IdentitySettings, MissingAuthConfig> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string)
        };

        let user_pool_id = present(&self.user_pool_id);
        let user_pool_client_id = present(&self.user_pool_client_id);
        let identity_pool_id = present(&self.identity_pool_id);
        let region = present(&self.region);

        match (user_pool_id, user_pool_client_id, identity_pool_id, region) {
            (Some(user_pool_id), Some(user_pool_client_id), Some(identity_pool_id), Some(region)) => {
                Ok(IdentitySettings {
                    user_pool_id,
                    user_pool_client_id,
                    identity_pool_id,
                    region,
                })
            },
            (user_pool_id, user_pool_client_id, identity_pool_id, region) => {
                let missing = [
                    ("auth.user_pool_id", user_pool_id.is_none()),
                    ("auth.user_pool_client_id", user_pool_client_id.is_none()),
                    ("auth.identity_pool_id", identity_pool_id.is_none()),
                    ("auth.region", region.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, missing)| missing.then_some(key))
                .collect();
                Err(MissingAuthConfig { missing })
            },
        }
    }
}

impl Config {
    /// Creates a [Config] from the config file and `CATALOG_*` variables
    pub fn parse() -> Result<Config> {
        let config_files = match env::var(CATALOG_CONFIG_DIR_VAR) {
            Ok(dir) => {
                debug!("`${CATALOG_CONFIG_DIR_VAR}` set: {dir}");
                vec![PathBuf::from(dir).join(CATALOG_CONFIG_FILE)]
            },
            Err(_) => {
                let catalog_dirs = BaseDirectories::with_prefix(CATALOG_DIR_NAME);
                catalog_dirs
                    .find_config_files(CATALOG_CONFIG_FILE)
                    .collect()
            },
        };

        let envs = env::vars()
            .filter(|(k, _)| k != CATALOG_CONFIG_DIR_VAR)
            .filter_map(|(k, v)| k.strip_prefix(CATALOG_ENV_PREFIX).map(|k| (k.to_owned(), v)))
            .collect::<Vec<_>>();

        Self::from_sources(&config_files, envs)
    }

    /// Layer defaults, `config_files` and `envs`, later sources winning.
    ///
    /// `envs` are variable names with the `CATALOG_` prefix removed.
    pub fn from_sources(config_files: &[PathBuf], mut envs: Vec<(String, String)>) -> Result<Config> {
        let mut builder = HierarchicalConfig::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("preflight_health_check", false)?;

        for file in config_files {
            debug!("reading config file: {}", file.display());
            builder = builder.add_source(
                config::File::from(file.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let builder = builder.add_source(mk_environment(&mut envs, "AUTH")).add_source(
            Environment::default()
                .source(Some(HashMap::from_iter(envs)))
                .try_parsing(true),
        );

        builder
            .build()?
            .try_deserialize()
            .context("Could not parse config")
    }

    /// Configuration of the catalog client.
    pub fn client_config(&self) -> CatalogClientConfig {
        let mut client_config = CatalogClientConfig::new(&self.api_url);
        client_config.timeout = Duration::from_secs(self.timeout_secs);
        client_config.extra_headers = self.headers.clone();
        client_config.user_agent = Some(format!("catalog/{}", env!("CARGO_PKG_VERSION")));
        client_config
    }

    pub fn user_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_USER_NAME)
    }
}

/// Map `<prefix>_<key>` variables into the `<prefix>` table.
///
/// Matching variables are removed from `envs`.
fn mk_environment(envs: &mut Vec<(String, String)>, prefix: &str) -> Environment {
    let (prefixed_envs, other_envs): (HashMap<String, String>, Vec<(String, String)>) = envs
        .iter()
        .partition_map(|(k, v)| match k.strip_prefix(&format!("{prefix}_")) {
            Some(suffix) => Either::Left((format!("{prefix}#{suffix}"), v.to_owned())),
            None => Either::Right((k.to_owned(), v.to_owned())),
        });
    let environment = Environment::with_prefix(prefix)
        .keep_prefix(true)
        .separator("#")
        .source(Some(prefixed_envs))
        .try_parsing(true);
    *envs = other_envs;
    environment
}
