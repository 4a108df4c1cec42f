use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::utils::parse_pool_address;

/// Flat environment variable names used by existing deployments, mapped onto
/// their settings keys. They take precedence over the config file and the
/// prefixed `POOLSCOPE__*` variables.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("RPC_URL", "rpc.url"),
    ("GETH_ETH_V3_POOL", "price.pool"),
    ("TOKEN0_DECIMALS", "price.token0_decimals"),
    ("TOKEN1_DECIMALS", "price.token1_decimals"),
    ("ETH_USDC_V3_POOL", "stats.pool"),
    ("THEGRAPH_API_KEY", "stats.api_key"),
    ("THEGRAPH_SUBGRAPH_ID", "stats.subgraph_id"),
    ("INTERVAL_SECS", "scheduler.interval_secs"),
    ("RUN_ONCE", "scheduler.once"),
    ("DATA_DIR", "data_dir"),
];

/// Blockchain node connection.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    /// HTTP JSON-RPC endpoint. The price source is skipped without it.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// On-chain pool price source.
///
/// Decimal overrides replace the token's `decimals()` call when set.
#[derive(Debug, Deserialize, Clone)]
pub struct PriceSettings {
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub token0_decimals: Option<u8>,
    #[serde(default)]
    pub token1_decimals: Option<u8>,
    #[serde(default = "default_price_file")]
    pub file: String,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            pool: None,
            token0_decimals: None,
            token1_decimals: None,
            file: default_price_file(),
        }
    }
}

fn default_price_file() -> String {
    "geth_eth_price.csv".to_string()
}

/// Subgraph pool statistics source (The Graph gateway).
#[derive(Debug, Deserialize, Clone)]
pub struct StatsSettings {
    #[serde(default)]
    pub pool: Option<String>,
    /// Gateway API key, the bare key string (not a URL)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Subgraph deployment id, without the `subgraphs/id/` prefix
    #[serde(default)]
    pub subgraph_id: Option<String>,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_stats_file")]
    pub file: String,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            pool: None,
            api_key: None,
            subgraph_id: None,
            gateway_url: default_gateway_url(),
            timeout_secs: default_timeout_secs(),
            file: default_stats_file(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://gateway.thegraph.com".to_string()
}

fn default_stats_file() -> String {
    "ethusdc_stats.csv".to_string()
}

/// Tick scheduling.
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerSettings {
    /// Seconds between ticks in continuous mode - default 5 minutes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Run a single tick and exit (externally scheduled invocation)
    #[serde(default)]
    pub once: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            once: false,
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// Resolved location of the stats source.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTarget {
    /// Pool identifier exactly as configured
    pub pool: String,
    /// Full GraphQL endpoint including the API key
    pub endpoint: String,
}

/// Root application configuration.
///
/// Loaded once at startup from an optional `config.{yaml,toml,json}` file,
/// `POOLSCOPE__SECTION__KEY` environment variables and the flat legacy names in
/// [`ENV_OVERRIDES`], then shared read-only with every component.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub rpc: RpcSettings,
    #[serde(default)]
    pub price: PriceSettings,
    #[serde(default)]
    pub stats: StatsSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc: RpcSettings::default(),
            price: PriceSettings::default(),
            stats: StatsSettings::default(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(std::env::vars().collect())
    }

    /// Loads settings with `env` standing in for the process environment.
    pub fn from_env(env: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("POOLSCOPE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            );

        for (var, key) in ENV_OVERRIDES {
            let value = env.get(*var).filter(|v| !v.trim().is_empty()).cloned();
            builder = builder.set_override_option(*key, value)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    /// Checks the shape of every configured value.
    ///
    /// Absent optional sources are fine (they are skipped at tick time), but a
    /// value that is present must be well-formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Missing { key: "data_dir" });
        }

        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "scheduler.interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        if let Some(url) = non_empty(&self.rpc.url) {
            Url::parse(url).map_err(|e| ConfigError::Invalid {
                key: "rpc.url",
                reason: e.to_string(),
            })?;
        }

        if let Some(pool) = non_empty(&self.price.pool) {
            let address = parse_pool_address(pool).ok_or_else(|| ConfigError::Invalid {
                key: "price.pool",
                reason: format!("{pool} is not a 20-byte hex address"),
            })?;
            if !address.is_zero() && non_empty(&self.rpc.url).is_none() {
                return Err(ConfigError::Missing { key: "rpc.url" });
            }
        }

        if let Some(key) = non_empty(&self.stats.api_key) {
            if key.contains("http") {
                return Err(ConfigError::Invalid {
                    key: "stats.api_key",
                    reason: "expected the bare key string, not a URL".to_string(),
                });
            }
        }

        if let Some(id) = non_empty(&self.stats.subgraph_id) {
            if id.contains('/') || id.starts_with("http") {
                return Err(ConfigError::Invalid {
                    key: "stats.subgraph_id",
                    reason: "expected the bare id, without a subgraphs/id/ prefix".to_string(),
                });
            }
        }

        Url::parse(&self.stats.gateway_url).map_err(|e| ConfigError::Invalid {
            key: "stats.gateway_url",
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Configured price pool, `None` when unset or the zero address.
    pub fn price_pool(&self) -> Option<Address> {
        non_empty(&self.price.pool)
            .and_then(parse_pool_address)
            .filter(|address| !address.is_zero())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.timeout_secs)
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.stats.timeout_secs)
    }

    /// Stats source location, `None` unless pool, API key and subgraph id are all set.
    pub fn stats_target(&self) -> Option<StatsTarget> {
        let pool = non_empty(&self.stats.pool)?;
        let api_key = non_empty(&self.stats.api_key)?;
        let subgraph_id = non_empty(&self.stats.subgraph_id)?;

        Some(StatsTarget {
            pool: pool.to_string(),
            endpoint: format!(
                "{}/api/{}/subgraphs/id/{}",
                self.stats.gateway_url.trim_end_matches('/'),
                api_key,
                subgraph_id
            ),
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.interval_secs)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
