use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Retry/backoff knobs shared by the remote providers.
#[derive(Debug, Deserialize, Clone)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_attempt_timeout_seconds")]
    pub attempt_timeout_seconds: u64,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}
fn default_attempt_timeout_seconds() -> u64 {
    10
}
fn default_backoff_base_ms() -> u64 {
    250
}
fn default_backoff_max_ms() -> u64 {
    5000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            attempt_timeout_seconds: default_attempt_timeout_seconds(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubgraphSettings {
    /// Endpoint per chain id, keyed by the decimal chain id string.
    #[serde(default)]
    pub urls: HashMap<String, String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Total ceiling for one `get_pools` call; generous because it may
    /// paginate many pages.
    #[serde(default = "default_total_timeout_seconds")]
    pub total_timeout_seconds: u64,
    #[serde(default = "default_min_tracked_eth")]
    pub min_tracked_eth: f64,
    /// Blocks to roll back when the indexer reports it has not caught up.
    #[serde(default = "default_block_rollback")]
    pub block_rollback: u64,
}

fn default_page_size() -> usize {
    1000
}
fn default_total_timeout_seconds() -> u64 {
    30
}
fn default_min_tracked_eth() -> f64 {
    0.01
}
fn default_block_rollback() -> u64 {
    10
}

impl Default for SubgraphSettings {
    fn default() -> Self {
        Self {
            urls: HashMap::new(),
            page_size: default_page_size(),
            total_timeout_seconds: default_total_timeout_seconds(),
            min_tracked_eth: default_min_tracked_eth(),
            block_rollback: default_block_rollback(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuoteSettings {
    /// Per-batch timeout; short compared to pool retrieval.
    #[serde(default = "default_quote_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_quote_batch_size")]
    pub batch_size: usize,
}

fn default_quote_timeout_seconds() -> u64 {
    10
}
fn default_quote_batch_size() -> usize {
    100
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_quote_timeout_seconds(),
            batch_size: default_quote_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingSettings {
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
}

fn default_max_hops() -> usize {
    2
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
        }
    }
}

/// Root configuration tree.
///
/// Loaded from an optional `config/router.toml` overlaid with
/// `AMM_ROUTER__*` environment variables; every field has a default so an
/// empty environment yields a working configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub subgraph: SubgraphSettings,
    #[serde(default)]
    pub quoting: QuoteSettings,
    #[serde(default)]
    pub routing: RoutingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/router").required(false))
            .add_source(Environment::with_prefix("AMM_ROUTER").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn subgraph_url(&self, chain_id: u64) -> Option<&str> {
        self.subgraph.urls.get(&chain_id.to_string()).map(|s| s.as_str())
    }
}
