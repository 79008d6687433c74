//! # Pool Graph Providers
//!
//! This module defines the capability trait for retrieving the candidate
//! pool set, plus the composable implementations: the remote indexing
//! provider, the static fallback, and the caching/fallback decorators.
//!
//! ## Composition
//!
//! Decorators hold an inner instance of the same trait and are composed
//! explicitly at construction time:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use amm_router_sdk::cache::MetadataCache;
//! use amm_router_sdk::chains;
//! use amm_router_sdk::providers::{
//!     CachingPoolProvider, FallbackPoolProvider, StaticPoolProvider, SubgraphPoolProvider,
//! };
//! use amm_router_sdk::settings::Settings;
//!
//! use amm_router_sdk::providers::PoolGraphProvider;
//!
//! let settings = Settings::default();
//! let sources: Vec<Arc<dyn PoolGraphProvider>> = vec![
//!     Arc::new(SubgraphPoolProvider::new(
//!         chains::MAINNET,
//!         "https://indexer.example/v3".to_string(),
//!         &settings,
//!     )),
//!     Arc::new(StaticPoolProvider::new(chains::MAINNET)),
//! ];
//! let provider = CachingPoolProvider::new(
//!     chains::MAINNET,
//!     Arc::new(FallbackPoolProvider::new(sources)),
//!     Arc::new(MetadataCache::new("pools")),
//! );
//! ```

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::pools::Pool;
use crate::tokens::Token;

mod caching;
mod fallback;
mod static_pools;
mod subgraph;

pub use caching::{CachingPoolProvider, PoolCacheKey, SharedPoolCache};
pub use fallback::FallbackPoolProvider;
pub use static_pools::StaticPoolProvider;
pub use subgraph::SubgraphPoolProvider;

/// Source of the candidate liquidity-pool set for one network.
///
/// Implementations refresh the set wholesale on every call; pools are never
/// mutated incrementally. The endpoint tokens are hints some sources use to
/// enrich the set (the static provider crosses them with its base tokens);
/// sources that return the whole graph may ignore them.
#[async_trait]
pub trait PoolGraphProvider: Send + Sync {
    async fn get_pools(
        &self,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        block_number: Option<u64>,
    ) -> Result<Vec<Pool>, ProviderError>;

    fn name(&self) -> &'static str;
}
