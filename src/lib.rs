//! # AMM Router SDK
//!
//! A Rust library for discovering and pricing the best way to swap one
//! fungible asset for another across a decentralized set of liquidity pools.
//! Given a trade direction, an amount, and a token pair, the engine
//! assembles a candidate pool set from one or more data sources, enumerates
//! multi-hop paths up to a bounded depth, prices every candidate in a single
//! batched on-chain read, and selects the best route.
//!
//! ## Overview
//!
//! The SDK is the routing core only: it produces a recommended route and a
//! price estimate. Presentation, transaction construction and signing, and
//! persisted user state are the embedding application's business.
//!
//! ## Architecture
//!
//! Data flows strictly downward through the layers:
//!
//! ### Data Providers
//! `TokenCatalog` resolves token identities (seed map, shared cache, batched
//! on-chain reads). The `PoolGraphProvider` implementations retrieve the
//! candidate pool set — from a remote indexing service with pagination and
//! retry, or synthesized statically as a last resort — composed behind
//! caching and ordered-fallback decorators.
//!
//! ### Route Enumeration
//! `RouteEnumerator` walks the pool set depth-first, bounded by the hop
//! budget and restricted to high-liquidity bridge tokens as intermediates.
//! Pure and deterministic.
//!
//! ### Quoting & Selection
//! `OnChainQuoteEngine` prices all candidates in one batched multicall with
//! per-route failure isolation; `selector::select` ranks the survivors by
//! trade direction and returns the winner.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use amm_router_sdk::{chains, SwapRouter, TradeRequest};
//! use amm_router_sdk::settings::Settings;
//! use ethers::providers::{Http, Provider};
//! use ethers::types::U256;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = Arc::new(Provider::<Http>::try_from("https://eth.example")?);
//! let settings = Settings::new()?;
//! let router = SwapRouter::from_middleware(chains::MAINNET, provider, &settings)?;
//!
//! let tokens = router.resolve_tokens(&["ETH", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"]).await?;
//! let weth = tokens.by_symbol("WETH").unwrap().clone();
//! let usdc = tokens.by_symbol("USDC").unwrap().clone();
//!
//! let request = TradeRequest::exact_in(U256::exp10(18), weth, usdc);
//! let outcome = router.get_best_route(request).await?;
//! # Ok(())
//! # }
//! ```

// Core Types
/// Token identity and resolution accessor
pub mod tokens;
/// Canonical pool representation and fee tiers
pub mod pools;
/// Route value object
pub mod routes;
/// Trade request/result types
pub mod trade;
/// Per-chain constant tables
pub mod chains;

// Data Providers
/// Token catalog: seed map, cache, on-chain resolution
pub mod token_catalog;
/// Pool graph providers and their decorators
pub mod providers;

// Routing Core
/// Depth-bounded route enumeration
pub mod enumerator;
/// Batched on-chain quoting
pub mod quoter;
/// Best-route selection
pub mod selector;
/// Engine facade
pub mod router;

// Infrastructure
/// Shared metadata cache
pub mod cache;
/// Error taxonomy
pub mod errors;
/// Multicall batch RPC utilities
pub mod multicall;
/// Retry/backoff and indexing-lag policy
pub mod retry;
/// Configuration management
pub mod settings;
/// Metrics and observability
pub mod metrics;
/// Read-only contract ABI helpers
pub mod contracts;

// Re-exports for convenience
pub use enumerator::{BridgeOverrides, RouteEnumerator};
pub use errors::{ProviderError, RouterError, TokenCatalogError};
pub use pools::{FeeTier, Pool};
pub use providers::PoolGraphProvider;
pub use quoter::QuoteProvider;
pub use router::SwapRouter;
pub use routes::Route;
pub use token_catalog::TokenCatalog;
pub use tokens::{Token, TokenAccessor};
pub use trade::{BestRoute, Quote, QuoteResult, RouteOutcome, TradeRequest, TradeType};
