//! # Swap Router
//!
//! The engine facade: validates a trade request, assembles the candidate
//! pool set, enumerates routes, quotes them in one batch, and selects the
//! best. This is the single entry point the surrounding layers call.
//!
//! Per request the pipeline moves through collecting pools, enumerating,
//! quoting, and selecting; only the terminal outcomes (`Found`, `NoRoute`,
//! or an error) are observable from outside. Requests are independent and
//! stateless apart from the shared caches, so concurrent calls need no
//! coordination.

use std::sync::Arc;

use ethers::providers::Middleware;
use ethers::types::Address;
use log::{debug, info, warn};

use crate::chains::{self, ChainId};
use crate::enumerator::{BridgeOverrides, RouteEnumerator};
use crate::errors::RouterError;
use crate::multicall::Multicall;
use crate::providers::{
    CachingPoolProvider, FallbackPoolProvider, PoolGraphProvider, StaticPoolProvider,
    SubgraphPoolProvider,
};
use crate::quoter::{OnChainQuoteEngine, QuoteProvider};
use crate::selector;
use crate::settings::Settings;
use crate::token_catalog::{Erc20MetadataResolver, SharedTokenCache, TokenCatalog};
use crate::tokens::{Token, TokenAccessor};
use crate::trade::{RouteOutcome, TradeRequest};
use crate::cache::MetadataCache;

/// Route discovery and quoting engine for one network.
pub struct SwapRouter {
    chain_id: ChainId,
    catalog: Arc<TokenCatalog>,
    pool_provider: Arc<dyn PoolGraphProvider>,
    quote_provider: Arc<dyn QuoteProvider>,
    enumerator: RouteEnumerator,
    max_hops: usize,
}

impl SwapRouter {
    /// Assembles a router from explicitly constructed components. Tests and
    /// embedders that need custom providers use this directly.
    pub fn new(
        chain_id: ChainId,
        catalog: Arc<TokenCatalog>,
        pool_provider: Arc<dyn PoolGraphProvider>,
        quote_provider: Arc<dyn QuoteProvider>,
        settings: &Settings,
    ) -> Self {
        Self {
            chain_id,
            catalog,
            pool_provider,
            quote_provider,
            enumerator: RouteEnumerator::new(chain_id),
            max_hops: settings.routing.max_hops,
        }
    }

    /// Standard production wiring: subgraph provider with static fallback,
    /// both behind the cache, quoting through the chain's quoter contract.
    pub fn from_middleware<M: Middleware + 'static>(
        chain_id: ChainId,
        provider: Arc<M>,
        settings: &Settings,
    ) -> anyhow::Result<Self> {
        let multicall = Arc::new(Multicall::new(
            provider,
            chains::multicall_address(chain_id),
            settings.quoting.batch_size,
        ));

        let token_cache: SharedTokenCache = Arc::new(MetadataCache::new("tokens"));
        let catalog = Arc::new(TokenCatalog::new(
            chain_id,
            token_cache,
            Arc::new(Erc20MetadataResolver::new(multicall.clone())),
        )?);

        let mut sources: Vec<Arc<dyn PoolGraphProvider>> = Vec::new();
        if let Some(url) = settings.subgraph_url(chain_id) {
            sources.push(Arc::new(SubgraphPoolProvider::new(
                chain_id,
                url.to_string(),
                settings,
            )));
        }
        sources.push(Arc::new(StaticPoolProvider::new(chain_id)));
        let pool_provider = Arc::new(CachingPoolProvider::new(
            chain_id,
            Arc::new(FallbackPoolProvider::new(sources)),
            Arc::new(MetadataCache::new("pools")),
        ));

        let quote_provider = Arc::new(
            OnChainQuoteEngine::new(chain_id, multicall)?.with_timeout(
                std::time::Duration::from_secs(settings.quoting.timeout_seconds),
            ),
        );

        Ok(Self::new(
            chain_id,
            catalog,
            pool_provider,
            quote_provider,
            settings,
        ))
    }

    pub fn with_bridge_overrides(mut self, overrides: BridgeOverrides) -> Self {
        self.enumerator = RouteEnumerator::new(self.chain_id).with_overrides(overrides);
        self
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Finds the best route for the request.
    ///
    /// Returns `RouteOutcome::NoRoute` when no path currently supports the
    /// trade (a market fact); errs only on an invalid request or when every
    /// pool data source failed.
    pub async fn get_best_route(
        &self,
        request: TradeRequest,
    ) -> Result<RouteOutcome, RouterError> {
        let (token_in, token_out) = self.validate(&request)?;

        debug!(
            "routing {} {} -> {} ({:?})",
            request.amount, token_in.symbol, token_out.symbol, request.trade_type
        );
        let pools = self
            .pool_provider
            .get_pools(Some(&token_in), Some(&token_out), request.block_number)
            .await
            .map_err(RouterError::SourceExhausted)?;

        let routes = self
            .enumerator
            .enumerate(&token_in, &token_out, &pools, self.max_hops);
        info!(
            "{} candidate route(s) from {} pool(s) for {} -> {}",
            routes.len(),
            pools.len(),
            token_in.symbol,
            token_out.symbol
        );
        if routes.is_empty() {
            return Ok(RouteOutcome::NoRoute);
        }

        let quoted = match self
            .quote_provider
            .quote(
                &routes,
                request.amount,
                request.trade_type,
                request.block_number,
            )
            .await
        {
            Ok(quoted) => quoted,
            Err(e) => {
                // Quoting producing nothing usable is NoRoute territory, not
                // an infrastructure error of the router call.
                warn!("quoting failed for all routes: {e}");
                return Ok(RouteOutcome::NoRoute);
            }
        };

        Ok(selector::select(quoted, request.trade_type))
    }

    /// Token resolution passthrough so callers can display metadata without
    /// duplicating cache logic.
    pub async fn resolve_tokens(&self, refs: &[&str]) -> Result<TokenAccessor, RouterError> {
        self.catalog
            .resolve(refs)
            .await
            .map_err(RouterError::TokenResolution)
    }

    /// Pre-network validation. Native-asset endpoints (zero address) are
    /// redirected to the wrapped token here, once, so every later stage
    /// works on pool-graph tokens only.
    fn validate(&self, request: &TradeRequest) -> Result<(Token, Token), RouterError> {
        if !chains::is_supported(self.chain_id) {
            return Err(RouterError::InvalidRequest(format!(
                "unsupported chain {}",
                self.chain_id
            )));
        }
        if request.amount.is_zero() {
            return Err(RouterError::InvalidRequest(
                "amount must be positive".to_string(),
            ));
        }
        for token in [&request.token_in, &request.token_out] {
            if token.chain_id != self.chain_id {
                return Err(RouterError::InvalidRequest(format!(
                    "token {} is on chain {}, router is on {}",
                    token.symbol, token.chain_id, self.chain_id
                )));
            }
        }

        let token_in = self.wrap_native(&request.token_in)?;
        let token_out = self.wrap_native(&request.token_out)?;
        if token_in == token_out {
            return Err(RouterError::InvalidRequest(
                "input and output tokens are identical".to_string(),
            ));
        }
        Ok((token_in, token_out))
    }

    fn wrap_native(&self, token: &Token) -> Result<Token, RouterError> {
        if token.address != Address::zero() {
            return Ok(token.clone());
        }
        chains::wrapped_native(self.chain_id).ok_or_else(|| {
            RouterError::InvalidRequest(format!(
                "no wrapped native token for chain {}",
                self.chain_id
            ))
        })
    }
}
