//! Batched on-chain quoting.
//!
//! One quoter read per candidate route, all dispatched as a single batched
//! multicall. A reverting quoter call (nonexistent pool, zero liquidity,
//! amount too large) is a fact about that route and is surfaced as a
//! per-route failure, never as an error of the batch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::abi::Token as AbiToken;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use log::{debug, warn};

use crate::chains::{self, ChainId};
use crate::contracts;
use crate::metrics;
use crate::multicall::{Call, Multicall};
use crate::routes::Route;
use crate::trade::{Quote, QuoteResult, TradeType};

/// Prices a set of candidate routes at one amount.
///
/// Results come back in the same order as the input routes so downstream
/// selection is deterministic.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(
        &self,
        routes: &[Route],
        amount: U256,
        trade_type: TradeType,
        block_number: Option<u64>,
    ) -> Result<Vec<QuoteResult>>;
}

/// Quote provider backed by the chain's quoter contract.
pub struct OnChainQuoteEngine<M: Middleware> {
    multicall: Arc<Multicall<M>>,
    quoter: Address,
    gas_limit_per_call: u64,
}

impl<M: Middleware + 'static> OnChainQuoteEngine<M> {
    pub fn new(chain_id: ChainId, multicall: Arc<Multicall<M>>) -> Result<Self> {
        let quoter = chains::quoter_address(chain_id)
            .ok_or_else(|| anyhow!("no quoter deployed for chain {chain_id}"))?;
        Ok(Self {
            multicall,
            quoter,
            gas_limit_per_call: chains::quote_gas_limit(chain_id),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.multicall = Arc::new((*self.multicall).clone().with_timeout(timeout));
        self
    }
}

/// Builds the quoter read for one route. Exposed to the module for direct
/// testing; the encoded path direction depends on the trade type.
fn build_quote_call(
    quoter: Address,
    route: &Route,
    amount: U256,
    trade_type: TradeType,
    gas_limit: u64,
) -> Result<Call> {
    let function = match trade_type {
        TradeType::ExactIn => contracts::quote_exact_input(),
        TradeType::ExactOut => contracts::quote_exact_output(),
    };
    let path = contracts::encode_route_path(route, trade_type);
    let call_data = function.encode_input(&[
        AbiToken::Bytes(path.to_vec()),
        AbiToken::Uint(amount),
    ])?;
    Ok(Call {
        target: quoter,
        call_data: call_data.into(),
        gas_limit,
    })
}

#[async_trait]
impl<M: Middleware + 'static> QuoteProvider for OnChainQuoteEngine<M> {
    async fn quote(
        &self,
        routes: &[Route],
        amount: U256,
        trade_type: TradeType,
        block_number: Option<u64>,
    ) -> Result<Vec<QuoteResult>> {
        if routes.is_empty() {
            return Ok(Vec::new());
        }

        let mut calls = Vec::with_capacity(routes.len());
        for route in routes {
            calls.push(build_quote_call(
                self.quoter,
                route,
                amount,
                trade_type,
                self.gas_limit_per_call,
            )?);
        }

        debug!("dispatching {} quoter reads in one batch", calls.len());
        let results = match self.multicall.run(calls, block_number).await {
            Ok(results) => results,
            Err(e) => {
                // The batch itself failing (transport, after retries) prices
                // nothing: every route becomes a failure and selection will
                // report no route, which is distinguishable from the pool
                // sources being down.
                warn!("quote batch failed entirely: {e}");
                return Ok(routes
                    .iter()
                    .map(|route| QuoteResult::Failure {
                        route: route.clone(),
                    })
                    .collect());
            }
        };

        let function = match trade_type {
            TradeType::ExactIn => contracts::quote_exact_input(),
            TradeType::ExactOut => contracts::quote_exact_output(),
        };

        let mut quoted = Vec::with_capacity(routes.len());
        let mut failed = 0usize;
        for (route, result) in routes.iter().zip(results) {
            let decoded = result
                .ok_data()
                .and_then(|data| contracts::decode_quote(&function, data));
            match decoded {
                Some((quoted_amount, gas_estimate)) => {
                    let (amount_in, amount_out) = match trade_type {
                        TradeType::ExactIn => (amount, quoted_amount),
                        TradeType::ExactOut => (quoted_amount, amount),
                    };
                    quoted.push(QuoteResult::Ok(Quote {
                        route: route.clone(),
                        amount_in,
                        amount_out,
                        gas_estimate: Some(gas_estimate),
                    }));
                }
                None => {
                    failed += 1;
                    quoted.push(QuoteResult::Failure {
                        route: route.clone(),
                    });
                }
            }
        }
        metrics::record_quote_batch(quoted.len(), failed);
        Ok(quoted)
    }
}
