//! Static fallback provider: synthesizes a plausible pool set when every
//! remote source is down.

use std::collections::HashSet;

use async_trait::async_trait;
use log::debug;

use crate::chains::{self, ChainId};
use crate::errors::ProviderError;
use crate::pools::{FeeTier, Pool};
use crate::providers::PoolGraphProvider;
use crate::tokens::Token;

/// Fallback of last resort.
///
/// Crosses the chain's bridge tokens (plus the requested endpoints) over
/// every fee tier and derives each pool's deterministic address. Some of
/// these pools will not exist on chain; the quoter weeds those out. The
/// liquidity/TVL carried by the synthesized pools are placeholders asserting
/// existence only — they must never be used as a ranking or comparison
/// signal (see `Pool::synthetic`).
pub struct StaticPoolProvider {
    chain_id: ChainId,
}

impl StaticPoolProvider {
    pub fn new(chain_id: ChainId) -> Self {
        Self { chain_id }
    }
}

#[async_trait]
impl PoolGraphProvider for StaticPoolProvider {
    async fn get_pools(
        &self,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        _block_number: Option<u64>,
    ) -> Result<Vec<Pool>, ProviderError> {
        if chains::v3_factory(self.chain_id).is_none() {
            return Err(ProviderError::transient(
                format!("no factory registered for chain {}", self.chain_id),
                1,
            ));
        }

        let mut tokens = chains::bridge_tokens(self.chain_id);
        for endpoint in [token_in, token_out].into_iter().flatten() {
            if !tokens.contains(endpoint) {
                tokens.push(endpoint.clone());
            }
        }

        let mut seen = HashSet::new();
        let mut pools = Vec::new();
        for i in 0..tokens.len() {
            for j in (i + 1)..tokens.len() {
                for fee in FeeTier::ALL {
                    let Some(pool) =
                        Pool::synthetic(self.chain_id, tokens[i].clone(), tokens[j].clone(), fee)
                    else {
                        continue;
                    };
                    if seen.insert(pool.address) {
                        pools.push(pool);
                    }
                }
            }
        }
        debug!(
            "static provider synthesized {} pools from {} tokens",
            pools.len(),
            tokens.len()
        );
        Ok(pools)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
