//! Ordered-fallback decorator for pool providers.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use crate::errors::ProviderError;
use crate::metrics;
use crate::pools::Pool;
use crate::providers::PoolGraphProvider;
use crate::tokens::Token;

/// Tries each underlying provider in order and returns the first success.
/// Only when every provider has failed does the call fail, carrying the
/// per-provider errors for diagnosis.
pub struct FallbackPoolProvider {
    providers: Vec<Arc<dyn PoolGraphProvider>>,
}

impl FallbackPoolProvider {
    pub fn new(providers: Vec<Arc<dyn PoolGraphProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl PoolGraphProvider for FallbackPoolProvider {
    async fn get_pools(
        &self,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        block_number: Option<u64>,
    ) -> Result<Vec<Pool>, ProviderError> {
        let mut errors = Vec::new();
        for provider in &self.providers {
            match provider.get_pools(token_in, token_out, block_number).await {
                Ok(pools) => return Ok(pools),
                Err(e) => {
                    warn!("pool provider {} failed: {e}", provider.name());
                    metrics::increment_provider_fallback(provider.name());
                    errors.push(format!("{}: {e}", provider.name()));
                }
            }
        }
        Err(ProviderError::SourceExhausted { errors })
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
