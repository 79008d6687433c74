//! Caching decorator for pool providers.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::cache::MetadataCache;
use crate::chains::ChainId;
use crate::errors::ProviderError;
use crate::pools::Pool;
use crate::providers::PoolGraphProvider;
use crate::tokens::Token;

/// Cache key: one entry per network and block pin. Pool identity is stable,
/// so there is no TTL; invalidation is the embedding application's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolCacheKey {
    pub chain_id: ChainId,
    pub block_number: Option<u64>,
}

pub type SharedPoolCache = Arc<MetadataCache<PoolCacheKey, Vec<Pool>>>;

/// Returns the cached pool set on a hit; delegates and stores on a miss.
/// Failures of the inner provider are never cached.
pub struct CachingPoolProvider {
    chain_id: ChainId,
    inner: Arc<dyn PoolGraphProvider>,
    cache: SharedPoolCache,
}

impl CachingPoolProvider {
    pub fn new(chain_id: ChainId, inner: Arc<dyn PoolGraphProvider>, cache: SharedPoolCache) -> Self {
        Self {
            chain_id,
            inner,
            cache,
        }
    }
}

#[async_trait]
impl PoolGraphProvider for CachingPoolProvider {
    async fn get_pools(
        &self,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        block_number: Option<u64>,
    ) -> Result<Vec<Pool>, ProviderError> {
        let key = PoolCacheKey {
            chain_id: self.chain_id,
            block_number,
        };
        if let Some(pools) = self.cache.get(&key) {
            debug!("pool cache hit for chain {} ({} pools)", self.chain_id, pools.len());
            return Ok(pools);
        }
        let pools = self.inner.get_pools(token_in, token_out, block_number).await?;
        self.cache.set(key, pools.clone());
        Ok(pools)
    }

    fn name(&self) -> &'static str {
        "caching"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains;
    use crate::pools::FeeTier;
    use ethers::types::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        pools: Vec<Pool>,
    }

    #[async_trait]
    impl PoolGraphProvider for CountingProvider {
        async fn get_pools(
            &self,
            _token_in: Option<&Token>,
            _token_out: Option<&Token>,
            _block_number: Option<u64>,
        ) -> Result<Vec<Pool>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pools.clone())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn sample_pool() -> Pool {
        let a = Token::new(chains::MAINNET, Address::repeat_byte(0x01), 18, "AAA");
        let b = Token::new(chains::MAINNET, Address::repeat_byte(0x02), 18, "BBB");
        Pool::new(Address::repeat_byte(0xaa), a, b, FeeTier::Medium, 0, 0.0).unwrap()
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            pools: vec![sample_pool()],
        });
        let cache: SharedPoolCache = Arc::new(MetadataCache::new("pools"));
        let provider = CachingPoolProvider::new(chains::MAINNET, inner.clone(), cache);

        let first = provider.get_pools(None, None, None).await.unwrap();
        let second = provider.get_pools(None, None, None).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_blocks_are_distinct_entries() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            pools: vec![sample_pool()],
        });
        let cache: SharedPoolCache = Arc::new(MetadataCache::new("pools"));
        let provider = CachingPoolProvider::new(chains::MAINNET, inner.clone(), cache);

        provider.get_pools(None, None, Some(100)).await.unwrap();
        provider.get_pools(None, None, Some(200)).await.unwrap();
        provider.get_pools(None, None, Some(100)).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
