//! Token resolution: seed map, shared cache, then batched on-chain reads.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ethers::providers::Middleware;
use ethers::types::Address;
use log::{debug, warn};

use crate::cache::MetadataCache;
use crate::chains::{self, ChainId};
use crate::contracts;
use crate::errors::TokenCatalogError;
use crate::multicall::{Call, Multicall};
use crate::tokens::{parse_address, Token, TokenAccessor};

/// Shared token metadata cache, keyed by `(chain_id, address)`.
pub type SharedTokenCache = Arc<MetadataCache<(ChainId, Address), Token>>;

/// A source of token metadata for addresses the catalog cannot answer
/// locally. The primary resolver reads the chain; a secondary resolver (a
/// token-list service, for instance) can back it up.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// Returns metadata for whichever of `addresses` the source knows.
    /// Unknown addresses are simply absent from the result; an `Err` means
    /// the source itself failed.
    async fn resolve(&self, chain_id: ChainId, addresses: &[Address])
        -> anyhow::Result<Vec<Token>>;

    fn name(&self) -> &'static str;
}

/// Primary resolver: batched ERC-20 `symbol()`/`decimals()` reads through
/// the multicall contract. Tokens whose reads revert or decode to nothing
/// are dropped, not errors.
pub struct Erc20MetadataResolver<M: Middleware> {
    multicall: Arc<Multicall<M>>,
}

impl<M: Middleware + 'static> Erc20MetadataResolver<M> {
    /// Gas ceiling for a single metadata read; generous for proxied tokens.
    const CALL_GAS_LIMIT: u64 = 100_000;

    pub fn new(multicall: Arc<Multicall<M>>) -> Self {
        Self { multicall }
    }
}

#[async_trait]
impl<M: Middleware + 'static> TokenResolver for Erc20MetadataResolver<M> {
    async fn resolve(
        &self,
        chain_id: ChainId,
        addresses: &[Address],
    ) -> anyhow::Result<Vec<Token>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let decimals_fn = contracts::erc20_decimals();
        let symbol_fn = contracts::erc20_symbol();
        let decimals_data = decimals_fn.encode_input(&[])?;
        let symbol_data = symbol_fn.encode_input(&[])?;

        let mut calls = Vec::with_capacity(addresses.len() * 2);
        for &address in addresses {
            calls.push(Call {
                target: address,
                call_data: decimals_data.clone().into(),
                gas_limit: Self::CALL_GAS_LIMIT,
            });
            calls.push(Call {
                target: address,
                call_data: symbol_data.clone().into(),
                gas_limit: Self::CALL_GAS_LIMIT,
            });
        }

        let results = self.multicall.run(calls, None).await?;

        let mut tokens = Vec::with_capacity(addresses.len());
        for (i, &address) in addresses.iter().enumerate() {
            let decimals = results[i * 2]
                .ok_data()
                .and_then(contracts::decode_decimals);
            let symbol = results[i * 2 + 1]
                .ok_data()
                .and_then(contracts::decode_symbol);
            match (decimals, symbol) {
                (Some(decimals), Some(symbol)) => {
                    tokens.push(Token::new(chain_id, address, decimals, &symbol));
                }
                _ => {
                    // Not a usable ERC-20; silently omitted per contract.
                    debug!("dropping unresolvable token {address:?}");
                }
            }
        }
        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "erc20-multicall"
    }
}

/// Resolves token addresses/symbols to full token identities.
///
/// Lookup order: per-chain seed map of well-known tokens, the shared cache,
/// the primary on-chain resolver, then an optional secondary resolver.
/// Every remote resolution is written back into the cache and the seed map,
/// so a repeated `resolve` of the same address never re-reads the chain.
pub struct TokenCatalog {
    chain_id: ChainId,
    cache: SharedTokenCache,
    seed_by_address: DashMap<Address, Token>,
    seed_by_symbol: DashMap<String, Token>,
    primary: Arc<dyn TokenResolver>,
    secondary: Option<Arc<dyn TokenResolver>>,
}

impl TokenCatalog {
    pub fn new(
        chain_id: ChainId,
        cache: SharedTokenCache,
        primary: Arc<dyn TokenResolver>,
    ) -> Result<Self, TokenCatalogError> {
        if !chains::is_supported(chain_id) {
            return Err(TokenCatalogError::UnsupportedChain(chain_id));
        }
        let seed_by_address = DashMap::new();
        let seed_by_symbol = DashMap::new();
        for token in chains::seed_tokens(chain_id) {
            seed_by_symbol.insert(token.symbol.clone(), token.clone());
            seed_by_address.insert(token.address, token);
        }
        Ok(Self {
            chain_id,
            cache,
            seed_by_address,
            seed_by_symbol,
            primary,
            secondary: None,
        })
    }

    pub fn with_secondary(mut self, secondary: Arc<dyn TokenResolver>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Resolves a mixed list of addresses and symbols. Individual entries
    /// that cannot be resolved are dropped from the result; only a failure
    /// of the resolvers themselves fails the call.
    pub async fn resolve(&self, refs: &[&str]) -> Result<TokenAccessor, TokenCatalogError> {
        let mut resolved: Vec<Token> = Vec::new();
        let mut missing: Vec<Address> = Vec::new();
        let mut seen: HashSet<Address> = HashSet::new();

        for raw in refs {
            match parse_address(raw) {
                Some(address) => {
                    if !seen.insert(address) {
                        continue;
                    }
                    if let Some(token) = self.seed_by_address.get(&address) {
                        resolved.push(token.clone());
                    } else if let Some(token) = self.cache.get(&(self.chain_id, address)) {
                        resolved.push(token);
                    } else {
                        missing.push(address);
                    }
                }
                None => {
                    if let Some(token) = self.lookup_symbol(raw.trim()) {
                        if seen.insert(token.address) {
                            resolved.push(token);
                        }
                    } else {
                        debug!("dropping unresolvable token reference {raw:?}");
                    }
                }
            }
        }

        if !missing.is_empty() {
            let fetched = self.fetch_remote(&missing).await?;
            for token in fetched {
                self.remember(token.clone());
                resolved.push(token);
            }
        }

        Ok(TokenAccessor::from_tokens(resolved))
    }

    /// Symbol lookup against the seed map. `"ETH"` redirects to the wrapped
    /// native token: the pool graph never contains the bare native asset.
    fn lookup_symbol(&self, symbol: &str) -> Option<Token> {
        if symbol.eq_ignore_ascii_case("ETH") {
            return chains::wrapped_native(self.chain_id);
        }
        self.seed_by_symbol.get(symbol).map(|t| t.clone())
    }

    async fn fetch_remote(&self, missing: &[Address]) -> Result<Vec<Token>, TokenCatalogError> {
        let mut found = match self.primary.resolve(self.chain_id, missing).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("primary token resolver {} failed: {e}", self.primary.name());
                match &self.secondary {
                    Some(secondary) => {
                        return secondary
                            .resolve(self.chain_id, missing)
                            .await
                            .map_err(TokenCatalogError::Resolver);
                    }
                    None => return Err(TokenCatalogError::Resolver(e)),
                }
            }
        };

        // Addresses the primary could not answer get one more chance.
        if let Some(secondary) = &self.secondary {
            let answered: HashSet<Address> = found.iter().map(|t| t.address).collect();
            let leftover: Vec<Address> = missing
                .iter()
                .copied()
                .filter(|a| !answered.contains(a))
                .collect();
            if !leftover.is_empty() {
                match secondary.resolve(self.chain_id, &leftover).await {
                    Ok(extra) => found.extend(extra),
                    Err(e) => warn!(
                        "secondary token resolver {} failed: {e}",
                        secondary.name()
                    ),
                }
            }
        }
        Ok(found)
    }

    fn remember(&self, token: Token) {
        self.cache.set((self.chain_id, token.address), token.clone());
        self.seed_by_symbol
            .insert(token.symbol.clone(), token.clone());
        self.seed_by_address.insert(token.address, token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
        tokens: Vec<Token>,
    }

    impl CountingResolver {
        fn new(tokens: Vec<Token>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                tokens,
            }
        }
    }

    #[async_trait]
    impl TokenResolver for CountingResolver {
        async fn resolve(
            &self,
            _chain_id: ChainId,
            addresses: &[Address],
        ) -> anyhow::Result<Vec<Token>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .tokens
                .iter()
                .filter(|t| addresses.contains(&t.address))
                .cloned()
                .collect())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl TokenResolver for FailingResolver {
        async fn resolve(
            &self,
            _chain_id: ChainId,
            _addresses: &[Address],
        ) -> anyhow::Result<Vec<Token>> {
            anyhow::bail!("resolver down")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn catalog_with(primary: Arc<dyn TokenResolver>) -> TokenCatalog {
        let cache: SharedTokenCache = Arc::new(MetadataCache::new("tokens"));
        TokenCatalog::new(chains::MAINNET, cache, primary).unwrap()
    }

    fn unknown_token() -> Token {
        Token::new(chains::MAINNET, Address::repeat_byte(0x42), 18, "NEW")
    }

    #[tokio::test]
    async fn test_seed_tokens_skip_resolvers() {
        let primary = Arc::new(CountingResolver::new(vec![]));
        let catalog = catalog_with(primary.clone());
        let accessor = catalog
            .resolve(&["0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"])
            .await
            .unwrap();
        assert_eq!(accessor.by_symbol("USDC").unwrap().decimals, 6);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_idempotence() {
        let token = unknown_token();
        let primary = Arc::new(CountingResolver::new(vec![token.clone()]));
        let catalog = catalog_with(primary.clone());
        let addr_str = format!("{:?}", token.address);

        let first = catalog.resolve(&[addr_str.as_str()]).await.unwrap();
        assert_eq!(first.by_address(&token.address), Some(&token));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);

        // Second resolve is served from the cache/seed map.
        let second = catalog.resolve(&[addr_str.as_str()]).await.unwrap();
        assert_eq!(second.by_address(&token.address), Some(&token));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_eth_symbol_redirects_to_wrapped() {
        let catalog = catalog_with(Arc::new(CountingResolver::new(vec![])));
        let accessor = catalog.resolve(&["ETH"]).await.unwrap();
        let wrapped = chains::wrapped_native(chains::MAINNET).unwrap();
        assert_eq!(accessor.by_address(&wrapped.address), Some(&wrapped));
    }

    #[tokio::test]
    async fn test_bad_addresses_are_dropped_silently() {
        let catalog = catalog_with(Arc::new(CountingResolver::new(vec![])));
        let accessor = catalog.resolve(&["nonsense", "0x1234"]).await.unwrap();
        assert!(accessor.is_empty());
    }

    #[tokio::test]
    async fn test_secondary_backs_up_failed_primary() {
        let token = unknown_token();
        let catalog = catalog_with(Arc::new(FailingResolver))
            .with_secondary(Arc::new(CountingResolver::new(vec![token.clone()])));
        let addr_str = format!("{:?}", token.address);
        let accessor = catalog.resolve(&[addr_str.as_str()]).await.unwrap();
        assert_eq!(accessor.by_address(&token.address), Some(&token));
    }

    #[tokio::test]
    async fn test_primary_failure_without_secondary_fails_call() {
        let catalog = catalog_with(Arc::new(FailingResolver));
        let result = catalog.resolve(&["0x4242424242424242424242424242424242424242"]).await;
        assert!(matches!(result, Err(TokenCatalogError::Resolver(_))));
    }

    #[test]
    fn test_unsupported_chain_rejected() {
        let cache: SharedTokenCache = Arc::new(MetadataCache::new("tokens"));
        let result = TokenCatalog::new(999, cache, Arc::new(FailingResolver));
        assert!(matches!(
            result,
            Err(TokenCatalogError::UnsupportedChain(999))
        ));
    }
}
