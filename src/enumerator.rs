//! Route enumeration: depth-bounded DFS over the candidate pool set.
//!
//! Pure, synchronous, and deterministic: for a fixed pool set, bridge list
//! and hop bound, the same paths come back in the same order on every call.

use std::collections::{HashMap, HashSet};

use ethers::types::Address;
use log::debug;

use crate::chains::{self, ChainId};
use crate::pools::Pool;
use crate::routes::Route;
use crate::tokens::Token;

/// Per-token bridge overrides.
///
/// `additional_bases` widens the bridge set when one endpoint only trades
/// against unusual intermediates; `custom_bases` narrows it, restricting a
/// token to routing exclusively through its designated partners.
#[derive(Debug, Clone, Default)]
pub struct BridgeOverrides {
    pub additional_bases: HashMap<Address, Vec<Token>>,
    pub custom_bases: HashMap<Address, Vec<Token>>,
}

pub struct RouteEnumerator {
    chain_id: ChainId,
    overrides: BridgeOverrides,
}

impl RouteEnumerator {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            overrides: BridgeOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: BridgeOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Every acyclic pool path of length `1..=max_hops` from `token_in` to
    /// `token_out`. Intermediate tokens are restricted to the bridge set;
    /// an empty result is a legitimate outcome, not an error.
    pub fn enumerate(
        &self,
        token_in: &Token,
        token_out: &Token,
        pools: &[Pool],
        max_hops: usize,
    ) -> Vec<Route> {
        if token_in == token_out || max_hops == 0 || pools.is_empty() {
            return Vec::new();
        }

        let bridges = self.bridge_set(token_in, token_out);
        let eligible = self.eligible_pools(token_in, token_out, pools, &bridges);
        debug!(
            "enumerating {} -> {}: {} of {} pools eligible",
            token_in.symbol,
            token_out.symbol,
            eligible.len(),
            pools.len()
        );

        let mut routes = Vec::new();
        let mut current: Vec<Pool> = Vec::new();
        self.walk(
            token_in,
            token_out,
            &eligible,
            &mut current,
            &mut routes,
            token_in,
            max_hops,
        );
        routes
    }

    /// Chain bases plus any additional bases registered for the endpoints.
    fn bridge_set(&self, token_in: &Token, token_out: &Token) -> HashSet<Token> {
        let mut bridges: HashSet<Token> =
            chains::bridge_tokens(self.chain_id).into_iter().collect();
        for endpoint in [token_in, token_out] {
            if let Some(extra) = self.overrides.additional_bases.get(&endpoint.address) {
                bridges.extend(extra.iter().cloned());
            }
        }
        bridges
    }

    /// A pool is a candidate when both of its tokens are endpoints or
    /// bridges, it passes the custom-base restriction, and its address has
    /// not been seen before (the same concrete pool is never offered twice).
    fn eligible_pools(
        &self,
        token_in: &Token,
        token_out: &Token,
        pools: &[Pool],
        bridges: &HashSet<Token>,
    ) -> Vec<Pool> {
        let allowed =
            |t: &Token| t == token_in || t == token_out || bridges.contains(t);
        let mut seen: HashSet<Address> = HashSet::new();
        pools
            .iter()
            .filter(|pool| allowed(&pool.token0) && allowed(&pool.token1))
            .filter(|pool| self.passes_custom_bases(pool))
            .filter(|pool| seen.insert(pool.address))
            .cloned()
            .collect()
    }

    /// A token with registered custom bases may only appear in pools whose
    /// other side is one of those bases.
    fn passes_custom_bases(&self, pool: &Pool) -> bool {
        if let Some(bases) = self.overrides.custom_bases.get(&pool.token0.address) {
            if !bases.contains(&pool.token1) {
                return false;
            }
        }
        if let Some(bases) = self.overrides.custom_bases.get(&pool.token1.address) {
            if !bases.contains(&pool.token0) {
                return false;
            }
        }
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        frontier: &Token,
        token_out: &Token,
        pools: &[Pool],
        current: &mut Vec<Pool>,
        routes: &mut Vec<Route>,
        token_in: &Token,
        hops_left: usize,
    ) {
        for pool in pools {
            if !pool.involves(frontier)
                || current.iter().any(|used| used.address == pool.address)
            {
                continue;
            }
            let Some(next) = pool.counterpart(frontier) else {
                continue;
            };
            if next == token_out {
                let mut path = current.clone();
                path.push(pool.clone());
                if let Some(route) = Route::new(path, token_in.clone(), token_out.clone()) {
                    routes.push(route);
                }
            } else if hops_left > 1 {
                let next = next.clone();
                current.push(pool.clone());
                self.walk(
                    &next, token_out, pools, current, routes, token_in, hops_left - 1,
                );
                current.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::FeeTier;
    use itertools::Itertools;

    fn token(byte: u8, symbol: &str) -> Token {
        Token::new(chains::MAINNET, Address::repeat_byte(byte), 18, symbol)
    }

    fn pool(id: u8, a: &Token, b: &Token) -> Pool {
        Pool::new(
            Address::repeat_byte(id),
            a.clone(),
            b.clone(),
            FeeTier::Medium,
            0,
            0.0,
        )
        .unwrap()
    }

    /// A, C as endpoints, B registered as an additional bridge for A.
    fn enumerator_with_bridge(bridge: &Token, endpoint: &Token) -> RouteEnumerator {
        let mut overrides = BridgeOverrides::default();
        overrides
            .additional_bases
            .insert(endpoint.address, vec![bridge.clone()]);
        RouteEnumerator::new(chains::MAINNET).with_overrides(overrides)
    }

    #[test]
    fn test_two_hop_path_through_bridge() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let c = token(0x03, "C");
        let pools = vec![pool(0xaa, &a, &b), pool(0xbb, &b, &c)];

        let enumerator = enumerator_with_bridge(&b, &a);
        let routes = enumerator.enumerate(&a, &c, &pools, 2);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].hops(), 2);
        assert_eq!(routes[0].token_path(), vec![a, b, c]);
    }

    #[test]
    fn test_hop_budget_of_one_excludes_indirect() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let c = token(0x03, "C");
        let pools = vec![pool(0xaa, &a, &b), pool(0xbb, &b, &c)];

        let enumerator = enumerator_with_bridge(&b, &a);
        assert!(enumerator.enumerate(&a, &c, &pools, 1).is_empty());
    }

    #[test]
    fn test_direct_path_inclusion() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let c = token(0x03, "C");
        let direct = pool(0xcc, &a, &c);
        let pools = vec![pool(0xaa, &a, &b), pool(0xbb, &b, &c), direct.clone()];

        let enumerator = enumerator_with_bridge(&b, &a);
        let routes = enumerator.enumerate(&a, &c, &pools, 2);
        assert!(routes
            .iter()
            .any(|r| r.hops() == 1 && r.pools[0].address == direct.address));
    }

    #[test]
    fn test_acyclicity_and_hop_bound() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let c = token(0x03, "C");
        // Parallel pools at every edge to force many candidate paths.
        let pools = vec![
            pool(0x10, &a, &b),
            pool(0x11, &a, &b),
            pool(0x20, &b, &c),
            pool(0x21, &b, &c),
            pool(0x30, &a, &c),
        ];
        let enumerator = enumerator_with_bridge(&b, &a);
        let routes = enumerator.enumerate(&a, &c, &pools, 3);
        assert!(!routes.is_empty());
        for route in &routes {
            assert!(route.hops() <= 3);
            let ids: Vec<_> = route.pools.iter().map(|p| p.address).collect();
            assert!(ids.iter().all_unique(), "pool repeated in {ids:?}");
        }
    }

    #[test]
    fn test_determinism() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let c = token(0x03, "C");
        let pools = vec![
            pool(0x10, &a, &b),
            pool(0x11, &a, &b),
            pool(0x20, &b, &c),
            pool(0x30, &a, &c),
        ];
        let enumerator = enumerator_with_bridge(&b, &a);
        let first: Vec<String> = enumerator
            .enumerate(&a, &c, &pools, 2)
            .iter()
            .map(|r| r.id())
            .collect();
        let second: Vec<String> = enumerator
            .enumerate(&a, &c, &pools, 2)
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_same_token_and_zero_hops_yield_nothing() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let pools = vec![pool(0xaa, &a, &b)];
        let enumerator = RouteEnumerator::new(chains::MAINNET);
        assert!(enumerator.enumerate(&a, &a, &pools, 2).is_empty());
        assert!(enumerator.enumerate(&a, &b, &pools, 0).is_empty());
        assert!(enumerator.enumerate(&a, &b, &[], 2).is_empty());
    }

    #[test]
    fn test_non_bridge_intermediates_are_excluded() {
        let a = token(0x01, "A");
        let x = token(0x07, "X");
        let c = token(0x03, "C");
        // X is not a bridge and not an endpoint, so A-X-C must not appear.
        let pools = vec![pool(0xaa, &a, &x), pool(0xbb, &x, &c)];
        let enumerator = RouteEnumerator::new(chains::MAINNET);
        assert!(enumerator.enumerate(&a, &c, &pools, 2).is_empty());
    }

    #[test]
    fn test_custom_bases_restrict_pairings() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let c = token(0x03, "C");
        let direct = pool(0x30, &a, &c);
        let pools = vec![pool(0x10, &a, &b), pool(0x20, &b, &c), direct.clone()];

        // A may only trade against C: the A-B pool is excluded, killing the
        // two-hop path but keeping the direct pool.
        let mut overrides = BridgeOverrides::default();
        overrides.additional_bases.insert(a.address, vec![b.clone()]);
        overrides.custom_bases.insert(a.address, vec![c.clone()]);
        let enumerator = RouteEnumerator::new(chains::MAINNET).with_overrides(overrides);

        let routes = enumerator.enumerate(&a, &c, &pools, 2);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].pools[0].address, direct.address);
    }

    #[test]
    fn test_duplicate_pool_ids_collapse() {
        let a = token(0x01, "A");
        let b = token(0x02, "B");
        let duplicated = pool(0xaa, &a, &b);
        let pools = vec![duplicated.clone(), duplicated];
        let enumerator = RouteEnumerator::new(chains::MAINNET);
        let routes = enumerator.enumerate(&a, &b, &pools, 2);
        assert_eq!(routes.len(), 1);
    }
}
