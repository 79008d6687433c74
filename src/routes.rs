//! Route value object: an ordered chain of pools connecting two tokens.

use serde::{Deserialize, Serialize};

use crate::pools::Pool;
use crate::tokens::Token;

/// An acyclic pool path from `input` to `output`.
///
/// Constructed fresh per enumeration call and never mutated. Consecutive
/// pools share a token, the first pool involves `input`, the last involves
/// `output`, and no pool appears twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub pools: Vec<Pool>,
    pub input: Token,
    pub output: Token,
}

impl Route {
    /// Validates the path invariants; returns `None` if the pool sequence
    /// does not actually connect `input` to `output`.
    pub fn new(pools: Vec<Pool>, input: Token, output: Token) -> Option<Self> {
        if pools.is_empty() {
            return None;
        }
        let mut frontier = input.clone();
        for (i, pool) in pools.iter().enumerate() {
            if pools[..i].iter().any(|prior| prior.address == pool.address) {
                return None;
            }
            frontier = pool.counterpart(&frontier)?.clone();
        }
        if frontier != output {
            return None;
        }
        Some(Self {
            pools,
            input,
            output,
        })
    }

    pub fn hops(&self) -> usize {
        self.pools.len()
    }

    /// The token sequence traversed, starting at `input`.
    pub fn token_path(&self) -> Vec<Token> {
        let mut path = Vec::with_capacity(self.pools.len() + 1);
        path.push(self.input.clone());
        let mut frontier = self.input.clone();
        for pool in &self.pools {
            // Invariant checked at construction; counterpart cannot miss.
            let next = pool
                .counterpart(&frontier)
                .expect("route invariant: consecutive pools share a token")
                .clone();
            path.push(next.clone());
            frontier = next;
        }
        path
    }

    /// Stable identifier: the pool addresses joined in order.
    pub fn id(&self) -> String {
        self.pools
            .iter()
            .map(|p| format!("{:?}", p.address))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let legs = self
            .token_path()
            .iter()
            .map(|t| t.symbol.clone())
            .collect::<Vec<_>>()
            .join(" -> ");
        write!(f, "{legs}")
    }
}
