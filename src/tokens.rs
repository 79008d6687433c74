//! Token identity and the accessor returned by token resolution.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::chains::ChainId;

/// A fungible token on a specific chain.
///
/// Identity is `(chain_id, address)`; decimals, symbol and name are metadata
/// and do not participate in equality. Instances are immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: ChainId,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: Option<String>,
}

impl Token {
    pub fn new(chain_id: ChainId, address: Address, decimals: u8, symbol: &str) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.to_string(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sorts-before comparison used for canonical pool ordering.
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Parses a token address, normalizing case before the hex decode.
///
/// Returns `None` for anything that is not a plausible 20-byte hex address;
/// callers drop such inputs silently rather than failing the whole lookup.
pub fn parse_address(raw: &str) -> Option<Address> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return None;
    }
    trimmed.to_lowercase().parse().ok()
}

/// Read-only view over a resolved token set.
///
/// Returned by `TokenCatalog::resolve` so callers can look tokens up without
/// duplicating cache logic.
#[derive(Debug, Clone, Default)]
pub struct TokenAccessor {
    by_address: HashMap<Address, Token>,
    by_symbol: HashMap<String, Token>,
}

impl TokenAccessor {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut by_address = HashMap::with_capacity(tokens.len());
        let mut by_symbol = HashMap::with_capacity(tokens.len());
        for token in tokens {
            by_symbol
                .entry(token.symbol.clone())
                .or_insert_with(|| token.clone());
            by_address.entry(token.address).or_insert(token);
        }
        Self {
            by_address,
            by_symbol,
        }
    }

    pub fn by_address(&self, address: &Address) -> Option<&Token> {
        self.by_address.get(address)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.by_symbol.get(symbol)
    }

    pub fn all(&self) -> Vec<Token> {
        self.by_address.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
