//! Canonical pool representation and deterministic pool-address derivation.

use ethers::types::Address;
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};

use crate::chains::{self, ChainId};
use crate::tokens::Token;

/// Fee tier of a concentrated-liquidity pool, in hundredths of a bip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    pub fn as_u32(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10000,
        }
    }

    /// Unknown tiers from remote data are dropped by callers, never an error.
    pub fn from_u32(raw: u32) -> Option<FeeTier> {
        match raw {
            100 => Some(FeeTier::Lowest),
            500 => Some(FeeTier::Low),
            3000 => Some(FeeTier::Medium),
            10000 => Some(FeeTier::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for FeeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// A tradable two-token venue at one fee tier.
///
/// `token0`/`token1` are canonically ordered (lower address first) and the
/// pool address is the identity used for caching and route dedup. Pools are
/// immutable; providers refresh the whole set rather than mutating entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub address: Address,
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeTier,
    /// In-range liquidity as reported by the data source. Placeholder `1`
    /// for synthesized pools.
    pub liquidity: u128,
    /// Tracked value locked, denominated in the chain's native asset.
    /// Used only for the provider-side liquidity filter, never for route
    /// ranking. Placeholder for synthesized pools.
    pub tvl_eth: f64,
}

impl Pool {
    /// Builds a pool with canonical token ordering. Returns `None` when both
    /// sides are the same token.
    pub fn new(
        address: Address,
        token_a: Token,
        token_b: Token,
        fee: FeeTier,
        liquidity: u128,
        tvl_eth: f64,
    ) -> Option<Self> {
        if token_a == token_b {
            return None;
        }
        let (token0, token1) = if token_a.sorts_before(&token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        Some(Self {
            address,
            token0,
            token1,
            fee,
            liquidity,
            tvl_eth,
        })
    }

    /// Synthesizes a pool that may or may not exist on chain, deriving its
    /// deterministic address from the factory.
    ///
    /// The liquidity and TVL fields of a synthetic pool are placeholders that
    /// only assert existence. They MUST never be compared against real pool
    /// data or used as a ranking signal; quoting is the only price source.
    pub fn synthetic(chain_id: ChainId, token_a: Token, token_b: Token, fee: FeeTier) -> Option<Self> {
        let factory = chains::v3_factory(chain_id)?;
        if token_a == token_b {
            return None;
        }
        let (token0, token1) = if token_a.sorts_before(&token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let address = compute_pool_address(factory, token0.address, token1.address, fee);
        Some(Self {
            address,
            token0,
            token1,
            fee,
            liquidity: 1,
            tvl_eth: 1.0,
        })
    }

    pub fn involves(&self, token: &Token) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// The pool's other token, given one side. `None` if the token is not in
    /// the pool at all.
    pub fn counterpart(&self, token: &Token) -> Option<&Token> {
        if self.token0 == *token {
            Some(&self.token1)
        } else if self.token1 == *token {
            Some(&self.token0)
        } else {
            None
        }
    }
}

impl PartialEq for Pool {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Pool {}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} {}", self.token0.symbol, self.token1.symbol, self.fee)
    }
}

/// CREATE2 pool-address derivation: `keccak(0xff ++ factory ++ salt ++
/// init_code_hash)[12..]` with `salt = keccak(abi.encode(token0, token1,
/// fee))`. Tokens must already be canonically ordered.
pub fn compute_pool_address(
    factory: Address,
    token0: Address,
    token1: Address,
    fee: FeeTier,
) -> Address {
    let mut salt_preimage = [0u8; 96];
    salt_preimage[12..32].copy_from_slice(token0.as_bytes());
    salt_preimage[44..64].copy_from_slice(token1.as_bytes());
    salt_preimage[92..96].copy_from_slice(&fee.as_u32().to_be_bytes());
    let salt = keccak256(salt_preimage);

    let init_code_hash = hex::decode(chains::POOL_INIT_CODE_HASH.trim_start_matches("0x"))
        .expect("hardcoded init code hash is valid hex");

    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(factory.as_bytes());
    preimage.extend_from_slice(&salt);
    preimage.extend_from_slice(&init_code_hash);

    Address::from_slice(&keccak256(&preimage)[12..])
}
