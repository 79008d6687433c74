//! Per-chain constant tables.
//!
//! Wrapped-native tokens, well-known seed tokens, bridge tokens, and the
//! contract addresses the engine reads from are data, not logic, so they all
//! live here instead of being scattered through provider code.

use std::collections::HashMap;

use ethers::types::Address;
use once_cell::sync::Lazy;

use crate::tokens::Token;

pub type ChainId = u64;

pub const MAINNET: ChainId = 1;
pub const OPTIMISM: ChainId = 10;
pub const POLYGON: ChainId = 137;
pub const BASE: ChainId = 8453;
pub const ARBITRUM: ChainId = 42161;

const SUPPORTED: [ChainId; 5] = [MAINNET, OPTIMISM, POLYGON, BASE, ARBITRUM];

/// Deployed on every supported chain at the same address.
const MULTICALL3: &str = "0xca11bde05977b3631167028862be2a173976ca11";
/// Uniswap V3 QuoterV2, shared deployment on the original chains.
const QUOTER_V2: &str = "0x61ffe014ba17989e743c5f6cb21bf9697530b21e";
const QUOTER_V2_BASE: &str = "0x3d4e44eb1374240ce5f1b871ab261cd16335b76a";
const V3_FACTORY: &str = "0x1f98431c8ad98523631ae4a59f267346ea31f984";
const V3_FACTORY_BASE: &str = "0x33128a8fc17869897dce68ed026d694621f6fdfd";

/// keccak256 of the V3 pool creation bytecode, used for deterministic
/// pool-address derivation.
pub const POOL_INIT_CODE_HASH: &str =
    "0xe34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54";

fn addr(raw: &str) -> Address {
    raw.parse().expect("hardcoded address is valid")
}

fn token(chain_id: ChainId, raw: &str, decimals: u8, symbol: &str, name: &str) -> Token {
    Token::new(chain_id, addr(raw), decimals, symbol).with_name(name)
}

pub fn is_supported(chain_id: ChainId) -> bool {
    SUPPORTED.contains(&chain_id)
}

/// The chain's wrapped-native token. The pool graph never contains the bare
/// native asset, so lookups of `"ETH"` and native sentinels redirect here.
pub fn wrapped_native(chain_id: ChainId) -> Option<Token> {
    let t = match chain_id {
        MAINNET => token(
            MAINNET,
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            18,
            "WETH",
            "Wrapped Ether",
        ),
        OPTIMISM => token(
            OPTIMISM,
            "0x4200000000000000000000000000000000000006",
            18,
            "WETH",
            "Wrapped Ether",
        ),
        POLYGON => token(
            POLYGON,
            "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270",
            18,
            "WMATIC",
            "Wrapped MATIC",
        ),
        BASE => token(
            BASE,
            "0x4200000000000000000000000000000000000006",
            18,
            "WETH",
            "Wrapped Ether",
        ),
        ARBITRUM => token(
            ARBITRUM,
            "0x82af49447d8a07e3bd95bd0d56f35241523fbab1",
            18,
            "WETH",
            "Wrapped Ether",
        ),
        _ => return None,
    };
    Some(t)
}

/// Well-known tokens per chain, used to seed the catalog so common lookups
/// never touch the chain.
static SEED_TOKENS: Lazy<HashMap<ChainId, Vec<Token>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        MAINNET,
        vec![
            wrapped_native(MAINNET).unwrap(),
            token(
                MAINNET,
                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                6,
                "USDC",
                "USD//C",
            ),
            token(
                MAINNET,
                "0xdac17f958d2ee523a2206206994597c13d831ec7",
                6,
                "USDT",
                "Tether USD",
            ),
            token(
                MAINNET,
                "0x6b175474e89094c44da98b954eedeac495271d0f",
                18,
                "DAI",
                "Dai Stablecoin",
            ),
            token(
                MAINNET,
                "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
                8,
                "WBTC",
                "Wrapped BTC",
            ),
            token(
                MAINNET,
                "0x956f47f50a910163d8bf957cf5846d573e7f87ca",
                18,
                "FEI",
                "Fei USD",
            ),
        ],
    );
    map.insert(
        OPTIMISM,
        vec![
            wrapped_native(OPTIMISM).unwrap(),
            token(
                OPTIMISM,
                "0x7f5c764cbc14f9669b88837ca1490cca17c31607",
                6,
                "USDC",
                "USD//C",
            ),
            token(
                OPTIMISM,
                "0x94b008aa00579c1307b0ef2c499ad98a8ce58e58",
                6,
                "USDT",
                "Tether USD",
            ),
            token(
                OPTIMISM,
                "0xda10009cbd5d07dd0cecc66161fc93d7c9000da1",
                18,
                "DAI",
                "Dai Stablecoin",
            ),
        ],
    );
    map.insert(
        POLYGON,
        vec![
            wrapped_native(POLYGON).unwrap(),
            token(
                POLYGON,
                "0x2791bca1f2de4661ed88a30c99a7a9449aa84174",
                6,
                "USDC",
                "USD//C",
            ),
            token(
                POLYGON,
                "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619",
                18,
                "WETH",
                "Wrapped Ether",
            ),
            token(
                POLYGON,
                "0x8f3cf7ad23cd3cadbd9735aff958023239c6a063",
                18,
                "DAI",
                "Dai Stablecoin",
            ),
        ],
    );
    map.insert(
        BASE,
        vec![
            wrapped_native(BASE).unwrap(),
            token(
                BASE,
                "0xd9aaec86b65d86f6a7b5b1b0c42ffa531710b6ca",
                6,
                "USDbC",
                "USD Base Coin",
            ),
            token(
                BASE,
                "0x50c5725949a6f0c72e6c4a641f24049a917db0cb",
                18,
                "DAI",
                "Dai Stablecoin",
            ),
        ],
    );
    map.insert(
        ARBITRUM,
        vec![
            wrapped_native(ARBITRUM).unwrap(),
            token(
                ARBITRUM,
                "0xaf88d065e77c8cc2239327c5edb3a432268e5831",
                6,
                "USDC",
                "USD Coin",
            ),
            token(
                ARBITRUM,
                "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9",
                6,
                "USDT",
                "Tether USD",
            ),
            token(
                ARBITRUM,
                "0xda10009cbd5d07dd0cecc66161fc93d7c9000da1",
                18,
                "DAI",
                "Dai Stablecoin",
            ),
            token(
                ARBITRUM,
                "0x2f2a2543b76a4166549f7aab2e75bef0aefc5b0f",
                8,
                "WBTC",
                "Wrapped BTC",
            ),
        ],
    );
    map
});

pub fn seed_tokens(chain_id: ChainId) -> Vec<Token> {
    SEED_TOKENS.get(&chain_id).cloned().unwrap_or_default()
}

/// High-liquidity bridge tokens: the mandatory intermediate candidates when
/// direct pools are sparse. Wrapped native plus the chain's major stables.
pub fn bridge_tokens(chain_id: ChainId) -> Vec<Token> {
    seed_tokens(chain_id)
        .into_iter()
        .filter(|t| t.symbol != "FEI")
        .collect()
}

/// Tokens exempt from the subgraph tracked-liquidity filter. Some tokens are
/// systematically under-tracked by the indexer yet important to route through.
pub fn liquidity_filter_allowlist(chain_id: ChainId) -> Vec<Address> {
    match chain_id {
        MAINNET => vec![addr("0x956f47f50a910163d8bf957cf5846d573e7f87ca")],
        _ => Vec::new(),
    }
}

pub fn multicall_address(_chain_id: ChainId) -> Address {
    addr(MULTICALL3)
}

pub fn quoter_address(chain_id: ChainId) -> Option<Address> {
    match chain_id {
        MAINNET | OPTIMISM | POLYGON | ARBITRUM => Some(addr(QUOTER_V2)),
        BASE => Some(addr(QUOTER_V2_BASE)),
        _ => None,
    }
}

pub fn v3_factory(chain_id: ChainId) -> Option<Address> {
    match chain_id {
        MAINNET | OPTIMISM | POLYGON | ARBITRUM => Some(addr(V3_FACTORY)),
        BASE => Some(addr(V3_FACTORY_BASE)),
        _ => None,
    }
}

/// Gas ceiling for a single quoter call inside the batch. Arbitrum meters
/// gas differently and needs a far higher ceiling for the same work.
pub fn quote_gas_limit(chain_id: ChainId) -> u64 {
    match chain_id {
        ARBITRUM => 12_000_000,
        _ => 1_000_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_chains_have_full_tables() {
        for chain in SUPPORTED {
            assert!(wrapped_native(chain).is_some(), "chain {chain}");
            assert!(!seed_tokens(chain).is_empty(), "chain {chain}");
            assert!(!bridge_tokens(chain).is_empty(), "chain {chain}");
            assert!(quoter_address(chain).is_some(), "chain {chain}");
            assert!(v3_factory(chain).is_some(), "chain {chain}");
        }
    }

    #[test]
    fn test_unknown_chain_is_empty() {
        assert!(!is_supported(999));
        assert!(wrapped_native(999).is_none());
        assert!(seed_tokens(999).is_empty());
    }

    #[test]
    fn test_bridge_tokens_include_wrapped_native() {
        for chain in SUPPORTED {
            let wrapped = wrapped_native(chain).unwrap();
            assert!(bridge_tokens(chain).contains(&wrapped));
        }
    }

    #[test]
    fn test_fei_is_allowlisted_not_bridged() {
        let fei = addr("0x956f47f50a910163d8bf957cf5846d573e7f87ca");
        assert!(liquidity_filter_allowlist(MAINNET).contains(&fei));
        assert!(!bridge_tokens(MAINNET).iter().any(|t| t.address == fei));
    }
}
