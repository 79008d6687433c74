//! Read-only contract ABI surface.
//!
//! Hand-built `Function` descriptors for the three contract families the
//! engine reads: ERC-20 metadata, pool token accessors, and the quoter. No
//! generated bindings; the ABI shapes are small and stable.

use ethers::abi::{self, Function, Param, ParamType, StateMutability, Token as AbiToken};
use ethers::types::{Address, Bytes, U256};

use crate::pools::FeeTier;
use crate::routes::Route;
use crate::trade::TradeType;

#[allow(deprecated)]
fn view_function(name: &str, inputs: Vec<Param>, outputs: Vec<Param>) -> Function {
    Function {
        name: name.to_string(),
        inputs,
        outputs,
        constant: None,
        state_mutability: StateMutability::View,
    }
}

fn param(name: &str, kind: ParamType) -> Param {
    Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    }
}

/// `symbol() -> string` (decoded leniently, see [`decode_symbol`]).
pub fn erc20_symbol() -> Function {
    view_function("symbol", vec![], vec![param("", ParamType::String)])
}

/// `decimals() -> uint8`
pub fn erc20_decimals() -> Function {
    view_function("decimals", vec![], vec![param("", ParamType::Uint(8))])
}

/// QuoterV2 `quoteExactInput(bytes path, uint256 amountIn)`.
pub fn quote_exact_input() -> Function {
    view_function(
        "quoteExactInput",
        vec![
            param("path", ParamType::Bytes),
            param("amountIn", ParamType::Uint(256)),
        ],
        quoter_outputs("amountOut"),
    )
}

/// QuoterV2 `quoteExactOutput(bytes path, uint256 amountOut)`; the path is
/// encoded output-first.
pub fn quote_exact_output() -> Function {
    view_function(
        "quoteExactOutput",
        vec![
            param("path", ParamType::Bytes),
            param("amountOut", ParamType::Uint(256)),
        ],
        quoter_outputs("amountIn"),
    )
}

fn quoter_outputs(amount_name: &str) -> Vec<Param> {
    vec![
        param(amount_name, ParamType::Uint(256)),
        param(
            "sqrtPriceX96AfterList",
            ParamType::Array(Box::new(ParamType::Uint(160))),
        ),
        param(
            "initializedTicksCrossedList",
            ParamType::Array(Box::new(ParamType::Uint(32))),
        ),
        param("gasEstimate", ParamType::Uint(256)),
    ]
}

/// Decodes an ERC-20 `symbol()` response. Standard tokens return a string;
/// a handful of old deployments return `bytes32`, handled as a fallback.
pub fn decode_symbol(data: &[u8]) -> Option<String> {
    if let Ok(tokens) = abi::decode(&[ParamType::String], data) {
        if let Some(AbiToken::String(s)) = tokens.into_iter().next() {
            if !s.is_empty() {
                return Some(s);
            }
        }
    }
    if data.len() == 32 {
        let end = data.iter().position(|&b| b == 0).unwrap_or(32);
        let s = std::str::from_utf8(&data[..end]).ok()?;
        if !s.is_empty() {
            return Some(s.to_string());
        }
    }
    None
}

/// Decodes an ERC-20 `decimals()` response.
pub fn decode_decimals(data: &[u8]) -> Option<u8> {
    let tokens = abi::decode(&[ParamType::Uint(8)], data).ok()?;
    let value = tokens.into_iter().next()?.into_uint()?;
    if value > U256::from(u8::MAX) {
        return None;
    }
    Some(value.low_u32() as u8)
}

/// Decodes a QuoterV2 response into `(amount, gas_estimate)`.
pub fn decode_quote(function: &Function, data: &[u8]) -> Option<(U256, U256)> {
    let tokens = function.decode_output(data).ok()?;
    let amount = tokens.first()?.clone().into_uint()?;
    let gas_estimate = tokens.get(3)?.clone().into_uint()?;
    Some((amount, gas_estimate))
}

/// Packed quoter path: `token(20) ++ fee(3) ++ token(20) ++ ...`.
pub fn encode_path(tokens: &[Address], fees: &[FeeTier]) -> Bytes {
    debug_assert_eq!(tokens.len(), fees.len() + 1);
    let mut out = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    for (i, fee) in fees.iter().enumerate() {
        out.extend_from_slice(tokens[i].as_bytes());
        out.extend_from_slice(&fee.as_u32().to_be_bytes()[1..]);
    }
    if let Some(last) = tokens.last() {
        out.extend_from_slice(last.as_bytes());
    }
    Bytes::from(out)
}

/// Encodes a route as a quoter path. Exact-output quotes walk the path in
/// reverse, so the encoded token order flips while fees stay adjacent to
/// the same hop.
pub fn encode_route_path(route: &Route, trade_type: TradeType) -> Bytes {
    let mut tokens: Vec<Address> = route.token_path().iter().map(|t| t.address).collect();
    let mut fees: Vec<FeeTier> = route.pools.iter().map(|p| p.fee).collect();
    if trade_type == TradeType::ExactOut {
        tokens.reverse();
        fees.reverse();
    }
    encode_path(&tokens, &fees)
}
