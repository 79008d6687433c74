//! Multicall batch executor.
//!
//! Batches many independent read calls into a single RPC request with
//! per-call success flags, so one reverting call never poisons the batch.
//! Used by the token catalog (ERC-20 metadata) and the quote engine (quoter
//! reads, which revert routinely and must be surfaced as data).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use ethers::abi::{self, Function, Param, ParamType, StateMutability, Token as AbiToken};
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockId, Bytes, TransactionRequest};
use indexmap::IndexMap;
use log::debug;

use crate::errors::ProviderError;
use crate::metrics;
use crate::retry::{retry_with_timeout, RetryPolicy};

/// A single read to be batched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Call {
    pub target: Address,
    pub call_data: Bytes,
    /// Gas ceiling for this call inside the batch. Networks that meter gas
    /// differently need a higher ceiling (see `chains::quote_gas_limit`).
    pub gas_limit: u64,
}

/// Outcome of one batched call. `success == false` means the call reverted
/// or ran out of its gas allowance; `return_data` is then the revert blob.
#[derive(Debug, Clone)]
pub struct CallResult {
    pub success: bool,
    pub return_data: Bytes,
}

impl CallResult {
    pub fn ok_data(&self) -> Option<&[u8]> {
        if self.success {
            Some(self.return_data.as_ref())
        } else {
            None
        }
    }
}

/// Batched read executor against a multicall contract that tolerates
/// per-call failure (`multicall((address,uint256,bytes)[])`).
pub struct Multicall<M: Middleware> {
    provider: Arc<M>,
    multicall_address: Address,
    batch_size: usize,
    retry: RetryPolicy,
}

// Manual impl: cloning shares the provider, so `M: Clone` is not required.
impl<M: Middleware> Clone for Multicall<M> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            multicall_address: self.multicall_address,
            batch_size: self.batch_size,
            retry: self.retry.clone(),
        }
    }
}

impl<M: Middleware + 'static> Multicall<M> {
    pub fn new(provider: Arc<M>, multicall_address: Address, batch_size: usize) -> Self {
        // RPC providers commonly reject oversized batches.
        let batch_size = batch_size.clamp(10, 500);
        Self {
            provider,
            multicall_address,
            batch_size,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.retry.attempt_timeout = timeout;
        self
    }

    /// Runs a batch of calls, optionally pinned to a block. Results come
    /// back in the same order as `calls`; identical calls are coalesced into
    /// one wire call and fanned back out.
    pub async fn run(
        &self,
        calls: Vec<Call>,
        block_number: Option<u64>,
    ) -> Result<Vec<CallResult>, ProviderError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let mut unique: IndexMap<Call, ()> = IndexMap::new();
        let mut original_indices = vec![0usize; calls.len()];
        for (i, call) in calls.iter().enumerate() {
            let (index, _) = unique.insert_full(call.clone(), ());
            original_indices[i] = index;
        }
        let unique_calls: Vec<Call> = unique.into_keys().collect();
        debug!(
            "multicall coalesced {} calls into {}",
            calls.len(),
            unique_calls.len()
        );

        let block = block_number.map(BlockId::from);
        let mut unique_results: Vec<CallResult> = Vec::with_capacity(unique_calls.len());
        for chunk in unique_calls.chunks(self.batch_size) {
            metrics::record_multicall_batch_size(chunk.len() as f64);
            let results = retry_with_timeout(&self.retry, "multicall", |_| {
                self.execute_chunk(chunk, block)
            })
            .await?;
            unique_results.extend(results);
        }

        Ok(original_indices
            .into_iter()
            .map(|index| unique_results[index].clone())
            .collect())
    }

    async fn execute_chunk(
        &self,
        calls: &[Call],
        block: Option<BlockId>,
    ) -> Result<Vec<CallResult>> {
        let call_tokens: Vec<AbiToken> = calls
            .iter()
            .map(|call| {
                AbiToken::Tuple(vec![
                    AbiToken::Address(call.target),
                    AbiToken::Uint(call.gas_limit.into()),
                    AbiToken::Bytes(call.call_data.to_vec()),
                ])
            })
            .collect();

        let function = multicall_function();
        let calldata = function.encode_input(&[AbiToken::Array(call_tokens)])?;

        let tx = TransactionRequest::new()
            .to(self.multicall_address)
            .data(calldata);
        let typed: TypedTransaction = tx.into();
        let response = self
            .provider
            .call(&typed, block)
            .await
            .map_err(|e| anyhow!("multicall transport error: {e}"))?;

        decode_multicall_response(&response, calls.len())
    }
}

/// `multicall((address target, uint256 gasLimit, bytes callData)[]) returns
/// (uint256 blockNumber, (bool success, uint256 gasUsed, bytes returnData)[])`
#[allow(deprecated)]
fn multicall_function() -> Function {
    Function {
        name: "multicall".to_string(),
        inputs: vec![Param {
            name: "calls".to_string(),
            kind: ParamType::Array(Box::new(ParamType::Tuple(vec![
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Bytes,
            ]))),
            internal_type: None,
        }],
        outputs: vec![
            Param {
                name: "blockNumber".to_string(),
                kind: ParamType::Uint(256),
                internal_type: None,
            },
            Param {
                name: "returnData".to_string(),
                kind: ParamType::Array(Box::new(ParamType::Tuple(vec![
                    ParamType::Bool,
                    ParamType::Uint(256),
                    ParamType::Bytes,
                ]))),
                internal_type: None,
            },
        ],
        constant: None,
        state_mutability: StateMutability::NonPayable,
    }
}

fn decode_multicall_response(response: &[u8], expected: usize) -> Result<Vec<CallResult>> {
    let decoded = abi::decode(
        &[
            ParamType::Uint(256),
            ParamType::Array(Box::new(ParamType::Tuple(vec![
                ParamType::Bool,
                ParamType::Uint(256),
                ParamType::Bytes,
            ]))),
        ],
        response,
    )?;

    let results = decoded
        .into_iter()
        .nth(1)
        .and_then(|t| t.into_array())
        .ok_or_else(|| anyhow!("malformed multicall response"))?;

    if results.len() != expected {
        return Err(anyhow!(
            "multicall returned {} results for {} calls",
            results.len(),
            expected
        ));
    }

    let mut out = Vec::with_capacity(results.len());
    for token in results {
        let parts = token
            .into_tuple()
            .ok_or_else(|| anyhow!("malformed multicall result tuple"))?;
        if parts.len() != 3 {
            return Err(anyhow!("malformed multicall result tuple"));
        }
        let success = parts[0].clone().into_bool().unwrap_or(false);
        let data = parts[2].clone().into_bytes().unwrap_or_default();
        out.push(CallResult {
            success,
            return_data: Bytes::from(data),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn test_encode_has_stable_selector() {
        let function = multicall_function();
        let calls = vec![AbiToken::Tuple(vec![
            AbiToken::Address(Address::repeat_byte(0x11)),
            AbiToken::Uint(U256::from(1_000_000u64)),
            AbiToken::Bytes(vec![0xde, 0xad]),
        ])];
        let a = function
            .encode_input(&[AbiToken::Array(calls.clone())])
            .unwrap();
        let b = function.encode_input(&[AbiToken::Array(calls)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[..4], function.short_signature());
    }

    #[test]
    fn test_decode_round_trip() {
        // Simulate the contract's response: one success, one revert.
        let encoded = abi::encode(&[
            AbiToken::Uint(U256::from(123u64)),
            AbiToken::Array(vec![
                AbiToken::Tuple(vec![
                    AbiToken::Bool(true),
                    AbiToken::Uint(U256::from(21000u64)),
                    AbiToken::Bytes(vec![0x01, 0x02]),
                ]),
                AbiToken::Tuple(vec![
                    AbiToken::Bool(false),
                    AbiToken::Uint(U256::zero()),
                    AbiToken::Bytes(vec![]),
                ]),
            ]),
        ]);
        let results = decode_multicall_response(&encoded, 2).unwrap();
        assert!(results[0].success);
        assert_eq!(results[0].return_data.as_ref(), &[0x01, 0x02]);
        assert!(!results[1].success);
        assert!(results[1].ok_data().is_none());
    }

    #[test]
    fn test_decode_rejects_count_mismatch() {
        let encoded = abi::encode(&[
            AbiToken::Uint(U256::zero()),
            AbiToken::Array(Vec::<AbiToken>::new()),
        ]);
        assert!(decode_multicall_response(&encoded, 1).is_err());
    }
}
