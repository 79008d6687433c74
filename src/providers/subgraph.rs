//! Remote indexing-service provider.
//!
//! Pages through the service's pool dataset with an `id_gt` cursor until a
//! short page signals completion. Page fetches are strictly sequential:
//! applying pages out of order would silently truncate the result set.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use tokio::time::{sleep, timeout};

use crate::chains::{self, ChainId};
use crate::errors::ProviderError;
use crate::metrics;
use crate::pools::{FeeTier, Pool};
use crate::providers::PoolGraphProvider;
use crate::retry::{IndexingLagPolicy, RetryPolicy};
use crate::settings::Settings;
use crate::tokens::{parse_address, Token};

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<PoolsData>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PoolsData {
    pools: Vec<RawPool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPool {
    pub id: String,
    pub token0: RawToken,
    pub token1: RawToken,
    #[serde(rename = "feeTier")]
    pub fee_tier: String,
    #[serde(default)]
    pub liquidity: String,
    #[serde(rename = "totalValueLockedETH", default)]
    pub total_value_locked_eth: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawToken {
    pub id: String,
    pub symbol: Option<String>,
    pub decimals: Option<String>,
}

/// Pool provider backed by a GraphQL-style indexing service.
pub struct SubgraphPoolProvider {
    chain_id: ChainId,
    url: String,
    client: reqwest::Client,
    page_size: usize,
    retry: RetryPolicy,
    lag: IndexingLagPolicy,
    total_timeout: Duration,
    min_tracked_eth: f64,
    allowlist: HashSet<ethers::types::Address>,
}

impl SubgraphPoolProvider {
    pub fn new(chain_id: ChainId, url: String, settings: &Settings) -> Self {
        Self {
            chain_id,
            url,
            client: reqwest::Client::new(),
            page_size: settings.subgraph.page_size,
            retry: RetryPolicy::from_settings(&settings.retry),
            lag: IndexingLagPolicy::new(settings.subgraph.block_rollback),
            total_timeout: Duration::from_secs(settings.subgraph.total_timeout_seconds),
            min_tracked_eth: settings.subgraph.min_tracked_eth,
            allowlist: chains::liquidity_filter_allowlist(chain_id)
                .into_iter()
                .collect(),
        }
    }

    fn build_body(&self, cursor: &str, block_number: Option<u64>) -> serde_json::Value {
        let block_clause = block_number
            .map(|b| format!(", block: {{ number: {b} }}"))
            .unwrap_or_default();
        let query = format!(
            "query pools($pageSize: Int!, $id: String) {{ \
               pools(first: $pageSize{block_clause}, where: {{ id_gt: $id }}) {{ \
                 id token0 {{ id symbol decimals }} token1 {{ id symbol decimals }} \
                 feeTier liquidity totalValueLockedETH \
               }} \
             }}"
        );
        json!({
            "query": query,
            "variables": { "pageSize": self.page_size, "id": cursor },
        })
    }

    async fn fetch_page(&self, cursor: &str, block_number: Option<u64>) -> Result<Vec<RawPool>> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.build_body(cursor, block_number))
            .send()
            .await?
            .error_for_status()?;
        let parsed: GraphResponse = response.json().await?;

        if let Some(errors) = parsed.errors {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(anyhow!("indexing service error: {message}"));
        }
        parsed
            .data
            .map(|d| d.pools)
            .ok_or_else(|| anyhow!("indexing service returned no data"))
    }

    /// One page with bounded retry. Detecting indexing lag rolls the pinned
    /// block back instead of retrying a block the indexer does not have;
    /// the adjusted block is handed back so later pages stay consistent.
    async fn fetch_page_with_retry(
        &self,
        cursor: &str,
        mut block_number: Option<u64>,
    ) -> Result<(Vec<RawPool>, Option<u64>), ProviderError> {
        let mut backoff = self.retry.backoff();
        let mut attempt: u32 = 0;
        loop {
            let message = match timeout(
                self.retry.attempt_timeout,
                self.fetch_page(cursor, block_number),
            )
            .await
            {
                Ok(Ok(page)) => return Ok((page, block_number)),
                Ok(Err(e)) => {
                    let message = e.to_string();
                    if IndexingLagPolicy::is_lag_error(&message) {
                        if let Some(block) = block_number {
                            let adjusted = self.lag.adjust_block(block);
                            warn!(
                                "indexing service behind block {block}, rolling back to {adjusted}"
                            );
                            block_number = Some(adjusted);
                        }
                    }
                    message
                }
                Err(_) => format!("page fetch timed out after {:?}", self.retry.attempt_timeout),
            };

            attempt += 1;
            if attempt > self.retry.max_retries {
                return Err(ProviderError::transient(
                    format!("subgraph page fetch: {message}"),
                    attempt,
                ));
            }
            debug!("subgraph page attempt {attempt} failed ({message}), retrying");
            if let Some(delay) = backoff.next() {
                sleep(delay).await;
            }
        }
    }

    async fn fetch_all(&self, block_number: Option<u64>) -> Result<Vec<Pool>, ProviderError> {
        let mut raw: Vec<RawPool> = Vec::new();
        let mut cursor = String::new();
        let mut block = block_number;
        let mut pages: u64 = 0;

        loop {
            let (page, adjusted_block) = self.fetch_page_with_retry(&cursor, block).await?;
            block = adjusted_block;
            pages += 1;
            let page_len = page.len();
            if let Some(last) = page.last() {
                cursor = last.id.clone();
            }
            raw.extend(page);
            if page_len < self.page_size {
                break;
            }
        }
        metrics::increment_subgraph_pages(pages);

        let total = raw.len();
        let pools = self.convert_and_filter(raw);
        info!(
            "subgraph returned {total} pools over {pages} page(s), {} after filtering",
            pools.len()
        );
        Ok(pools)
    }

    /// Converts raw rows to pools, dropping rows with unknown fee tiers or
    /// unparseable addresses, filtering out pools below the tracked-value
    /// threshold (allowlisted tokens exempt), and deduplicating by address.
    fn convert_and_filter(&self, raw: Vec<RawPool>) -> Vec<Pool> {
        let mut seen = HashSet::new();
        let mut pools = Vec::with_capacity(raw.len());
        for row in raw {
            let Some(pool) = self.convert(row) else {
                continue;
            };
            let allowlisted = self.allowlist.contains(&pool.token0.address)
                || self.allowlist.contains(&pool.token1.address);
            if pool.tvl_eth < self.min_tracked_eth && !allowlisted {
                continue;
            }
            if seen.insert(pool.address) {
                pools.push(pool);
            }
        }
        pools
    }

    fn convert(&self, row: RawPool) -> Option<Pool> {
        let address = parse_address(&row.id)?;
        let fee = FeeTier::from_u32(row.fee_tier.parse().ok()?)?;
        let token0 = self.convert_token(&row.token0)?;
        let token1 = self.convert_token(&row.token1)?;
        let liquidity = row.liquidity.parse().unwrap_or(0u128);
        let tvl_eth = row.total_value_locked_eth.parse().unwrap_or(0.0f64);
        Pool::new(address, token0, token1, fee, liquidity, tvl_eth)
    }

    fn convert_token(&self, raw: &RawToken) -> Option<Token> {
        let address = parse_address(&raw.id)?;
        let decimals = raw
            .decimals
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or(18u8);
        let symbol = raw.symbol.clone().unwrap_or_else(|| "UNKNOWN".to_string());
        Some(Token::new(self.chain_id, address, decimals, &symbol))
    }
}

#[async_trait]
impl PoolGraphProvider for SubgraphPoolProvider {
    async fn get_pools(
        &self,
        _token_in: Option<&Token>,
        _token_out: Option<&Token>,
        block_number: Option<u64>,
    ) -> Result<Vec<Pool>, ProviderError> {
        // The whole pagination races one generous ceiling; a stuck service
        // must escalate to the fallback chain, not hang the request.
        match timeout(self.total_timeout, self.fetch_all(block_number)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::transient(
                format!(
                    "subgraph pagination exceeded total timeout {:?}",
                    self.total_timeout
                ),
                1,
            )),
        }
    }

    fn name(&self) -> &'static str {
        "subgraph"
    }
}
