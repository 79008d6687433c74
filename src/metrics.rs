// src/metrics.rs
//
// Thin wrappers over the `metrics` facade. With the `observability` feature
// disabled every wrapper is a no-op, so call sites stay unconditional.

#[cfg(feature = "observability")]
pub fn increment_cache_hit(cache_name: &str) {
    metrics::counter!("router_cache_hit_total", 1, "cache" => cache_name.to_string());
}

#[cfg(not(feature = "observability"))]
pub fn increment_cache_hit(_cache_name: &str) {}

#[cfg(feature = "observability")]
pub fn increment_cache_miss(cache_name: &str) {
    metrics::counter!("router_cache_miss_total", 1, "cache" => cache_name.to_string());
}

#[cfg(not(feature = "observability"))]
pub fn increment_cache_miss(_cache_name: &str) {}

#[cfg(feature = "observability")]
pub fn set_cache_size(cache_name: &str, size: f64) {
    metrics::gauge!("router_cache_size", size, "cache" => cache_name.to_string());
}

#[cfg(not(feature = "observability"))]
pub fn set_cache_size(_cache_name: &str, _size: f64) {}

#[cfg(feature = "observability")]
pub fn record_multicall_batch_size(size: f64) {
    metrics::histogram!("router_multicall_batch_size", size);
}

#[cfg(not(feature = "observability"))]
pub fn record_multicall_batch_size(_size: f64) {}

#[cfg(feature = "observability")]
pub fn increment_provider_fallback(provider: &str) {
    metrics::counter!("router_provider_fallback_total", 1, "provider" => provider.to_string());
}

#[cfg(not(feature = "observability"))]
pub fn increment_provider_fallback(_provider: &str) {}

#[cfg(feature = "observability")]
pub fn record_quote_batch(total: usize, failed: usize) {
    metrics::histogram!("router_quote_batch_total", total as f64);
    metrics::histogram!("router_quote_batch_failed", failed as f64);
}

#[cfg(not(feature = "observability"))]
pub fn record_quote_batch(_total: usize, _failed: usize) {}

#[cfg(feature = "observability")]
pub fn increment_subgraph_pages(count: u64) {
    metrics::counter!("router_subgraph_pages_total", count);
}

#[cfg(not(feature = "observability"))]
pub fn increment_subgraph_pages(_count: u64) {}
