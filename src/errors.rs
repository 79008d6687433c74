//! Error taxonomy for the routing engine.
//!
//! Transient data-source failures are retried inside the providers and never
//! cross the engine boundary; what callers see is either a terminal
//! `RouterError` or the non-exceptional `RouteOutcome::NoRoute` value.

use thiserror::Error;

/// Failures of a pool/token data source.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A single remote call failed or timed out after exhausting its local
    /// retry budget. Escalates to the fallback chain, not to the caller.
    #[error("data source failed after {attempts} attempt(s): {message}")]
    Transient { message: String, attempts: u32 },

    /// Every provider in the fallback chain failed. Terminal for the call.
    #[error("all {} pool providers failed: [{}]", .errors.len(), .errors.join("; "))]
    SourceExhausted { errors: Vec<String> },
}

impl ProviderError {
    pub fn transient(message: impl Into<String>, attempts: u32) -> Self {
        ProviderError::Transient {
            message: message.into(),
            attempts,
        }
    }
}

/// Failures of a whole token-resolution call. Individual bad addresses are
/// dropped silently and never surface here.
#[derive(Debug, Error)]
pub enum TokenCatalogError {
    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),

    #[error("token metadata lookup failed: {0}")]
    Resolver(#[source] anyhow::Error),
}

/// Terminal failures of `get_best_route`, distinct from `NoRoute`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Rejected before any network call is made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Pool retrieval exhausted its fallback chain — infrastructure failure,
    /// not a market fact; callers may want to offer a retry.
    #[error("pool data sources exhausted")]
    SourceExhausted(#[source] ProviderError),

    #[error("token resolution failed")]
    TokenResolution(#[source] TokenCatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_exhausted_lists_providers() {
        let err = ProviderError::SourceExhausted {
            errors: vec!["subgraph: timeout".into(), "static: no factory".into()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("all 2 pool providers failed"));
        assert!(rendered.contains("subgraph: timeout"));
    }
}
