//! Trade request/result types shared across the quoting and selection layers.

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::routes::Route;
use crate::tokens::Token;

/// Direction of the trade: is the specified amount the input or the output?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    ExactIn,
    ExactOut,
}

/// Immutable input to one routing call, owned by the caller.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub trade_type: TradeType,
    /// The specified amount: input amount for `ExactIn`, desired output for
    /// `ExactOut`, in the token's base units.
    pub amount: U256,
    pub token_in: Token,
    pub token_out: Token,
    /// Pin quoting and pool retrieval to a historical block.
    pub block_number: Option<u64>,
}

impl TradeRequest {
    pub fn exact_in(amount: U256, token_in: Token, token_out: Token) -> Self {
        Self {
            trade_type: TradeType::ExactIn,
            amount,
            token_in,
            token_out,
            block_number: None,
        }
    }

    pub fn exact_out(amount: U256, token_in: Token, token_out: Token) -> Self {
        Self {
            trade_type: TradeType::ExactOut,
            amount,
            token_in,
            token_out,
            block_number: None,
        }
    }

    pub fn at_block(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }
}

/// A priced route at one requested amount.
#[derive(Debug, Clone)]
pub struct Quote {
    pub route: Route,
    pub amount_in: U256,
    pub amount_out: U256,
    pub gas_estimate: Option<U256>,
}

/// Per-route quoting outcome. A reverted or malformed quoter call is data
/// about that route, not an error of the batch.
#[derive(Debug, Clone)]
pub enum QuoteResult {
    Ok(Quote),
    Failure { route: Route },
}

impl QuoteResult {
    pub fn into_quote(self) -> Option<Quote> {
        match self {
            QuoteResult::Ok(quote) => Some(quote),
            QuoteResult::Failure { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QuoteResult::Failure { .. })
    }
}

/// The winning route and its quote. Ownership transfers to the caller.
#[derive(Debug, Clone)]
pub struct BestRoute {
    pub route: Route,
    pub quote: Quote,
}

/// Outcome of a routing call that completed without infrastructure failure.
///
/// `NoRoute` is a legitimate market fact — no path currently supports the
/// trade — and is deliberately not an error.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Found(BestRoute),
    NoRoute,
}

impl RouteOutcome {
    pub fn best_route(self) -> Option<BestRoute> {
        match self {
            RouteOutcome::Found(best) => Some(best),
            RouteOutcome::NoRoute => None,
        }
    }

    pub fn is_no_route(&self) -> bool {
        matches!(self, RouteOutcome::NoRoute)
    }
}
