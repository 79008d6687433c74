//! Best-route selection over the quoted candidates.

use log::debug;

use crate::trade::{BestRoute, Quote, QuoteResult, RouteOutcome, TradeType};

/// Picks the single best route: largest output for exact-in, smallest input
/// for exact-out. Failed quotes are dropped first; none surviving is the
/// legitimate `NoRoute` outcome.
///
/// Exact ties keep the enumeration order (`sort_by` is stable and the
/// comparator returns `Equal` on ties). That first-discovered-wins behavior
/// is preserved for compatibility with the reference implementation, not a
/// guarantee callers should lean on.
pub fn select(quoted: Vec<QuoteResult>, trade_type: TradeType) -> RouteOutcome {
    let total = quoted.len();
    let mut valid: Vec<Quote> = quoted.into_iter().filter_map(QuoteResult::into_quote).collect();
    debug!("{} of {total} quotes usable", valid.len());

    if valid.is_empty() {
        return RouteOutcome::NoRoute;
    }

    valid.sort_by(|a, b| match trade_type {
        TradeType::ExactIn => b.amount_out.cmp(&a.amount_out),
        TradeType::ExactOut => a.amount_in.cmp(&b.amount_in),
    });

    let best = valid.swap_remove(0);
    RouteOutcome::Found(BestRoute {
        route: best.route.clone(),
        quote: best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains;
    use crate::pools::{FeeTier, Pool};
    use crate::routes::Route;
    use crate::tokens::Token;
    use ethers::types::{Address, U256};

    fn route(id: u8) -> Route {
        let a = Token::new(chains::MAINNET, Address::repeat_byte(0x01), 18, "A");
        let b = Token::new(chains::MAINNET, Address::repeat_byte(0x02), 18, "B");
        let pool = Pool::new(
            Address::repeat_byte(id),
            a.clone(),
            b.clone(),
            FeeTier::Medium,
            0,
            0.0,
        )
        .unwrap();
        Route::new(vec![pool], a, b).unwrap()
    }

    fn quote(id: u8, amount_in: u64, amount_out: u64) -> QuoteResult {
        QuoteResult::Ok(Quote {
            route: route(id),
            amount_in: U256::from(amount_in),
            amount_out: U256::from(amount_out),
            gas_estimate: None,
        })
    }

    #[test]
    fn test_exact_in_prefers_larger_output() {
        let outcome = select(
            vec![quote(0x0a, 100, 90), quote(0x0b, 100, 95), quote(0x0c, 100, 92)],
            TradeType::ExactIn,
        );
        let best = outcome.best_route().unwrap();
        assert_eq!(best.route.pools[0].address, Address::repeat_byte(0x0b));
        assert_eq!(best.quote.amount_out, U256::from(95u64));
    }

    #[test]
    fn test_exact_out_prefers_smaller_input() {
        let outcome = select(
            vec![quote(0x0a, 110, 100), quote(0x0b, 105, 100), quote(0x0c, 120, 100)],
            TradeType::ExactOut,
        );
        let best = outcome.best_route().unwrap();
        assert_eq!(best.route.pools[0].address, Address::repeat_byte(0x0b));
        assert_eq!(best.quote.amount_in, U256::from(105u64));
    }

    #[test]
    fn test_failures_are_dropped() {
        let outcome = select(
            vec![
                QuoteResult::Failure { route: route(0x0a) },
                quote(0x0b, 100, 90),
            ],
            TradeType::ExactIn,
        );
        let best = outcome.best_route().unwrap();
        assert_eq!(best.route.pools[0].address, Address::repeat_byte(0x0b));
    }

    #[test]
    fn test_all_failures_is_no_route() {
        let outcome = select(
            vec![
                QuoteResult::Failure { route: route(0x0a) },
                QuoteResult::Failure { route: route(0x0b) },
            ],
            TradeType::ExactIn,
        );
        assert!(outcome.is_no_route());
        assert!(select(vec![], TradeType::ExactIn).is_no_route());
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let outcome = select(
            vec![quote(0x0a, 100, 90), quote(0x0b, 100, 90)],
            TradeType::ExactIn,
        );
        let best = outcome.best_route().unwrap();
        assert_eq!(best.route.pools[0].address, Address::repeat_byte(0x0a));
    }

    #[test]
    fn test_selection_monotonicity() {
        // For every pair where A strictly beats B, B must never win.
        for (out_a, out_b) in [(91u64, 90u64), (1000, 1), (2, 1)] {
            let outcome = select(
                vec![quote(0x0b, 100, out_b), quote(0x0a, 100, out_a)],
                TradeType::ExactIn,
            );
            let best = outcome.best_route().unwrap();
            assert_eq!(best.quote.amount_out, U256::from(out_a));
        }
    }
}
