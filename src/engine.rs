//! Matching engine: admission, the fill loop, print propagation and stop
//! promotion. This is the core of the crate.
//!
//! The print price for a fill always comes from [`print_price`], computed
//! once before either side of the trade is mutated, so there's no branch
//! where a stale or unset price could leak into a fill. `filled_amount` and
//! `total_amount` are separate integers rather than a formatted string, so
//! there's no denominator to reconstruct incorrectly on a partial fill.

use crate::errors::EngineError;
use crate::orders::{Order, OrderKind, OrderStatus, Price, Side, status_for};
use crate::store::{BookStore, PriceBound};
use crate::trade::Trade;
use tracing::{debug, trace};

/// The taker's price constraint, translated from a [`crate::validation::PlaceKind`]
/// into the bound [`BookStore::find_best_counterparty`] understands.
#[derive(Debug, Clone, Copy)]
enum TakerPrice {
    Market,
    Limit(Price),
}

/// Admits a validated order and, for MKT/LMT takers, runs the fill loop.
/// STOPLOSS orders are admitted and nothing else happens — they don't
/// trade until a print promotes them to LMT.
///
/// Returns the new order's id and every [`Trade`] the submission produced.
pub fn submit(
    store: &mut BookStore,
    symbol: &str,
    side: Side,
    kind: OrderKind,
    price: Option<Price>,
    amount: u64,
) -> Result<(u64, Vec<Trade>), EngineError> {
    let id = store.insert(symbol, side, kind, price, amount);
    debug!(order_id = id, symbol, ?side, ?kind, amount, "order admitted");

    if kind == OrderKind::StopLoss {
        return Ok((id, Vec::new()));
    }

    let taker_price = match (kind, price) {
        (OrderKind::Market, _) => TakerPrice::Market,
        (OrderKind::Limit, Some(p)) => TakerPrice::Limit(p),
        (OrderKind::Limit, None) => {
            return Err(EngineError::Internal(
                "LMT taker admitted without a price".into(),
            ));
        }
        (OrderKind::StopLoss, _) => unreachable!("handled above"),
    };

    let trades = fill_loop(store, id, side, taker_price)?;
    Ok((id, trades))
}

/// Repeatedly finds the best eligible counterparty and trades against it
/// until the taker is exhausted or none remain.
fn fill_loop(
    store: &mut BookStore,
    taker_id: u64,
    taker_side: Side,
    taker_price: TakerPrice,
) -> Result<Vec<Trade>, EngineError> {
    let mut trades = Vec::new();
    // Stops that this submission's prints triggered. Promoted stops become
    // eligible as counterparties on the next submission, not retroactively
    // on this one, so the `kind` flip to LMT is deferred until this loop
    // exits even though each print's trigger check happens immediately.
    let mut triggered_stops: Vec<u64> = Vec::new();
    let symbol = store
        .get(taker_id)
        .ok_or(EngineError::OrderNotFound(taker_id))?
        .symbol
        .clone();

    loop {
        let taker = store
            .get(taker_id)
            .ok_or(EngineError::OrderNotFound(taker_id))?;
        if taker.residual() == 0 {
            break;
        }

        let bound = match taker_price {
            TakerPrice::Market => PriceBound::Unbounded,
            TakerPrice::Limit(limit) => match taker_side {
                Side::Buy => PriceBound::Le(limit),
                Side::Sell => PriceBound::Ge(limit),
            },
        };

        let Some(cp_id) = store.find_best_counterparty(&symbol, taker_side.opposite(), bound)
        else {
            break;
        };

        let cp = store.get(cp_id).ok_or(EngineError::OrderNotFound(cp_id))?;
        let taker = store
            .get(taker_id)
            .ok_or(EngineError::OrderNotFound(taker_id))?;

        let Some(print_price) = print_price(taker_price, cp, store.last_print(&symbol)) else {
            // Both taker and counterparty are unpriced MKT orders: defer
            // rather than reject, leaving the taker resting unpriced.
            trace!(%symbol, "no priced counterparty available, deferring");
            break;
        };

        let traded = taker.residual().min(cp.residual());

        store.update(taker_id, |o| {
            o.filled_amount += traded;
            o.status = status_for(o.filled_amount, o.total_amount);
            if o.kind == OrderKind::Market && o.price.is_none() {
                o.price = Some(print_price);
            }
        })?;
        store.update(cp_id, |o| {
            o.filled_amount += traded;
            o.status = status_for(o.filled_amount, o.total_amount);
            if o.price.is_none() {
                o.price = Some(print_price);
            }
        })?;

        let trade = store.record_trade(&symbol, print_price, traded, cp_id, taker_id);
        trades.push(trade);
        debug!(%symbol, price = %print_price, traded, maker = cp_id, taker = taker_id, "fill");

        propagate_print(store, &symbol, taker_side.opposite(), print_price);
        collect_triggered_stops(store, &symbol, print_price, &mut triggered_stops);
    }

    for id in triggered_stops {
        store.update(id, |o| o.kind = OrderKind::Limit)?;
    }

    Ok(trades)
}

/// Determines the print price for a fill between the taker and `cp`.
///
/// - Both priced: the resting order's price wins (price-time priority
///   favors the maker).
/// - `cp` unpriced, taker is LMT: the taker's limit prices the trade.
/// - `cp` unpriced, taker is MKT: the pair can't price itself; fall back to
///   the symbol's last print if one exists, otherwise `None` (defer).
fn print_price(taker_price: TakerPrice, cp: &Order, last_print: Option<Price>) -> Option<Price> {
    match (cp.price, taker_price) {
        (Some(cp_price), _) => Some(cp_price),
        (None, TakerPrice::Limit(limit)) => Some(limit),
        (None, TakerPrice::Market) => last_print,
    }
}

/// Every resting, still-unpriced MKT order on `side` adopts the print
/// price.
fn propagate_print(store: &mut BookStore, symbol: &str, side: Side, print: Price) {
    for id in store.scan_resting_market(symbol, side) {
        let _ = store.update(id, |o| {
            if o.price.is_none() {
                o.price = Some(print);
            }
        });
    }
}

/// Every resting STOPLOSS order on both sides is re-evaluated against the
/// print. A BUY stop with trigger T promotes iff `print >= T`; a SELL stop
/// promotes iff `print <= T`. This only records the ids that should
/// promote — the caller applies the `kind` flip after the fill loop exits,
/// so promotion never feeds back into the same submission's counterparty
/// search.
fn collect_triggered_stops(store: &BookStore, symbol: &str, print: Price, out: &mut Vec<u64>) {
    for id in store.scan_stops(symbol, Side::Buy) {
        if let Some(order) = store.get(id) {
            let trigger = order.price.expect("stoploss orders are always priced");
            if print >= trigger && !out.contains(&id) {
                out.push(id);
            }
        }
    }
    for id in store.scan_stops(symbol, Side::Sell) {
        if let Some(order) = store.get(id) {
            let trigger = order.price.expect("stoploss orders are always priced");
            if print <= trigger && !out.contains(&id) {
                out.push(id);
            }
        }
    }
}
