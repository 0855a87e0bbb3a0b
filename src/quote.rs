//! Quote & view service: derives bid/ask/last and renders the resting book.
//! Read-only — never mutates the [`BookStore`].
//!
//! [`quote`] uses [`BookStore::best`], which picks the correct side of the
//! `BTreeMap` per side (see `store.rs`) — the highest resting BUY and the
//! lowest resting SELL.

use crate::orders::{Order, OrderKind, OrderStatus, Price, Side};
use crate::store::BookStore;
use serde::{Deserialize, Serialize};

/// `(bid, ask, last)`. `0` stands in for "none" in the rendered response
/// (e.g. `LAST: 0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Price,
    pub ask: Price,
    pub last: Price,
}

pub fn quote(store: &BookStore, symbol: &str) -> Quote {
    Quote {
        bid: store.best(symbol, Side::Buy).unwrap_or(Price::ZERO),
        ask: store.best(symbol, Side::Sell).unwrap_or(Price::ZERO),
        last: store.last_print(symbol).unwrap_or(Price::ZERO),
    }
}

/// One row of the VIEW ORDERS rendering — a typed, serializable view
/// distinct from the internal resting-order representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub position: usize,
    pub symbol: String,
    pub kind: OrderKind,
    pub side: Side,
    pub price: Option<Price>,
    pub filled_amount: u64,
    pub total_amount: u64,
    pub status: OrderStatus,
}

impl OrderView {
    fn from_order(position: usize, order: &Order) -> Self {
        OrderView {
            position,
            symbol: order.symbol.clone(),
            kind: order.kind,
            side: order.side,
            price: order.price,
            filled_amount: order.filled_amount,
            total_amount: order.total_amount,
            status: order.status,
        }
    }
}

/// Every order ever inserted this session, in insertion order.
pub fn view(store: &BookStore) -> Vec<OrderView> {
    store
        .iter_all()
        .enumerate()
        .map(|(i, order)| OrderView::from_order(i + 1, order))
        .collect()
}

/// Renders one VIEW ORDERS line:
/// `"{n}. {symbol} {kind} {side} {price} {filled}/{total} {status}"`.
pub fn render_view_line(row: &OrderView) -> String {
    let price = row
        .price
        .map(|p| p.to_string())
        .unwrap_or_else(|| "UNPRICED".to_string());
    format!(
        "{}. {} {} {} {} {}/{} {}",
        row.position, row.symbol, row.kind, row.side, price, row.filled_amount, row.total_amount, row.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrderKind;

    #[test]
    fn quote_reports_zero_for_empty_symbol() {
        let store = BookStore::new();
        assert_eq!(
            quote(&store, "FB"),
            Quote {
                bid: Price::ZERO,
                ask: Price::ZERO,
                last: Price::ZERO,
            }
        );
    }

    #[test]
    fn quote_picks_highest_bid_and_lowest_ask() {
        let mut store = BookStore::new();
        store.insert(
            "FB",
            Side::Buy,
            OrderKind::Limit,
            Some("10".parse().unwrap()),
            5,
        );
        store.insert(
            "FB",
            Side::Buy,
            OrderKind::Limit,
            Some("14".parse().unwrap()),
            5,
        );
        store.insert(
            "FB",
            Side::Sell,
            OrderKind::Limit,
            Some("20".parse().unwrap()),
            5,
        );
        store.insert(
            "FB",
            Side::Sell,
            OrderKind::Limit,
            Some("25".parse().unwrap()),
            5,
        );

        let q = quote(&store, "FB");
        assert_eq!(q.bid, "14".parse().unwrap());
        assert_eq!(q.ask, "20".parse().unwrap());
    }

    #[test]
    fn view_numbers_rows_from_one_in_insertion_order() {
        let mut store = BookStore::new();
        store.insert(
            "FB",
            Side::Buy,
            OrderKind::Limit,
            Some("10".parse().unwrap()),
            5,
        );
        store.insert(
            "AAPL",
            Side::Sell,
            OrderKind::Limit,
            Some("11".parse().unwrap()),
            5,
        );
        let rows = view(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].symbol, "AAPL");
    }

    #[test]
    fn render_view_line_shows_unpriced_for_resting_market_orders() {
        let mut store = BookStore::new();
        store.insert("FB", Side::Buy, OrderKind::Market, None, 5);
        let rows = view(&store);
        assert_eq!(
            render_view_line(&rows[0]),
            "1. FB MKT BUY UNPRICED 0/5 PENDING"
        );
    }
}
