//! Order record & book store: a per-symbol indexed container.
//!
//! A multi-symbol `HashMap<Symbol, SymbolBook>`, each book splitting
//! resting orders into three buckets per side:
//! - a price-indexed `BTreeMap` for anything with a real price (LMT orders,
//!   and MKT orders that have since acquired one),
//! - a FIFO queue for MKT orders still awaiting their first price,
//! - a flat list for STOPLOSS orders awaiting promotion.
//!
//! `update()` re-derives which bucket an order belongs in after every
//! mutation — pruning an emptied price level, or moving an order between
//! buckets on STOPLOSS→LMT promotion or an MKT order acquiring a price.

use crate::errors::EngineError;
use crate::orders::{Order, OrderKind, OrderStatus, Price, Side};
use crate::trade::Trade;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// How a taker's price restricts which counterparties are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    /// A market taker: any real price is eligible.
    Unbounded,
    /// A BUY LMT taker at limit `L`: resting SELLs with `price <= L`.
    Le(Price),
    /// A SELL LMT taker at limit `L`: resting BUYs with `price >= L`.
    Ge(Price),
}

#[derive(Default)]
struct SymbolBook {
    bids: BTreeMap<Price, VecDeque<u64>>,
    asks: BTreeMap<Price, VecDeque<u64>>,
    resting_buy_market: VecDeque<u64>,
    resting_sell_market: VecDeque<u64>,
    stops_buy: Vec<u64>,
    stops_sell: Vec<u64>,
    last_print: Option<Price>,
}

impl SymbolBook {
    fn remove_everywhere(&mut self, id: u64) {
        remove_from_levels(&mut self.bids, id);
        remove_from_levels(&mut self.asks, id);
        self.resting_buy_market.retain(|&x| x != id);
        self.resting_sell_market.retain(|&x| x != id);
        self.stops_buy.retain(|&x| x != id);
        self.stops_sell.retain(|&x| x != id);
    }
}

fn remove_from_levels(levels: &mut BTreeMap<Price, VecDeque<u64>>, id: u64) {
    let mut emptied = None;
    for (price, queue) in levels.iter_mut() {
        if let Some(pos) = queue.iter().position(|&x| x == id) {
            queue.remove(pos);
            if queue.is_empty() {
                emptied = Some(*price);
            }
            break;
        }
    }
    if let Some(price) = emptied {
        levels.remove(&price);
    }
}

/// The book store: every order ever submitted, indexed per symbol for
/// matching, plus the trade/history log.
pub struct BookStore {
    symbols: HashMap<String, SymbolBook>,
    orders: HashMap<u64, Order>,
    insertion_order: Vec<u64>,
    next_order_id: u64,
    next_trade_id: u64,
    trades: Vec<Trade>,
}

impl BookStore {
    pub fn new() -> Self {
        BookStore {
            symbols: HashMap::new(),
            orders: HashMap::new(),
            insertion_order: Vec::new(),
            next_order_id: 1,
            next_trade_id: 1,
            trades: Vec::new(),
        }
    }

    /// Admits a new order as PENDING with zero fill.
    pub fn insert(
        &mut self,
        symbol: &str,
        side: Side,
        kind: OrderKind,
        price: Option<Price>,
        total_amount: u64,
    ) -> u64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        let order = Order {
            id,
            symbol: symbol.to_string(),
            side,
            kind,
            price,
            total_amount,
            filled_amount: 0,
            status: OrderStatus::Pending,
        };
        self.orders.insert(id, order);
        self.insertion_order.push(id);
        self.reindex(symbol, id);
        id
    }

    pub fn get(&self, id: u64) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Applies `patch` to the order, then re-derives which resting bucket
    /// (if any) it belongs in. A FILLED order is never patched again by a
    /// correct caller, but nothing here depends on that — `reindex` is
    /// idempotent either way.
    pub fn update(
        &mut self,
        id: u64,
        patch: impl FnOnce(&mut Order),
    ) -> Result<(), EngineError> {
        let symbol = {
            let order = self
                .orders
                .get_mut(&id)
                .ok_or(EngineError::OrderNotFound(id))?;
            patch(order);
            order.symbol.clone()
        };
        self.reindex(&symbol, id);
        Ok(())
    }

    fn reindex(&mut self, symbol: &str, id: u64) {
        let order = self.orders.get(&id).expect("order just inserted/updated");
        let book = self.symbols.entry(symbol.to_string()).or_default();
        book.remove_everywhere(id);
        if !order.is_resting() {
            return;
        }
        match order.kind {
            OrderKind::StopLoss => match order.side {
                Side::Buy => book.stops_buy.push(id),
                Side::Sell => book.stops_sell.push(id),
            },
            OrderKind::Market | OrderKind::Limit => match order.price {
                Some(price) => {
                    let levels = match order.side {
                        Side::Buy => &mut book.bids,
                        Side::Sell => &mut book.asks,
                    };
                    levels.entry(price).or_default().push_back(id);
                }
                None => match order.side {
                    Side::Buy => book.resting_buy_market.push_back(id),
                    Side::Sell => book.resting_sell_market.push_back(id),
                },
            },
        }
    }

    /// Best eligible counterparty on `side`: priced orders rank by price
    /// (best-for-taker first), unpriced resting MKT orders rank last, ties
    /// broken by lowest id (FIFO queues already preserve arrival order).
    pub fn find_best_counterparty(
        &self,
        symbol: &str,
        side: Side,
        bound: PriceBound,
    ) -> Option<u64> {
        let book = self.symbols.get(symbol)?;
        let priced = match side {
            Side::Sell => book.asks.iter().next().and_then(|(&price, queue)| {
                let eligible = match bound {
                    PriceBound::Unbounded => true,
                    PriceBound::Le(limit) => price <= limit,
                    PriceBound::Ge(_) => true,
                };
                if eligible { queue.front().copied() } else { None }
            }),
            Side::Buy => book.bids.iter().next_back().and_then(|(&price, queue)| {
                let eligible = match bound {
                    PriceBound::Unbounded => true,
                    PriceBound::Ge(limit) => price >= limit,
                    PriceBound::Le(_) => true,
                };
                if eligible { queue.front().copied() } else { None }
            }),
        };
        priced.or_else(|| {
            let market_queue = match side {
                Side::Buy => &book.resting_buy_market,
                Side::Sell => &book.resting_sell_market,
            };
            market_queue.front().copied()
        })
    }

    /// All resting, still-unpriced MKT order ids on `side` — the
    /// print-propagation target when a trade prints.
    pub fn scan_resting_market(&self, symbol: &str, side: Side) -> Vec<u64> {
        let Some(book) = self.symbols.get(symbol) else {
            return Vec::new();
        };
        match side {
            Side::Buy => book.resting_buy_market.iter().copied().collect(),
            Side::Sell => book.resting_sell_market.iter().copied().collect(),
        }
    }

    /// All resting STOPLOSS order ids on `side` (candidates for promotion;
    /// the caller checks each one's trigger against the print price).
    pub fn scan_stops(&self, symbol: &str, side: Side) -> Vec<u64> {
        let Some(book) = self.symbols.get(symbol) else {
            return Vec::new();
        };
        match side {
            Side::Buy => book.stops_buy.clone(),
            Side::Sell => book.stops_sell.clone(),
        }
    }

    /// Best real price resting on `side`: ignores unpriced MKT orders and
    /// STOPLOSS orders entirely.
    pub fn best(&self, symbol: &str, side: Side) -> Option<Price> {
        let book = self.symbols.get(symbol)?;
        match side {
            Side::Buy => book.bids.keys().next_back().copied(),
            Side::Sell => book.asks.keys().next().copied(),
        }
    }

    pub fn last_print(&self, symbol: &str) -> Option<Price> {
        self.symbols.get(symbol).and_then(|b| b.last_print)
    }

    /// Every order ever inserted this session, in insertion order.
    pub fn iter_all(&self) -> impl Iterator<Item = &Order> {
        self.insertion_order
            .iter()
            .filter_map(move |id| self.orders.get(id))
    }

    /// Appends a fill to the symbol's history and updates its last print.
    pub fn record_trade(
        &mut self,
        symbol: &str,
        price: Price,
        quantity: u64,
        maker_id: u64,
        taker_id: u64,
    ) -> Trade {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        let trade = Trade {
            id,
            symbol: symbol.to_string(),
            price,
            quantity,
            maker_id,
            taker_id,
        };
        self.symbols.entry(symbol.to_string()).or_default().last_print = Some(price);
        self.trades.push(trade.clone());
        trade
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}
