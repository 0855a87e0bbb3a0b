//! Persistence collaborator: a `parity-db`-backed append log for orders and
//! trade history, keyed for ordered iteration with one btree-indexed column
//! per collection and big-endian keys.
//!
//! The engine's behavior never depends on this module — the book is kept
//! entirely in memory and this is an append-only record of what the engine
//! already decided, written by the dispatcher after each successful
//! operation. `clear()` empties both collections on session exit.

use crate::errors::PersistError;
use crate::orders::Order;
use crate::trade::Trade;
use bincode::config::standard;
use parity_db::{ColId, Db, Options};
use std::path::Path;

const ORDERS_COL: ColId = 0;
const HISTORY_COL: ColId = 1;

/// Append-only ledger of every order admitted and every trade printed this
/// session.
pub struct Ledger {
    db: Db,
}

impl Ledger {
    /// Opens (or creates) a `parity-db` database at `path` with one
    /// btree-indexed column per collection.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let mut opts = Options::with_columns(path.as_ref(), 2);
        opts.columns[ORDERS_COL as usize].btree_index = true;
        opts.columns[HISTORY_COL as usize].btree_index = true;
        let db = Db::open_or_create(&opts)?;
        Ok(Ledger { db })
    }

    /// Records (or overwrites) an order's current state, keyed by its
    /// monotonic id so iteration order matches insertion order.
    pub fn put_order(&mut self, order: &Order) -> Result<(), PersistError> {
        let key = order.id.to_be_bytes().to_vec();
        let config = standard();
        let value = bincode::encode_to_vec(order, config)?;
        self.db.commit(vec![(ORDERS_COL, key, Some(value))])?;
        Ok(())
    }

    /// Appends a trade to the symbol's history, keyed by `"{symbol}:" +
    /// id(be)` so a prefix scan returns one symbol's prints in order.
    pub fn put_trade(&mut self, trade: &Trade) -> Result<(), PersistError> {
        let key = history_key(&trade.symbol, trade.id);
        let config = standard();
        let value = bincode::encode_to_vec(trade, config)?;
        self.db.commit(vec![(HISTORY_COL, key, Some(value))])?;
        Ok(())
    }

    /// Loads every persisted order, in id (== insertion) order.
    pub fn load_orders(&self) -> Result<Vec<Order>, PersistError> {
        let mut iter = self.db.iter(ORDERS_COL)?;
        iter.seek_to_first()?;
        let mut out = Vec::new();
        while let Some((_key, raw)) = iter.next()? {
            let (order, _): (Order, usize) = bincode::decode_from_slice(&raw, standard())?;
            out.push(order);
        }
        Ok(out)
    }

    /// Loads every persisted trade for `symbol`, oldest first.
    pub fn load_history(&self, symbol: &str) -> Result<Vec<Trade>, PersistError> {
        let prefix = format!("{symbol}:").into_bytes();
        let mut iter = self.db.iter(HISTORY_COL)?;
        iter.seek(&prefix)?;
        let mut out = Vec::new();
        while let Some((key, raw)) = iter.next()? {
            if !key.starts_with(&prefix) {
                break;
            }
            let (trade, _): (Trade, usize) = bincode::decode_from_slice(&raw, standard())?;
            out.push(trade);
        }
        Ok(out)
    }

    /// Empties both collections. Called when the session exits so a fresh
    /// run starts with a clean book.
    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.clear_column(ORDERS_COL)?;
        self.clear_column(HISTORY_COL)?;
        Ok(())
    }

    fn clear_column(&mut self, col: ColId) -> Result<(), PersistError> {
        let mut iter = self.db.iter(col)?;
        iter.seek_to_first()?;
        let mut batch = Vec::new();
        while let Some((key, _)) = iter.next()? {
            batch.push((col, key, None));
        }
        if !batch.is_empty() {
            self.db.commit(batch)?;
        }
        Ok(())
    }
}

fn history_key(symbol: &str, trade_id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(symbol.len() + 1 + 8);
    key.extend_from_slice(symbol.as_bytes());
    key.push(b':');
    key.extend_from_slice(&trade_id.to_be_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{OrderKind, OrderStatus, Price, Side};
    use tempfile::tempdir;

    fn sample_order(id: u64) -> Order {
        Order {
            id,
            symbol: "FB".into(),
            side: Side::Buy,
            kind: OrderKind::Limit,
            price: Some("20".parse::<Price>().unwrap()),
            total_amount: 5,
            filled_amount: 0,
            status: OrderStatus::Pending,
        }
    }

    fn sample_trade(id: u64, symbol: &str) -> Trade {
        Trade {
            id,
            symbol: symbol.into(),
            price: "20".parse().unwrap(),
            quantity: 5,
            maker_id: 1,
            taker_id: 2,
        }
    }

    #[test]
    fn orders_round_trip_in_insertion_order() {
        let dir = tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path()).unwrap();
        ledger.put_order(&sample_order(1)).unwrap();
        ledger.put_order(&sample_order(2)).unwrap();

        let loaded = ledger.load_orders().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 1);
        assert_eq!(loaded[1].id, 2);
    }

    #[test]
    fn history_scoped_by_symbol_prefix() {
        let dir = tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path()).unwrap();
        ledger.put_trade(&sample_trade(1, "FB")).unwrap();
        ledger.put_trade(&sample_trade(2, "AAPL")).unwrap();
        ledger.put_trade(&sample_trade(3, "FB")).unwrap();

        let fb_history = ledger.load_history("FB").unwrap();
        assert_eq!(fb_history.len(), 2);
        assert_eq!(fb_history[0].id, 1);
        assert_eq!(fb_history[1].id, 3);
    }

    #[test]
    fn clear_empties_both_collections() {
        let dir = tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path()).unwrap();
        ledger.put_order(&sample_order(1)).unwrap();
        ledger.put_trade(&sample_trade(1, "FB")).unwrap();

        ledger.clear().unwrap();
        assert!(ledger.load_orders().unwrap().is_empty());
        assert!(ledger.load_history("FB").unwrap().is_empty());
    }
}
