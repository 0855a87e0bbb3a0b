//! Command dispatcher: maps a validated [`Request`] to an engine/quote
//! operation and renders the response templates, wrapping failures in the
//! three-way error taxonomy.

use crate::engine;
use crate::errors::DispatchError;
use crate::orders::OrderKind;
use crate::persistence::Ledger;
use crate::quote::{self, render_view_line};
use crate::store::BookStore;
use crate::validation::{self, PlaceKind, Request};
use tracing::warn;

/// What the REPL should do after a command completes.
pub enum Outcome {
    /// Print this and keep reading commands.
    Response(String),
    /// `QUIT`: the session is over.
    Quit,
}

/// Owns the book store and the (optional) persistence ledger, and is the
/// single entry point the CLI calls per line.
pub struct Dispatcher {
    store: BookStore,
    ledger: Option<Ledger>,
}

impl Dispatcher {
    pub fn new(ledger: Option<Ledger>) -> Self {
        Dispatcher {
            store: BookStore::new(),
            ledger,
        }
    }

    /// Validates and executes one command line, returning the formatted
    /// response or an error envelope. Validation failures and system
    /// faults are both caught here so the REPL keeps running.
    pub fn dispatch(&mut self, line: &str) -> Result<Outcome, DispatchError> {
        let request = validation::parse(line).map_err(DispatchError::Parameter)?;
        match request {
            Request::Place {
                symbol,
                side,
                kind,
                amount,
            } => {
                let response = self.place(&symbol, side, kind, amount)?;
                Ok(Outcome::Response(response))
            }
            Request::View => Ok(Outcome::Response(self.view())),
            Request::Quote { symbol } => Ok(Outcome::Response(self.quote(&symbol))),
            Request::Quit => {
                if let Some(ledger) = self.ledger.as_mut() {
                    ledger.clear()?;
                }
                Ok(Outcome::Quit)
            }
        }
    }

    fn place(
        &mut self,
        symbol: &str,
        side: crate::orders::Side,
        kind: PlaceKind,
        amount: u64,
    ) -> Result<String, DispatchError> {
        let (order_kind, price) = match kind {
            PlaceKind::Market => (OrderKind::Market, None),
            PlaceKind::Limit(p) => (OrderKind::Limit, Some(p)),
            PlaceKind::StopLoss(p) => (OrderKind::StopLoss, Some(p)),
        };

        let (order_id, trades) =
            engine::submit(&mut self.store, symbol, side, order_kind, price, amount)?;

        if let Some(ledger) = self.ledger.as_mut() {
            if let Some(order) = self.store.get(order_id) {
                if let Err(e) = ledger.put_order(order) {
                    warn!(error = %e, "failed to persist order");
                    return Err(DispatchError::from(e));
                }
            }
            for trade in &trades {
                if let Err(e) = ledger.put_trade(trade) {
                    warn!(error = %e, "failed to persist trade");
                    return Err(DispatchError::from(e));
                }
            }
            // Every counterparty mutated during the fill loop is re-persisted
            // too, so the on-disk order collection never lags the book.
            for trade in &trades {
                if let Some(maker) = self.store.get(trade.maker_id) {
                    if let Err(e) = ledger.put_order(maker) {
                        warn!(error = %e, "failed to persist counterparty order");
                        return Err(DispatchError::from(e));
                    }
                }
            }
        }

        Ok(match kind {
            PlaceKind::Market => format!(
                "You have placed a MKT {side} order for {amount} {symbol} shares"
            ),
            PlaceKind::Limit(price) => format!(
                "You have placed a LMT {side} order for {amount} {symbol} shares at {price} each"
            ),
            PlaceKind::StopLoss(trigger) => format!(
                "You have placed a STOPLOSS {side} order for {amount} {symbol} shares at {trigger} each"
            ),
        })
    }

    fn view(&self) -> String {
        quote::view(&self.store)
            .iter()
            .map(|row| render_view_line(row) + "\n")
            .collect::<Vec<_>>()
            .join("")
    }

    fn quote(&self, symbol: &str) -> String {
        let q = quote::quote(&self.store, symbol);
        format!("{symbol} BID: {} ASK: {} LAST: {}", q.bid, q.ask, q.last)
    }
}
