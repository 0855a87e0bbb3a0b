//! A completed fill, a.k.a. a history entry.
//!
//! The price comes from the maker's (resting) order per price-time
//! priority; quantity is the amount filled at this step of the fill loop;
//! `id` is the trade's own monotonic sequence number — the newest trade per
//! symbol is that symbol's last print.

use crate::orders::Price;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Trade {
    pub id: u64,
    pub symbol: String,
    pub price: Price,
    pub quantity: u64,
    pub maker_id: u64,
    pub taker_id: u64,
}
