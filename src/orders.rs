//! Order record: the typed representation every other layer operates on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point price, 4 implied decimal digits (e.g. `125000` means `12.5000`).
///
/// A bare `f64` can't be used as a `BTreeMap` key (no total order, equality
/// hazards), so this newtype scales decimals into an `i64` instead.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub struct Price(i64);

const SCALE: i64 = 10_000;

impl Price {
    pub const ZERO: Price = Price(0);

    /// Builds a `Price` from a pre-scaled integer (units * 10_000).
    pub fn from_scaled(scaled: i64) -> Self {
        Price(scaled)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn scaled(&self) -> i64 {
        self.0
    }
}

/// Parses a plain decimal string (no sigil) into a [`Price`].
impl std::str::FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty price".to_string());
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if frac_part.len() > 4 {
            return Err(format!("too many decimal places in `{s}`"));
        }
        let int_val: i64 = int_part
            .parse()
            .map_err(|_| format!("`{s}` is not a valid number"))?;
        let mut frac_digits = frac_part.to_string();
        while frac_digits.len() < 4 {
            frac_digits.push('0');
        }
        let frac_val: i64 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits
                .parse()
                .map_err(|_| format!("`{s}` is not a valid number"))?
        };
        let sign = if int_val < 0 || s.starts_with('-') { -1 } else { 1 };
        Ok(Price(int_val * SCALE + sign * frac_val))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = (self.0 % SCALE).abs();
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let mut frac_str = format!("{frac:04}");
            while frac_str.ends_with('0') {
                frac_str.pop();
            }
            write!(f, "{whole}.{frac_str}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum OrderKind {
    Market,
    Limit,
    StopLoss,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderKind::Market => "MKT",
            OrderKind::Limit => "LMT",
            OrderKind::StopLoss => "STOPLOSS",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum OrderStatus {
    Pending,
    Partial,
    Filled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Partial => "PARTIAL",
            OrderStatus::Filled => "FILLED",
        })
    }
}

/// Derives the status implied by a filled/total pair.
pub fn status_for(filled: u64, total: u64) -> OrderStatus {
    if filled == 0 {
        OrderStatus::Pending
    } else if filled < total {
        OrderStatus::Partial
    } else {
        OrderStatus::Filled
    }
}

/// A resting or filled order.
///
/// `price` is `None` only while `kind == Market` and the order hasn't yet
/// traded or been repriced by a print — the "unpriced" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Order {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub price: Option<Price>,
    pub total_amount: u64,
    pub filled_amount: u64,
    pub status: OrderStatus,
}

impl Order {
    pub fn residual(&self) -> u64 {
        self.total_amount - self.filled_amount
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Partial)
    }
}
