//! Validation layer: command tokens → a typed [`Request`] or a list of
//! [`ParamError`]s. Checks (non-empty symbol, positive price/amount) and
//! sigil stripping (`$` for limit prices, `@` for stop triggers) are done
//! once here rather than per order kind.

use crate::errors::ParamError;
use crate::orders::{Price, Side};

/// A fully-validated, typed command — everything the dispatcher needs to
/// call into the engine or quote service.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Place {
        symbol: String,
        side: Side,
        kind: PlaceKind,
        amount: u64,
    },
    View,
    Quote {
        symbol: String,
    },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceKind {
    Market,
    Limit(Price),
    StopLoss(Price),
}

type ValidationResult = Result<Request, Vec<ParamError>>;

/// Parses one whitespace-tokenized command line.
pub fn parse(line: &str) -> ValidationResult {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(vec![ParamError::new("command", "empty command")]);
    }

    match tokens[0] {
        "BUY" => parse_place(&tokens, Side::Buy),
        "SELL" => parse_place(&tokens, Side::Sell),
        "VIEW" => parse_view(&tokens),
        "QUOTE" => parse_quote(&tokens),
        "QUIT" => {
            if tokens.len() == 1 {
                Ok(Request::Quit)
            } else {
                Err(vec![ParamError::new("command", "QUIT takes no arguments")])
            }
        }
        other => Err(vec![ParamError::new(
            "command",
            format!("unknown command literal `{other}`"),
        )]),
    }
}

fn parse_place(tokens: &[&str], side: Side) -> ValidationResult {
    let Some(&symbol) = tokens.get(1) else {
        return Err(vec![ParamError::new("stock_name", "missing stock_name")]);
    };
    if symbol.is_empty() {
        return Err(vec![ParamError::new("stock_name", "stock_name is empty")]);
    }

    match tokens.get(2).copied() {
        Some("MKT") => {
            let mut errors = Vec::new();
            let amount = match tokens.get(3) {
                Some(a) => parse_amount(a, &mut errors),
                None => {
                    errors.push(ParamError::new("amount", "missing amount"));
                    None
                }
            };
            finish(errors, || Request::Place {
                symbol: symbol.to_string(),
                side,
                kind: PlaceKind::Market,
                amount: amount.unwrap_or(0),
            })
        }
        Some("LMT") => {
            let mut errors = Vec::new();
            let price = match tokens.get(3) {
                Some(p) => parse_price(strip_sigil(p, '$'), &mut errors),
                None => {
                    errors.push(ParamError::new("price", "missing price"));
                    None
                }
            };
            let amount = match tokens.get(4) {
                Some(a) => parse_amount(a, &mut errors),
                None => {
                    errors.push(ParamError::new("amount", "missing amount"));
                    None
                }
            };
            finish(errors, || Request::Place {
                symbol: symbol.to_string(),
                side,
                kind: PlaceKind::Limit(price.unwrap_or(Price::ZERO)),
                amount: amount.unwrap_or(0),
            })
        }
        Some("STOPLOSS") => {
            let mut errors = Vec::new();
            let trigger = match tokens.get(3) {
                Some(p) => parse_price(strip_sigil(p, '@'), &mut errors),
                None => {
                    errors.push(ParamError::new("price", "missing trigger price"));
                    None
                }
            };
            let amount = match tokens.get(4) {
                Some(a) => parse_amount(a, &mut errors),
                None => {
                    errors.push(ParamError::new("amount", "missing amount"));
                    None
                }
            };
            finish(errors, || Request::Place {
                symbol: symbol.to_string(),
                side,
                kind: PlaceKind::StopLoss(trigger.unwrap_or(Price::ZERO)),
                amount: amount.unwrap_or(0),
            })
        }
        Some(other) => Err(vec![ParamError::new(
            "command",
            format!("unknown order kind `{other}`"),
        )]),
        None => Err(vec![ParamError::new("command", "missing order kind")]),
    }
}

fn finish(errors: Vec<ParamError>, build: impl FnOnce() -> Request) -> ValidationResult {
    if errors.is_empty() {
        Ok(build())
    } else {
        Err(errors)
    }
}

/// Strips a single leading sigil (`$` for limit prices, `@` for stop
/// triggers).
fn strip_sigil(token: &str, sigil: char) -> &str {
    token.strip_prefix(sigil).unwrap_or(token)
}

fn parse_amount(token: &str, errors: &mut Vec<ParamError>) -> Option<u64> {
    match token.parse::<i64>() {
        Ok(n) if n > 0 => Some(n as u64),
        Ok(_) => {
            errors.push(ParamError::new("amount", "amount must be positive"));
            None
        }
        Err(_) => {
            errors.push(ParamError::new(
                "amount",
                format!("`{token}` is not a valid amount"),
            ));
            None
        }
    }
}

fn parse_price(token: &str, errors: &mut Vec<ParamError>) -> Option<Price> {
    match token.parse::<Price>() {
        Ok(p) if p.is_positive() => Some(p),
        Ok(_) => {
            errors.push(ParamError::new("price", "price must be positive"));
            None
        }
        Err(e) => {
            errors.push(ParamError::new("price", e));
            None
        }
    }
}

fn parse_view(tokens: &[&str]) -> ValidationResult {
    if tokens.len() == 2 && tokens[0] == "VIEW" && tokens[1] == "ORDERS" {
        Ok(Request::View)
    } else {
        Err(vec![ParamError::new("command", "must be VIEW ORDERS")])
    }
}

fn parse_quote(tokens: &[&str]) -> ValidationResult {
    match tokens.get(1) {
        Some(&symbol) if !symbol.is_empty() => Ok(Request::Quote {
            symbol: symbol.to_string(),
        }),
        _ => Err(vec![ParamError::new("stock_name", "stock_name not defined")]),
    }
}
