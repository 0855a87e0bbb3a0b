//! Integration suite exercising the dispatcher's formatted responses end to
//! end, driving the public surface through its real entry point rather than
//! internal helpers.

use order_book_engine::dispatcher::{Dispatcher, Outcome};

fn submit(d: &mut Dispatcher, line: &str) -> String {
    match d.dispatch(line) {
        Ok(Outcome::Response(s)) => s,
        Ok(Outcome::Quit) => panic!("unexpected QUIT from `{line}`"),
        Err(e) => panic!("`{line}` rejected: {}", e.render()),
    }
}

#[test]
fn cross_at_resting_price() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "SELL FB LMT $20 10");
    submit(&mut d, "BUY FB LMT $25 10");

    let view = submit(&mut d, "VIEW ORDERS");
    assert!(view.contains("FB LMT SELL 20 10/10 FILLED"));
    assert!(view.contains("FB LMT BUY 25 10/10 FILLED"));

    assert_eq!(submit(&mut d, "QUOTE FB"), "FB BID: 0 ASK: 0 LAST: 20");
}

#[test]
fn partial_fill_of_taker() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "SELL FB LMT $20 5");
    submit(&mut d, "BUY FB LMT $20 10");

    let view = submit(&mut d, "VIEW ORDERS");
    assert!(view.contains("FB LMT SELL 20 5/5 FILLED"));
    assert!(view.contains("FB LMT BUY 20 5/10 PARTIAL"));

    assert_eq!(submit(&mut d, "QUOTE FB"), "FB BID: 20 ASK: 0 LAST: 20");
}

#[test]
fn market_pricing_via_counterparty() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "SELL FB MKT 10");
    submit(&mut d, "BUY FB LMT $15 10");

    let view = submit(&mut d, "VIEW ORDERS");
    assert!(view.contains("FB MKT SELL 15 10/10 FILLED"));
    assert!(view.contains("FB LMT BUY 15 10/10 FILLED"));

    assert_eq!(submit(&mut d, "QUOTE FB"), "FB BID: 0 ASK: 0 LAST: 15");
}

#[test]
fn stop_loss_sell_promotion() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "BUY FB LMT $30 5");
    submit(&mut d, "SELL FB STOPLOSS @20 5");
    submit(&mut d, "BUY FB LMT $18 5");
    submit(&mut d, "SELL FB LMT $18 5");

    // The print promoted the stop: kind flips to LMT, price stays the
    // trigger (20), and it's still unfilled — waiting for a compatible taker.
    let view = submit(&mut d, "VIEW ORDERS");
    assert!(view.contains("2. FB LMT SELL 20 0/5 PENDING"));

    submit(&mut d, "BUY FB LMT $20 5");
    let view = submit(&mut d, "VIEW ORDERS");
    assert!(view.contains("2. FB LMT SELL 20 5/5 FILLED"));
}

#[test]
fn no_match_leaves_both_orders_resting() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "BUY FB LMT $10 5");
    submit(&mut d, "SELL FB LMT $20 5");

    assert_eq!(submit(&mut d, "QUOTE FB"), "FB BID: 10 ASK: 20 LAST: 0");
}

#[test]
fn multi_counterparty_time_priority() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "SELL FB LMT $20 5");
    submit(&mut d, "SELL FB LMT $20 5");
    submit(&mut d, "BUY FB LMT $20 10");

    let view = submit(&mut d, "VIEW ORDERS");
    for line in view.lines() {
        assert!(line.ends_with("FILLED"), "expected every order FILLED: {line}");
    }
}

#[test]
fn invariant_filled_never_exceeds_total_and_status_matches() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "SELL FB LMT $20 7");
    submit(&mut d, "BUY FB LMT $20 3");
    submit(&mut d, "BUY FB LMT $20 10");

    let view = submit(&mut d, "VIEW ORDERS");
    for line in view.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let amounts = parts[5]; // "{filled}/{total}"
        let (filled, total) = amounts.split_once('/').unwrap();
        let filled: u64 = filled.parse().unwrap();
        let total: u64 = total.parse().unwrap();
        assert!(filled <= total);
        let status = parts[6];
        match (filled, total) {
            (0, _) => assert_eq!(status, "PENDING"),
            (f, t) if f == t => assert_eq!(status, "FILLED"),
            _ => assert_eq!(status, "PARTIAL"),
        }
    }
}

#[test]
fn invariant_quote_on_unknown_symbol_is_all_zero() {
    let mut d = Dispatcher::new(None);
    assert_eq!(submit(&mut d, "QUOTE ZZZZ"), "ZZZZ BID: 0 ASK: 0 LAST: 0");
}

#[test]
fn invariant_rejected_commands_do_not_mutate_the_book() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "BUY FB LMT $10 5");
    let before = submit(&mut d, "VIEW ORDERS");

    assert!(d.dispatch("BUY FB LMT $-5 5").is_err());
    assert!(d.dispatch("BUY FB LMT $10 0").is_err());
    assert!(d.dispatch("FROB FB 10").is_err());

    let after = submit(&mut d, "VIEW ORDERS");
    assert_eq!(before, after);
}

#[test]
fn stop_loss_orders_never_fill_before_promotion() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "BUY FB STOPLOSS @20 5");
    submit(&mut d, "SELL FB LMT $15 5");

    let view = submit(&mut d, "VIEW ORDERS");
    assert!(view.contains("FB STOPLOSS BUY 20 0/5 PENDING"));
}

#[test]
fn quit_ends_the_session() {
    let mut d = Dispatcher::new(None);
    submit(&mut d, "BUY FB LMT $10 5");
    assert!(matches!(d.dispatch("QUIT"), Ok(Outcome::Quit)));
}
