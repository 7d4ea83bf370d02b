//! Full simulations driven by the classifier policy.

use std::cell::Cell;

use chrono::{Duration, NaiveDate};
use signalbt_core::analyzers::{
    AnnualReturn, Calmar, DrawDown, Returns, SharpeRatio, Sqn, TradeAnalyzer,
};
use signalbt_core::classifier::{Classifier, ClassifierError, Prediction};
use signalbt_core::domain::{Bar, OrderIntent};
use signalbt_core::engine::{Analyses, BarContext, Simulation, Strategy};
use signalbt_core::policy::{ClassifierPolicy, OrderMode, PolicyConfig};

// ─── Helpers ─────────────────────────────────────────────────────────

struct Scripted {
    script: Vec<[f64; 3]>,
    cursor: Cell<usize>,
}

impl Scripted {
    fn new(script: Vec<[f64; 3]>) -> Self {
        Self {
            script,
            cursor: Cell::new(0),
        }
    }
}

impl Classifier for Scripted {
    fn model_name(&self) -> &str {
        "scripted"
    }

    fn classify(&self, _text: &str) -> Result<Prediction, ClassifierError> {
        let i = self.cursor.get();
        self.cursor.set(i + 1);
        Prediction::from_probabilities(self.script[i.min(self.script.len() - 1)])
    }
}

struct Offline;

impl Classifier for Offline {
    fn model_name(&self) -> &str {
        "offline"
    }

    fn classify(&self, _text: &str) -> Result<Prediction, ClassifierError> {
        Err(ClassifierError::Response("connection refused".into()))
    }
}

const UP: [f64; 3] = [0.05, 0.05, 0.9];
const DOWN: [f64; 3] = [0.9, 0.05, 0.05];
const FLAT: [f64; 3] = [0.1, 0.8, 0.1];

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + Duration::days(i as i64)
}

/// Bars from (open, close) pairs.
fn bars(symbol: &str, oc: &[(f64, f64)]) -> Vec<Bar> {
    oc.iter()
        .enumerate()
        .map(|(i, &(open, close))| Bar {
            symbol: symbol.into(),
            date: day(i),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            adj_close: close,
            volume: 1_000.0,
        })
        .collect()
}

fn register_all(sim: &mut Simulation) {
    sim.add_analyzer("sharpe", Box::new(SharpeRatio::new(0.01))).unwrap();
    sim.add_analyzer("drawdown", Box::new(DrawDown::new())).unwrap();
    sim.add_analyzer("trades", Box::new(TradeAnalyzer::new())).unwrap();
    sim.add_analyzer("returns", Box::new(Returns::new())).unwrap();
    sim.add_analyzer("calmar", Box::new(Calmar::new())).unwrap();
    sim.add_analyzer("sqn", Box::new(Sqn::new())).unwrap();
    sim.add_analyzer("annualreturn", Box::new(AnnualReturn::new())).unwrap();
}

fn config(seq_length: usize, order_mode: OrderMode) -> PolicyConfig {
    PolicyConfig {
        seq_length,
        order_mode,
        ..Default::default()
    }
}

/// Wraps a strategy and keeps every intent it queues, tagged with its bar.
struct Recording<S> {
    inner: S,
    intents: Vec<(usize, OrderIntent)>,
}

impl<S: Strategy> Strategy for Recording<S> {
    type Error = S::Error;

    fn start(&mut self, symbols: &[String]) -> Result<(), Self::Error> {
        self.inner.start(symbols)
    }

    fn next(&mut self, ctx: &mut BarContext<'_>) -> Result<(), Self::Error> {
        self.inner.next(ctx)?;
        let t = ctx.bar_index();
        self.intents.extend(
            ctx.pending()
                .iter()
                .filter(|o| o.created_bar == t)
                .map(|o| (t, o.intent.clone())),
        );
        Ok(())
    }
}

fn run_round_trip(order_mode: OrderMode) -> (Simulation, Analyses) {
    let (sim, analyses, _) = run_round_trip_recorded(order_mode);
    (sim, analyses)
}

fn run_round_trip_recorded(
    order_mode: OrderMode,
) -> (Simulation, Analyses, Vec<(usize, OrderIntent)>) {
    let classifier = Scripted::new(vec![UP, FLAT, DOWN, FLAT, FLAT]);
    let policy = ClassifierPolicy::new(config(1, order_mode), classifier).unwrap();
    let mut policy = Recording {
        inner: policy,
        intents: Vec::new(),
    };
    let mut sim = Simulation::new(10_000.0);
    sim.add_feed(
        "SPY",
        bars(
            "SPY",
            &[(100.0, 100.0), (100.0, 110.0), (110.0, 120.0), (120.0, 120.0), (120.0, 121.0)],
        ),
    );
    register_all(&mut sim);
    let analyses = sim.run(&mut policy).unwrap();
    (sim, analyses, policy.intents)
}

// ─── Scenarios ───────────────────────────────────────────────────────

#[test]
fn two_flat_symbols_with_neutral_classifier_make_no_trades() {
    let classifier = Scripted::new(vec![FLAT]);
    let mut policy = ClassifierPolicy::new(config(10, OrderMode::Literal), &classifier).unwrap();
    let mut sim = Simulation::new(10_000.0);
    sim.add_feed("AAA", bars("AAA", &[(50.0, 50.0); 5]));
    sim.add_feed("BBB", bars("BBB", &[(80.0, 80.0); 5]));
    register_all(&mut sim);

    let analyses = sim.run(&mut policy).unwrap();
    assert_eq!(sim.value(), 10_000.0);
    // fewer bars than seq_length: never classified
    assert_eq!(classifier.cursor.get(), 0);
    assert_eq!(analyses.get("trades").unwrap()["total"]["total"], 0);
    assert_eq!(analyses.get("drawdown").unwrap()["max"]["drawdown"], 0.0);
    assert!(analyses.get("sharpe").unwrap()["sharperatio"].is_null());
    assert!(analyses.get("calmar").unwrap()["calmar"].is_null());
}

#[test]
fn intended_round_trip_realizes_pnl() {
    let (sim, analyses) = run_round_trip(OrderMode::Intended);

    // buy 15 @ 100 (bar 1 open), close @ 120 (bar 3 open)
    assert!((sim.value() - 10_300.0).abs() < 1e-9);
    let trades = analyses.get("trades").unwrap();
    assert_eq!(trades["total"]["closed"], 1);
    assert_eq!(trades["won"]["total"], 1);
    assert_eq!(trades["pnl"]["net"]["total"], 300.0);
    assert_eq!(trades["len"]["average"], 2.0);
    assert_eq!(analyses.get("sqn").unwrap()["trades"], 1);

    let dd = analyses.get("drawdown").unwrap();
    assert_eq!(dd["max"]["drawdown"], 0.0);

    let annual = analyses.get("annualreturn").unwrap();
    assert!((annual["2024"].as_f64().unwrap() - 0.03).abs() < 1e-9);
}

#[test]
fn literal_mode_never_opens_from_flat() {
    let (sim, analyses) = run_round_trip(OrderMode::Literal);
    assert_eq!(sim.value(), 10_000.0);
    assert_eq!(analyses.get("trades").unwrap()["total"]["total"], 0);
    assert!(sim.broker().closed_trades().is_empty());
}

#[test]
fn identical_inputs_give_identical_results() {
    let (sim_a, a, intents_a) = run_round_trip_recorded(OrderMode::Intended);
    let (sim_b, b, intents_b) = run_round_trip_recorded(OrderMode::Intended);
    assert_eq!(a, b);
    assert_eq!(sim_a.value(), sim_b.value());
    assert_eq!(intents_a, intents_b);
    assert_eq!(
        intents_a,
        vec![
            (0, OrderIntent::Buy { symbol: "SPY".into(), size: 15 }),
            (2, OrderIntent::Close { symbol: "SPY".into() }),
        ]
    );
}

#[test]
fn classifier_failure_aborts_run() {
    let mut policy = ClassifierPolicy::new(config(2, OrderMode::Literal), Offline).unwrap();
    let mut sim = Simulation::new(10_000.0);
    sim.add_feed("SPY", bars("SPY", &[(100.0, 100.0); 4]));
    register_all(&mut sim);

    let err = sim.run(&mut policy).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("2024-01-03"), "{msg}");
    assert!(msg.contains("connection refused"), "{msg}");
}

#[test]
fn open_position_is_valued_at_last_valid_close() {
    let classifier = Scripted::new(vec![UP, FLAT]);
    let mut policy = ClassifierPolicy::new(config(1, OrderMode::Intended), classifier).unwrap();
    let mut sim = Simulation::new(10_000.0);
    sim.add_feed("SPY", bars("SPY", &[(100.0, 100.0), (100.0, 104.0), (104.0, 106.0)]));
    // QQQ trades on one more day than SPY; SPY gets a void bar there
    sim.add_feed(
        "QQQ",
        bars("QQQ", &[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0), (10.0, 10.0)]),
    );
    register_all(&mut sim);

    let analyses = sim.run(&mut policy).unwrap();
    // only SPY's first call is "up": 15 shares @ 100, last valid close 106
    let trades = analyses.get("trades").unwrap();
    assert_eq!(trades["total"]["open"], 1);
    assert_eq!(sim.broker().position_size("QQQ"), 0);
    assert!((sim.value() - (10_000.0 + 15.0 * 6.0)).abs() < 1e-9);
}
