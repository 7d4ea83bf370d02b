//! Run orchestrator: config in, report out.

use signalbt_core::analyzers::{
    AnnualReturn, Calmar, DrawDown, Returns, SharpeRatio, Sqn, TradeAnalyzer,
};
use signalbt_core::classifier::Classifier;
use signalbt_core::data::{dataset_hash, load_symbol_feed, DataError, DateRange};
use signalbt_core::engine::{EngineError, Simulation};
use signalbt_core::policy::{ClassifierPolicy, PolicyError};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{ConfigError, RunConfig};
use crate::report::{reduce, RunParameters, RunReport};

/// Registration names of the analyzers every run carries.
pub const ANALYZER_NAMES: [&str; 7] = [
    "sharpe",
    "drawdown",
    "trades",
    "returns",
    "calmar",
    "sqn",
    "annualreturn",
];

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("simulation error: {0}")]
    Engine(#[from] EngineError),
}

/// A failed run: the report carries the parameters and the error string.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct RunFailure {
    pub report: RunReport,
    #[source]
    pub source: RunError,
}

/// Run one backtest with `classifier` behind the signal policy.
///
/// On failure the returned [`RunFailure`] still holds a report whose
/// `error` field is set; no numeric results are kept.
pub fn run_backtest<C: Classifier>(config: &RunConfig, classifier: C) -> Result<RunReport, RunFailure> {
    let mut report = RunReport::pending(RunParameters::from_config(config));
    match execute(config, classifier, &mut report) {
        Ok(()) => Ok(report),
        Err(source) => {
            error!(error = %source, "backtest failed");
            report.results = None;
            report.error = Some(source.to_string());
            Err(RunFailure { report, source })
        }
    }
}

fn execute<C: Classifier>(config: &RunConfig, classifier: C, report: &mut RunReport) -> Result<(), RunError> {
    config.validate()?;

    let mut policy = ClassifierPolicy::new(config.policy.clone(), classifier)?;
    let mut sim = Simulation::new(config.starting_cash);
    register_analyzers(&mut sim, config.risk_free_rate)?;

    let range = DateRange::new(config.start_date, config.end_date);
    for symbol in &config.symbols {
        let bars = load_symbol_feed(&config.data_dir, symbol, range)?;
        if bars.is_empty() {
            warn!(symbol = %symbol, "no bars in date range");
        }
        sim.add_feed(symbol.clone(), bars);
    }
    info!(
        symbols = config.symbols.len(),
        start = %config.start_date,
        end = %config.end_date,
        dataset = %dataset_hash(sim.feeds()),
        "feeds loaded"
    );

    let initial_value = sim.value();
    let analyses = sim.run(&mut policy)?;
    let final_value = sim.value();

    let results = reduce(initial_value, final_value, &analyses);
    info!(
        initial_value,
        final_value,
        return_pct = results.portfolio_return_pct,
        trades = results.total_trades,
        "backtest finished"
    );
    report.results = Some(results);
    Ok(())
}

fn register_analyzers(sim: &mut Simulation, risk_free_rate: f64) -> Result<(), EngineError> {
    sim.add_analyzer("sharpe", Box::new(SharpeRatio::new(risk_free_rate)))?;
    sim.add_analyzer("drawdown", Box::new(DrawDown::new()))?;
    sim.add_analyzer("trades", Box::new(TradeAnalyzer::new()))?;
    sim.add_analyzer("returns", Box::new(Returns::new()))?;
    sim.add_analyzer("calmar", Box::new(Calmar::new()))?;
    sim.add_analyzer("sqn", Box::new(Sqn::new()))?;
    sim.add_analyzer("annualreturn", Box::new(AnnualReturn::new()))?;
    Ok(())
}
