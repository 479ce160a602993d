//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::simulator::BarSimulator;
use crate::domain::backtest::{record_intents, BacktestConfig};
use crate::domain::config_validation::{validate_backtest_config, validate_optimizer_config};
use crate::domain::error::TradeSignalError;
use crate::domain::metrics::{max_drawdown, TradeStats};
use crate::domain::ohlcv::BarSeries;
use crate::domain::optimizer::{
    optimize, OptimizationOutcome, OptimizationResult, OptimizerConfig, SearchMethod,
};
use crate::domain::order::OrderIntent;
use crate::domain::parameters::ParameterSet;
use crate::domain::registry::StrategyRegistry;
use crate::domain::report::prepare_report;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "tradesignal",
    about = "Bar-by-bar strategy signals and dual-objective parameter optimization"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search a strategy's parameter grid for the best equity and win rate
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: String,
        /// Bar CSV; overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Report destination; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the intents one parameter set emits over the series
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: String,
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Parameter override, e.g. --set n1=10 (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },
    /// List built-in strategies with their defaults and grid sizes
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let registry = StrategyRegistry::builtin();
    let result = match cli.command {
        Command::Optimize {
            config,
            strategy,
            data,
            output,
        } => run_optimize(&registry, &config, &strategy, data.as_deref(), output.as_deref()),
        Command::Signals {
            config,
            strategy,
            data,
            set,
        } => run_signals(&registry, &config, &strategy, data.as_deref(), &set),
        Command::Strategies => {
            run_strategies(&registry);
            Ok(())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradeSignalError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_backtest_config(&adapter)?;
    validate_optimizer_config(&adapter)?;
    Ok(adapter)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        commission_pct: adapter.get_double("backtest", "commission_pct", defaults.commission_pct),
        slippage_pct: adapter.get_double("backtest", "slippage_pct", defaults.slippage_pct),
        position_size: adapter.get_double("backtest", "position_size", defaults.position_size),
        allow_shorting: adapter.get_bool("backtest", "allow_shorting", defaults.allow_shorting),
    }
}

pub fn build_optimizer_config(adapter: &dyn ConfigPort) -> Result<OptimizerConfig, TradeSignalError> {
    let defaults = OptimizerConfig::default();
    let method = match adapter.get_string("optimizer", "method") {
        Some(s) => s
            .parse::<SearchMethod>()
            .map_err(|reason| TradeSignalError::ConfigInvalid {
                section: "optimizer".into(),
                key: "method".into(),
                reason,
            })?,
        None => defaults.method,
    };

    let max_candidates = adapter.get_int("optimizer", "max_candidates", defaults.max_candidates as i64);
    let seed = adapter.get_int("optimizer", "seed", defaults.seed as i64);

    Ok(OptimizerConfig {
        method,
        max_candidates: usize::try_from(max_candidates).map_err(|_| TradeSignalError::ConfigInvalid {
            section: "optimizer".into(),
            key: "max_candidates".into(),
            reason: "max_candidates must be at least 1".into(),
        })?,
        seed: u64::try_from(seed).map_err(|_| TradeSignalError::ConfigInvalid {
            section: "optimizer".into(),
            key: "seed".into(),
            reason: "seed must be non-negative".into(),
        })?,
        parallel: adapter.get_bool("optimizer", "parallel", defaults.parallel),
        abort_on_error: adapter.get_bool("optimizer", "abort_on_error", defaults.abort_on_error),
    })
}

/// Resolves the bar file and the symbol label: `--data` wins over
/// `[data] path`; the symbol falls back to the file stem.
pub fn resolve_data_source(
    adapter: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<(PathBuf, String), TradeSignalError> {
    let path = match data_override {
        Some(p) => p.to_path_buf(),
        None => adapter
            .get_string("data", "path")
            .map(PathBuf::from)
            .ok_or_else(|| TradeSignalError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?,
    };

    let symbol = adapter
        .get_string("data", "symbol")
        .or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "UNKNOWN".to_string());

    Ok((path, symbol))
}

/// Parameter set for a single run: the strategy defaults overlaid with
/// `NAME=VALUE` assignments.
pub fn parameters_with_overrides(
    defaults: &ParameterSet,
    assignments: &[String],
) -> Result<ParameterSet, TradeSignalError> {
    let mut params = defaults.clone();
    for assignment in assignments {
        let (name, value) = ParameterSet::parse_assignment(assignment)?;
        params.insert(&name, value);
    }
    Ok(params)
}

fn run_optimize(
    registry: &StrategyRegistry,
    config_path: &Path,
    strategy_name: &str,
    data_override: Option<&Path>,
    output_path: Option<&Path>,
) -> Result<(), TradeSignalError> {
    // Stage 1: Load and validate config
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter);
    let opt_config = build_optimizer_config(&adapter)?;

    // Stage 2: Resolve data source
    let (data_path, symbol) = resolve_data_source(&adapter, data_override)?;
    eprintln!("Loading bars for {} from {}", symbol, data_path.display());
    let data_port = CsvAdapter::new(data_path);

    // Stages 3-5: Optimize, summarize, write report
    run_optimize_pipeline(
        &data_port,
        &JsonReportAdapter::new(true),
        registry,
        strategy_name,
        &symbol,
        &bt_config,
        &opt_config,
        output_path,
    )
    .map(|_| ())
}

#[allow(clippy::too_many_arguments)]
pub fn run_optimize_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    registry: &StrategyRegistry,
    strategy_name: &str,
    symbol: &str,
    bt_config: &BacktestConfig,
    opt_config: &OptimizerConfig,
    output_path: Option<&Path>,
) -> Result<OptimizationOutcome, TradeSignalError> {
    let entry = registry.get(strategy_name)?;
    let series = data_port.fetch_bars(symbol)?;

    eprintln!(
        "Optimizing {} on {} bars ({} method, {} grid candidates)",
        entry.kind,
        series.len(),
        opt_config.method,
        entry.space.size(),
    );

    let engine = BarSimulator::new(bt_config.clone());
    let outcome = optimize(entry, &series, &engine, None, opt_config)?;

    eprintln!(
        "  Feasible: {}  Evaluated: {}  Failed: {}",
        outcome.feasible, outcome.evaluated, outcome.failed
    );
    print_result_summary("Best Equity", &outcome.best_by_equity);
    print_result_summary("Best Win Rate", &outcome.best_by_win_rate);

    let report = prepare_report(&outcome)?;
    report_port.write(&report, output_path)?;
    if let Some(path) = output_path {
        eprintln!("\nReport written to: {}", path.display());
    }
    Ok(outcome)
}

fn print_result_summary(label: &str, result: &OptimizationResult) {
    let run = &result.outcome;
    let trades = run.trades.as_deref().unwrap_or_default();
    let stats = TradeStats::compute(trades);

    eprintln!("\n=== {} ===", label);
    eprintln!("Parameters:       {}", result.parameters);
    eprintln!("Final Equity:     {:.2}", run.final_equity);
    eprintln!("Return:           {:.2}%", run.return_percent);
    match run.win_rate_percent {
        Some(rate) => eprintln!("Win Rate:         {:.1}%", rate),
        None => eprintln!("Win Rate:         n/a"),
    }
    eprintln!("Total Trades:     {}", trades.len());
    eprintln!("Profit Factor:    {:.2}", stats.profit_factor);
    eprintln!(
        "Max Drawdown:     -{:.1}%",
        max_drawdown(run.initial_capital, trades) * 100.0
    );
    eprintln!("Avg Hold (days):  {:.1}", stats.avg_trade_duration);
}

fn run_signals(
    registry: &StrategyRegistry,
    config_path: &Path,
    strategy_name: &str,
    data_override: Option<&Path>,
    assignments: &[String],
) -> Result<(), TradeSignalError> {
    let adapter = load_config(config_path)?;
    let (data_path, symbol) = resolve_data_source(&adapter, data_override)?;
    let series = CsvAdapter::new(data_path).fetch_bars(&symbol)?;

    let intents = collect_signals(registry, strategy_name, &series, assignments)?;
    for intent in &intents {
        println!("{}", format_intent(intent, &series));
    }
    eprintln!("{} intents", intents.len());
    Ok(())
}

/// Binds one parameter set and replays it over the series without fills.
pub fn collect_signals(
    registry: &StrategyRegistry,
    strategy_name: &str,
    series: &BarSeries,
    assignments: &[String],
) -> Result<Vec<OrderIntent>, TradeSignalError> {
    let entry = registry.get(strategy_name)?;
    let params = parameters_with_overrides(&entry.defaults, assignments)?;

    eprintln!("{} [{}] on {} bars", entry.kind, params, series.len());
    let strategy = entry.kind.bind(&params, series)?;
    Ok(record_intents(strategy.as_ref(), series))
}

/// `index<TAB>timestamp<TAB>order`
pub fn format_intent(intent: &OrderIntent, series: &BarSeries) -> String {
    let timestamp = series
        .bars()
        .get(intent.bar_index)
        .map(|b| b.timestamp.to_string())
        .unwrap_or_default();
    format!("{}\t{}\t{}", intent.bar_index, timestamp, intent.kind)
}

fn run_strategies(registry: &StrategyRegistry) {
    for entry in registry.entries() {
        println!("{}", entry.kind);
        println!("  {}", entry.description);
        println!("  defaults:   {}", entry.defaults);
        println!(
            "  grid:       {} candidates, {} feasible",
            entry.space.size(),
            entry.space.feasible_indices(None).len()
        );
        for constraint in entry.space.constraints() {
            println!("  constraint: {}", constraint.name());
        }
    }
}

fn run_validate(config_path: &Path) -> Result<(), TradeSignalError> {
    let adapter = load_config(config_path)?;
    build_optimizer_config(&adapter)?;
    eprintln!("Config validated successfully");
    Ok(())
}
