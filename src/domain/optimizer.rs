//! Dual-objective parameter search.
//!
//! Candidates are drawn from a strategy's ParameterSpace after constraints
//! are applied, each is bound and run through a fresh execution session,
//! and the best run is kept for both objectives. Runs are independent and
//! may be evaluated in parallel; ranking always walks results in
//! enumeration order so ties go to the first-seen candidate.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::backtest::{execute, RunOutcome};
use crate::domain::error::TradeSignalError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::parameters::{Constraint, ParameterSet};
use crate::domain::registry::StrategyEntry;
use crate::domain::strategy::StrategyKind;
use crate::ports::execution_port::ExecutionPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    TerminalEquity,
    WinRate,
}

impl Objective {
    /// Score of a run. A run without trades has no win rate and scores 0.
    pub fn score(&self, outcome: &RunOutcome) -> f64 {
        match self {
            Objective::TerminalEquity => outcome.final_equity,
            Objective::WinRate => outcome.win_rate_percent.unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::TerminalEquity => write!(f, "Equity Final [$]"),
            Objective::WinRate => write!(f, "Win Rate [%]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMethod {
    /// Exhaustive when the feasible set fits in `max_candidates`, else random.
    #[default]
    Auto,
    Exhaustive,
    /// Uniform sample of at most `max_candidates` feasible candidates.
    Random,
}

impl FromStr for SearchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SearchMethod::Auto),
            "exhaustive" | "grid" => Ok(SearchMethod::Exhaustive),
            "random" => Ok(SearchMethod::Random),
            other => Err(format!(
                "unknown search method '{}' (expected auto, exhaustive or random)",
                other
            )),
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMethod::Auto => write!(f, "auto"),
            SearchMethod::Exhaustive => write!(f, "exhaustive"),
            SearchMethod::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub method: SearchMethod,
    pub max_candidates: usize,
    pub seed: u64,
    pub parallel: bool,
    /// Fail the whole search on the first failing candidate instead of
    /// excluding it.
    pub abort_on_error: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            method: SearchMethod::Auto,
            max_candidates: 200,
            seed: 0,
            parallel: true,
            abort_on_error: false,
        }
    }
}

/// The winning run for one objective.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub objective: Objective,
    pub candidate_index: usize,
    pub parameters: ParameterSet,
    pub score: f64,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub strategy: StrategyKind,
    pub best_by_equity: OptimizationResult,
    pub best_by_win_rate: OptimizationResult,
    /// Candidates passing all constraints.
    pub feasible: usize,
    /// Candidates actually run.
    pub evaluated: usize,
    /// Runs that failed and were excluded from ranking.
    pub failed: usize,
}

/// Enumeration indices to evaluate, ascending.
pub fn select_candidates(feasible: Vec<usize>, config: &OptimizerConfig) -> Vec<usize> {
    let sample = match config.method {
        SearchMethod::Exhaustive => false,
        SearchMethod::Auto | SearchMethod::Random => feasible.len() > config.max_candidates,
    };
    if !sample {
        return feasible;
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut picked: Vec<usize> = rand::seq::index::sample(&mut rng, feasible.len(), config.max_candidates)
        .into_iter()
        .map(|i| feasible[i])
        .collect();
    picked.sort_unstable();
    picked
}

struct Evaluation {
    index: usize,
    parameters: ParameterSet,
    result: Result<RunOutcome, TradeSignalError>,
}

fn evaluate(
    entry: &StrategyEntry,
    series: &BarSeries,
    port: &dyn ExecutionPort,
    index: usize,
    parameters: ParameterSet,
) -> Evaluation {
    let result = entry.kind.bind(&parameters, series).and_then(|strategy| {
        execute(strategy.as_ref(), series, port).map_err(|source| TradeSignalError::Execution {
            parameters: parameters.to_string(),
            source,
        })
    });
    if let Ok(outcome) = &result {
        debug!(
            strategy = %entry.kind,
            candidate = index,
            params = %parameters,
            equity = outcome.final_equity,
            trades = outcome.trade_count(),
            "candidate evaluated"
        );
    }
    Evaluation {
        index,
        parameters,
        result,
    }
}

/// Keeps the best-scoring run; strict `>` so earlier candidates win ties.
fn consider(
    best: &mut Option<OptimizationResult>,
    objective: Objective,
    index: usize,
    parameters: &ParameterSet,
    outcome: &RunOutcome,
) {
    let score = objective.score(outcome);
    if best.as_ref().is_none_or(|b| score > b.score) {
        *best = Some(OptimizationResult {
            objective,
            candidate_index: index,
            parameters: parameters.clone(),
            score,
            outcome: outcome.clone(),
        });
    }
}

/// Runs both objectives over `entry`'s parameter space.
///
/// Fails with `NoFeasibleCandidates` when constraints reject everything,
/// `InsufficientData` when the series is too short for the selected
/// candidates, and `NoRunnableCandidates` when every run fails.
pub fn optimize(
    entry: &StrategyEntry,
    series: &BarSeries,
    port: &dyn ExecutionPort,
    constraint: Option<&Constraint>,
    config: &OptimizerConfig,
) -> Result<OptimizationOutcome, TradeSignalError> {
    let space = &entry.space;
    let feasible = space.feasible_indices(constraint);
    if feasible.is_empty() {
        return Err(TradeSignalError::NoFeasibleCandidates {
            strategy: entry.kind.to_string(),
            considered: space.size(),
        });
    }
    let feasible_count = feasible.len();

    let candidates: Vec<(usize, ParameterSet)> = select_candidates(feasible, config)
        .into_iter()
        .filter_map(|index| space.candidate(index).map(|params| (index, params)))
        .collect();

    let mut required = 0;
    for (_, params) in &candidates {
        required = required.max(entry.kind.required_bars(params)?);
    }
    series.require(required)?;

    info!(
        strategy = %entry.kind,
        feasible = feasible_count,
        candidates = candidates.len(),
        method = %config.method,
        parallel = config.parallel,
        "optimizing"
    );

    let mut evaluations: Vec<Evaluation> = if config.parallel {
        candidates
            .into_par_iter()
            .map(|(index, params)| evaluate(entry, series, port, index, params))
            .collect()
    } else {
        candidates
            .into_iter()
            .map(|(index, params)| evaluate(entry, series, port, index, params))
            .collect()
    };
    evaluations.sort_by_key(|e| e.index);

    let evaluated = evaluations.len();
    let mut failed = 0;
    let mut best_equity = None;
    let mut best_win_rate = None;

    for Evaluation {
        index,
        parameters,
        result,
    } in evaluations
    {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) if config.abort_on_error => return Err(err),
            Err(err) => {
                warn!(
                    strategy = %entry.kind,
                    candidate = index,
                    params = %parameters,
                    error = %err,
                    "candidate excluded"
                );
                failed += 1;
                continue;
            }
        };
        consider(&mut best_equity, Objective::TerminalEquity, index, &parameters, &outcome);
        consider(&mut best_win_rate, Objective::WinRate, index, &parameters, &outcome);
    }

    let (Some(best_by_equity), Some(best_by_win_rate)) = (best_equity, best_win_rate) else {
        return Err(TradeSignalError::NoRunnableCandidates {
            strategy: entry.kind.to_string(),
            failed,
        });
    };

    info!(
        strategy = %entry.kind,
        evaluated,
        failed,
        equity_params = %best_by_equity.parameters,
        final_equity = best_by_equity.score,
        win_rate_params = %best_by_win_rate.parameters,
        win_rate = best_by_win_rate.score,
        "optimization complete"
    );

    Ok(OptimizationOutcome {
        strategy: entry.kind,
        best_by_equity,
        best_by_win_rate,
        feasible: feasible_count,
        evaluated,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ExecutionError;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::order::OrderIntent;
    use crate::domain::parameters::{ParamValue, ParameterSpace};
    use crate::domain::position::PositionSide;
    use crate::domain::strategy::test_support::bars;
    use crate::ports::execution_port::ExecutionSession;

    /// Every run ends at the starting equity with no trades.
    struct FlatEngine;

    struct FixedSession {
        equity: f64,
    }

    impl ExecutionSession for FixedSession {
        fn on_bar(&mut self, _index: usize, _bar: &OhlcvBar) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn position(&self) -> PositionSide {
            PositionSide::Flat
        }

        fn submit(&mut self, _intent: OrderIntent) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<RunOutcome, ExecutionError> {
            Ok(RunOutcome::from_trades(100.0, self.equity, Vec::new()))
        }
    }

    impl ExecutionPort for FlatEngine {
        fn open_session(&self, _series: &BarSeries) -> Result<Box<dyn ExecutionSession>, ExecutionError> {
            Ok(Box::new(FixedSession { equity: 100.0 }))
        }
    }

    struct AlwaysFails;

    impl ExecutionPort for AlwaysFails {
        fn open_session(&self, _series: &BarSeries) -> Result<Box<dyn ExecutionSession>, ExecutionError> {
            Err(ExecutionError::new("engine offline"))
        }
    }

    fn entry(space: ParameterSpace) -> StrategyEntry {
        StrategyEntry {
            kind: StrategyKind::SmaTrendFollowing,
            description: "test",
            defaults: ParameterSet::new().with("n1", 3i64),
            space,
        }
    }

    fn series() -> BarSeries {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        BarSeries::new("TEST", bars(&closes)).unwrap()
    }

    #[test]
    fn search_method_parsing() {
        assert_eq!("auto".parse::<SearchMethod>(), Ok(SearchMethod::Auto));
        assert_eq!("Exhaustive".parse::<SearchMethod>(), Ok(SearchMethod::Exhaustive));
        assert_eq!("random".parse::<SearchMethod>(), Ok(SearchMethod::Random));
        assert!("skopt".parse::<SearchMethod>().is_err());
    }

    #[test]
    fn zero_trade_run_scores_zero_win_rate() {
        let outcome = RunOutcome::from_trades(100.0, 100.0, Vec::new());
        assert!(Objective::WinRate.score(&outcome).abs() < f64::EPSILON);
        assert!((Objective::TerminalEquity.score(&outcome) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exhaustive_keeps_everything() {
        let config = OptimizerConfig {
            method: SearchMethod::Exhaustive,
            max_candidates: 2,
            ..OptimizerConfig::default()
        };
        assert_eq!(select_candidates(vec![1, 4, 9, 16], &config), vec![1, 4, 9, 16]);
    }

    #[test]
    fn sampling_is_seeded_sorted_and_bounded() {
        let config = OptimizerConfig {
            method: SearchMethod::Random,
            max_candidates: 10,
            seed: 7,
            ..OptimizerConfig::default()
        };
        let feasible: Vec<usize> = (0..100).map(|i| i * 3).collect();
        let first = select_candidates(feasible.clone(), &config);
        let second = select_candidates(feasible.clone(), &config);

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
        assert!(first.iter().all(|i| feasible.contains(i)));
    }

    #[test]
    fn auto_is_exhaustive_when_small() {
        let config = OptimizerConfig::default();
        assert_eq!(select_candidates(vec![0, 1, 2], &config), vec![0, 1, 2]);
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let entry = entry(ParameterSpace::new().axis("n1", [5i64, 3, 4]));
        for parallel in [true, false] {
            let config = OptimizerConfig {
                parallel,
                ..OptimizerConfig::default()
            };
            let outcome = optimize(&entry, &series(), &FlatEngine, None, &config).unwrap();
            assert_eq!(outcome.best_by_equity.candidate_index, 0);
            assert_eq!(outcome.best_by_win_rate.candidate_index, 0);
            assert_eq!(outcome.best_by_equity.parameters.get("n1"), Some(ParamValue::Int(5)));
            assert_eq!(outcome.evaluated, 3);
        }
    }

    #[test]
    fn infeasible_space_fails() {
        let entry = entry(ParameterSpace::new().axis("n1", [5i64, 10]));
        let reject_all = Constraint::new("never", |_| false);
        let err = optimize(&entry, &series(), &FlatEngine, Some(&reject_all), &OptimizerConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TradeSignalError::NoFeasibleCandidates { considered: 2, .. }
        ));
    }

    #[test]
    fn too_short_series_fails_before_running() {
        let entry = entry(ParameterSpace::new().axis("n1", [5i64, 50]));
        let err = optimize(&entry, &series(), &FlatEngine, None, &OptimizerConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TradeSignalError::InsufficientData {
                bars: 40,
                minimum: 50,
                ..
            }
        ));
    }

    #[test]
    fn failing_engine_is_not_runnable() {
        let entry = entry(ParameterSpace::new().axis("n1", [5i64, 10]));
        let err = optimize(&entry, &series(), &AlwaysFails, None, &OptimizerConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TradeSignalError::NoRunnableCandidates { failed: 2, .. }
        ));
    }

    #[test]
    fn abort_on_error_surfaces_parameters() {
        let entry = entry(ParameterSpace::new().axis("n1", [5i64, 10]));
        let config = OptimizerConfig {
            abort_on_error: true,
            ..OptimizerConfig::default()
        };
        let err = optimize(&entry, &series(), &AlwaysFails, None, &config).unwrap_err();
        match err {
            TradeSignalError::Execution { parameters, .. } => assert_eq!(parameters, "n1=5"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
