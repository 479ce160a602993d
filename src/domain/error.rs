//! Domain error types.

use crate::domain::parameters::ParameterError;

/// A strategy read an indicator value inside its warm-up prefix.
///
/// The bar walk treats this as "no decision yet" and skips the bar; tests can
/// match on it to tell a warm-up skip apart from a genuine "no signal".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{indicator} is undefined at bar {index}")]
pub struct UndefinedIndicatorAccess {
    pub indicator: String,
    pub index: usize,
}

/// Failure reported by an execution collaborator. Opaque to the core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("execution engine error: {reason}")]
pub struct ExecutionError {
    pub reason: String,
}

impl ExecutionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Top-level error type for tradesignal.
#[derive(Debug, thiserror::Error)]
pub enum TradeSignalError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid bar series: {reason}")]
    InvalidSeries { reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("no feasible configuration for {strategy}: all {considered} candidates rejected")]
    NoFeasibleCandidates { strategy: String, considered: usize },

    #[error("no runnable configuration for {strategy}: all {failed} candidate runs failed")]
    NoRunnableCandidates { strategy: String, failed: usize },

    #[error("run with parameters [{parameters}] failed: {source}")]
    Execution {
        parameters: String,
        #[source]
        source: ExecutionError,
    },

    #[error("optimization winner for {objective} has no trade list")]
    MissingTrades { objective: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradeSignalError> for std::process::ExitCode {
    fn from(err: &TradeSignalError) -> Self {
        let code: u8 = match err {
            TradeSignalError::Io(_) => 1,
            TradeSignalError::ConfigParse { .. }
            | TradeSignalError::ConfigMissing { .. }
            | TradeSignalError::ConfigInvalid { .. }
            | TradeSignalError::UnknownStrategy { .. }
            | TradeSignalError::Parameter(_) => 2,
            TradeSignalError::InvalidSeries { .. } | TradeSignalError::InsufficientData { .. } => 5,
            TradeSignalError::NoFeasibleCandidates { .. }
            | TradeSignalError::NoRunnableCandidates { .. } => 6,
            TradeSignalError::Execution { .. } => 7,
            TradeSignalError::MissingTrades { .. } | TradeSignalError::Json(_) => 8,
        };
        std::process::ExitCode::from(code)
    }
}
