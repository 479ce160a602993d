//! Configuration validation.
//!
//! Validates all config fields before any run.

use crate::domain::error::TradeSignalError;
use crate::domain::optimizer::SearchMethod;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    validate_initial_capital(config)?;
    validate_costs(config)?;
    validate_position_size(config)?;
    Ok(())
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    validate_method(config)?;
    validate_max_candidates(config)?;
    validate_seed(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TradeSignalError {
    TradeSignalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    let value = config.get_double("backtest", "initial_capital", 10_000_000.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_costs(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    for key in ["commission_pct", "slippage_pct"] {
        let value = config.get_double("backtest", key, 0.0);
        if value < 0.0 || value >= 100.0 {
            return Err(invalid(
                "backtest",
                key,
                &format!("{} must be in [0, 100)", key),
            ));
        }
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    let value = config.get_double("backtest", "position_size", 0.9999);
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(
            "backtest",
            "position_size",
            "position_size must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_method(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    match config.get_string("optimizer", "method") {
        None => Ok(()),
        Some(s) => s
            .parse::<SearchMethod>()
            .map(|_| ())
            .map_err(|reason| invalid("optimizer", "method", &reason)),
    }
}

fn validate_max_candidates(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    let value = config.get_int("optimizer", "max_candidates", 200);
    if value < 1 {
        return Err(invalid(
            "optimizer",
            "max_candidates",
            "max_candidates must be at least 1",
        ));
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), TradeSignalError> {
    if config.get_int("optimizer", "seed", 0) < 0 {
        return Err(invalid("optimizer", "seed", "seed must be non-negative"));
    }
    Ok(())
}
