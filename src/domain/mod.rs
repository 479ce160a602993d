//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod order;
pub mod position;
pub mod parameters;
pub mod strategy;
pub mod backtest;
pub mod registry;
pub mod optimizer;
pub mod report;
pub mod metrics;
pub mod config_validation;
pub mod error;
