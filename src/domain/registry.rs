//! Built-in strategy registry: name → kind, defaults and search space.
//!
//! Constructed once at startup and passed by reference to the optimizer and
//! CLI.

use crate::domain::error::TradeSignalError;
use crate::domain::parameters::{Constraint, ParameterSet, ParameterSpace};
use crate::domain::strategy::StrategyKind;

#[derive(Debug, Clone)]
pub struct StrategyEntry {
    pub kind: StrategyKind,
    pub description: &'static str,
    pub defaults: ParameterSet,
    pub space: ParameterSpace,
}

#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    entries: Vec<StrategyEntry>,
}

impl StrategyRegistry {
    pub fn builtin() -> Self {
        StrategyRegistry {
            entries: StrategyKind::ALL.into_iter().map(builtin_entry).collect(),
        }
    }

    /// Case-sensitive lookup by registry name.
    pub fn get(&self, name: &str) -> Result<&StrategyEntry, TradeSignalError> {
        self.entries
            .iter()
            .find(|e| e.kind.name() == name)
            .ok_or_else(|| TradeSignalError::UnknownStrategy {
                name: name.to_string(),
            })
    }

    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }
}

fn builtin_entry(kind: StrategyKind) -> StrategyEntry {
    let (description, defaults, space) = match kind {
        StrategyKind::SmaCross => (
            "fast/slow SMA crossover, long and short, ATR stop",
            ParameterSet::new()
                .with("n1", 10i64)
                .with("n2", 20i64)
                .with("n3", 14i64)
                .with("n4", 2i64),
            ParameterSpace::new()
                .range("n1", 5, 30, 1)
                .range("n2", 10, 60, 2)
                .axis("n3", [12i64, 13, 14, 15, 16])
                .axis("n4", [2i64, 3, 4])
                .constraint(Constraint::new("n1 < n2", |p| {
                    matches!((p.period("n1"), p.period("n2")), (Ok(fast), Ok(slow)) if fast < slow)
                })),
        ),
        StrategyKind::RsiEmaCross => (
            "RSI crossing 70 above fast and slow EMAs, long only, ATR stop",
            ParameterSet::new()
                .with("n1", 50i64)
                .with("n2", 200i64)
                .with("n3", 14i64)
                .with("n4", 14i64)
                .with("n5", 2i64),
            ParameterSpace::new()
                .range("n1", 25, 76, 5)
                .range("n2", 150, 251, 10)
                .range("n3", 11, 18, 1)
                .axis("n4", [12i64, 13, 14, 15, 16])
                .axis("n5", [2i64, 3, 4]),
        ),
        StrategyKind::MacdEmaCrossover => (
            "MACD/signal crossover above a trend EMA, long only, ATR stop",
            ParameterSet::new()
                .with("n1", 12i64)
                .with("n2", 26i64)
                .with("n3", 9i64)
                .with("n4", 200i64)
                .with("n5", 14i64)
                .with("n6", 2i64),
            ParameterSpace::new()
                .range("n1", 8, 17, 1)
                .range("n2", 18, 35, 1)
                .axis("n3", [8i64, 9, 10])
                .range("n4", 150, 251, 10)
                .axis("n5", [12i64, 13, 14, 15, 16])
                .axis("n6", [2i64, 3, 4]),
        ),
        StrategyKind::BollingerBandBreakout => (
            "Bollinger band reversal breakout with RSI and width filters, ATR stop and target",
            ParameterSet::new()
                .with("n1", 30i64)
                .with("n2", 2.0)
                .with("n3", 14i64)
                .with("n4", 14i64)
                .with("n5", 3i64)
                .with("n6", 2i64)
                .with("n7", 30i64)
                .with("n8", 70i64)
                .with("n9", 0.0015),
            ParameterSpace::new()
                .axis("n1", [25i64, 30, 35])
                .axis("n2", [1.5, 2.0, 2.5])
                .axis("n3", [12i64, 13, 14, 15, 16])
                .axis("n4", [12i64, 13, 14, 15, 16])
                .axis("n5", [2i64, 3, 4])
                .axis("n6", [2i64, 3, 4, 5, 6, 7, 8, 9])
                .axis("n7", [25i64, 30, 35])
                .axis("n8", [25i64, 30, 35])
                .axis("n9", [0.003, 0.006, 0.008, 0.03, 0.06, 0.08]),
        ),
        StrategyKind::SmaTrendFollowing => (
            "close above/below a single SMA, long only",
            ParameterSet::new().with("n1", 50i64),
            ParameterSpace::new().range("n1", 30, 81, 5),
        ),
        StrategyKind::StochasticCrossover => (
            "stochastic %K/%D crossover in oversold/overbought zones, long only, ATR stop",
            ParameterSet::new()
                .with("n1", 14i64)
                .with("n2", 3i64)
                .with("n3", 14i64)
                .with("n4", 2i64)
                .with("n6", 20i64)
                .with("n7", 80i64),
            ParameterSpace::new()
                .axis("n1", [12i64, 13, 14, 15])
                .axis("n2", [3i64, 4, 5])
                .axis("n3", [12i64, 13, 14, 15])
                .axis("n4", [2i64, 3, 4])
                .axis("n6", [15i64, 20, 25])
                .axis("n7", [75i64, 80, 85]),
        ),
    };

    StrategyEntry {
        kind,
        description,
        defaults,
        space,
    }
}
