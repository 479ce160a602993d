//! Fill pricing: slippage, commission and protective-level triggers.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::PositionSide;

/// Commission on a traded notional: `notional * pct / 100`.
pub fn commission(notional: f64, commission_pct: f64) -> f64 {
    notional * commission_pct / 100.0
}

/// Entry price after slippage; buying pays up, shorting receives less.
pub fn entry_price(side: PositionSide, market_price: f64, slippage_pct: f64) -> f64 {
    match side {
        PositionSide::Short => market_price * (1.0 - slippage_pct / 100.0),
        _ => market_price * (1.0 + slippage_pct / 100.0),
    }
}

/// Exit price after slippage; selling a long receives less, covering a short
/// pays up.
pub fn exit_price(side: PositionSide, market_price: f64, slippage_pct: f64) -> f64 {
    match side {
        PositionSide::Short => market_price * (1.0 + slippage_pct / 100.0),
        _ => market_price * (1.0 - slippage_pct / 100.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    StopLoss(f64),
    TakeProfit(f64),
}

impl Trigger {
    pub fn price(&self) -> f64 {
        match self {
            Trigger::StopLoss(p) | Trigger::TakeProfit(p) => *p,
        }
    }
}

/// Checks absolute stop-loss / take-profit levels against one bar.
///
/// A level inside the bar's range fills at the level; a gap through it fills
/// at the open. When both levels are reached in the same bar the stop wins.
pub fn check_trigger(
    side: PositionSide,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    bar: &OhlcvBar,
) -> Option<Trigger> {
    match side {
        PositionSide::Long => {
            if let Some(sl) = stop_loss.filter(|&sl| bar.low <= sl) {
                return Some(Trigger::StopLoss(bar.open.min(sl)));
            }
            take_profit
                .filter(|&tp| bar.high >= tp)
                .map(|tp| Trigger::TakeProfit(bar.open.max(tp)))
        }
        PositionSide::Short => {
            if let Some(sl) = stop_loss.filter(|&sl| bar.high >= sl) {
                return Some(Trigger::StopLoss(bar.open.max(sl)));
            }
            take_profit
                .filter(|&tp| bar.low <= tp)
                .map(|tp| Trigger::TakeProfit(bar.open.min(tp)))
        }
        PositionSide::Flat => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn commission_basic() {
        assert!((commission(10_000.0, 0.1) - 10.0).abs() < 1e-10);
        assert!(commission(10_000.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn slippage_directions() {
        assert!((entry_price(PositionSide::Long, 100.0, 1.0) - 101.0).abs() < 1e-10);
        assert!((entry_price(PositionSide::Short, 100.0, 1.0) - 99.0).abs() < 1e-10);
        assert!((exit_price(PositionSide::Long, 100.0, 1.0) - 99.0).abs() < 1e-10);
        assert!((exit_price(PositionSide::Short, 100.0, 1.0) - 101.0).abs() < 1e-10);
    }

    #[test]
    fn long_stop_inside_range() {
        let t = check_trigger(PositionSide::Long, Some(95.0), None, &bar(100.0, 101.0, 94.0, 96.0));
        assert_eq!(t, Some(Trigger::StopLoss(95.0)));
    }

    #[test]
    fn long_stop_gap_fills_at_open() {
        let t = check_trigger(PositionSide::Long, Some(95.0), None, &bar(90.0, 92.0, 89.0, 91.0));
        assert_eq!(t, Some(Trigger::StopLoss(90.0)));
    }

    #[test]
    fn stop_wins_when_both_hit() {
        let t = check_trigger(
            PositionSide::Long,
            Some(95.0),
            Some(105.0),
            &bar(100.0, 106.0, 94.0, 100.0),
        );
        assert_eq!(t, Some(Trigger::StopLoss(95.0)));
    }

    #[test]
    fn short_levels_mirror() {
        let b = bar(100.0, 101.0, 94.0, 95.0);
        assert_eq!(
            check_trigger(PositionSide::Short, Some(110.0), Some(95.0), &b),
            Some(Trigger::TakeProfit(95.0))
        );
        assert_eq!(
            check_trigger(PositionSide::Short, Some(100.5), None, &b),
            Some(Trigger::StopLoss(100.5))
        );
    }

    #[test]
    fn no_levels_no_trigger() {
        let b = bar(100.0, 150.0, 50.0, 100.0);
        assert_eq!(check_trigger(PositionSide::Long, None, None, &b), None);
        assert_eq!(check_trigger(PositionSide::Flat, Some(99.0), None, &b), None);
    }
}
