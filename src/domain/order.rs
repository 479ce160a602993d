//! Order intents: what a strategy asks the execution engine to do.
//!
//! Stop-loss and take-profit are absolute price levels fixed when the intent
//! is emitted. They are never revised during the trade.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderKind {
    /// Open a long position, closing any short first.
    Buy {
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    },
    /// Open a short position, closing any long first.
    Sell {
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    },
    /// Close whatever is open.
    CloseAll,
}

impl OrderKind {
    pub fn buy(stop_loss: Option<f64>, take_profit: Option<f64>) -> Self {
        OrderKind::Buy {
            stop_loss,
            take_profit,
        }
    }

    pub fn sell(stop_loss: Option<f64>, take_profit: Option<f64>) -> Self {
        OrderKind::Sell {
            stop_loss,
            take_profit,
        }
    }

    pub fn is_entry(&self) -> bool {
        !matches!(self, OrderKind::CloseAll)
    }

    pub fn stop_loss(&self) -> Option<f64> {
        match self {
            OrderKind::Buy { stop_loss, .. } | OrderKind::Sell { stop_loss, .. } => *stop_loss,
            OrderKind::CloseAll => None,
        }
    }

    pub fn take_profit(&self) -> Option<f64> {
        match self {
            OrderKind::Buy { take_profit, .. } | OrderKind::Sell { take_profit, .. } => {
                *take_profit
            }
            OrderKind::CloseAll => None,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, sl, tp) = match self {
            OrderKind::Buy {
                stop_loss,
                take_profit,
            } => ("BUY", stop_loss, take_profit),
            OrderKind::Sell {
                stop_loss,
                take_profit,
            } => ("SELL", stop_loss, take_profit),
            OrderKind::CloseAll => return write!(f, "CLOSE_ALL"),
        };
        write!(f, "{}", name)?;
        if let Some(sl) = sl {
            write!(f, " sl={:.4}", sl)?;
        }
        if let Some(tp) = tp {
            write!(f, " tp={:.4}", tp)?;
        }
        Ok(())
    }
}

/// An order kind tagged with the bar index at which it was emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderIntent {
    pub bar_index: usize,
    pub kind: OrderKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_accessors() {
        let buy = OrderKind::buy(Some(95.0), Some(110.0));
        assert_eq!(buy.stop_loss(), Some(95.0));
        assert_eq!(buy.take_profit(), Some(110.0));
        assert!(buy.is_entry());

        assert_eq!(OrderKind::CloseAll.stop_loss(), None);
        assert!(!OrderKind::CloseAll.is_entry());
    }

    #[test]
    fn display_formats() {
        assert_eq!(OrderKind::buy(None, None).to_string(), "BUY");
        assert_eq!(
            OrderKind::sell(Some(105.5), Some(90.0)).to_string(),
            "SELL sl=105.5000 tp=90.0000"
        );
        assert_eq!(OrderKind::CloseAll.to_string(), "CLOSE_ALL");
    }
}
