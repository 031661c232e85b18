use super::{Signal, SignalContext, SignalRule, StrategyKind};
use crate::domain::indicator::IndicatorType;

/// Strict range breakout: the close must cross the prior N-bar high (or low)
/// on this bar, not merely sit beyond it.
pub struct Breakout {
    lookback: usize,
}

impl Breakout {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    fn high(&self) -> IndicatorType {
        IndicatorType::RollingHigh(self.lookback)
    }

    fn low(&self) -> IndicatorType {
        IndicatorType::RollingLow(self.lookback)
    }
}

impl SignalRule for Breakout {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Breakout
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.high(), self.low()]
    }

    fn warmup(&self) -> usize {
        self.lookback + 1
    }

    fn evaluate(&self, ctx: &SignalContext<'_>, index: usize) -> Signal {
        if index == 0 || index >= ctx.bars.len() {
            return Signal::None;
        }
        let (Some(high), Some(low)) = (
            ctx.indicator(self.high(), index),
            ctx.indicator(self.low(), index),
        ) else {
            return Signal::None;
        };

        let close = ctx.bars[index].close;
        let prev_close = ctx.bars[index - 1].close;

        if close > high && prev_close <= high {
            Signal::Long
        } else if close < low && prev_close >= low {
            Signal::Short
        } else {
            Signal::None
        }
    }
}
