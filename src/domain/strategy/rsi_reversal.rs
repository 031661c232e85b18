use super::{crossed_above, crossed_below, Signal, SignalContext, SignalRule, StrategyKind};
use crate::domain::indicator::IndicatorType;

/// Long when RSI climbs back above the oversold level, short when it falls
/// back below the overbought level.
pub struct RsiReversal {
    rsi: IndicatorType,
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiReversal {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            rsi: IndicatorType::Rsi(period),
            period,
            oversold,
            overbought,
        }
    }
}

impl SignalRule for RsiReversal {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Rsi
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.rsi]
    }

    fn warmup(&self) -> usize {
        self.period + 1
    }

    fn evaluate(&self, ctx: &SignalContext<'_>, index: usize) -> Signal {
        if index == 0 {
            return Signal::None;
        }
        let (Some(prev), Some(curr)) = (
            ctx.indicator(self.rsi, index - 1),
            ctx.indicator(self.rsi, index),
        ) else {
            return Signal::None;
        };

        if crossed_above(prev, self.oversold, curr, self.oversold) {
            Signal::Long
        } else if crossed_below(prev, self.overbought, curr, self.overbought) {
            Signal::Short
        } else {
            Signal::None
        }
    }
}
