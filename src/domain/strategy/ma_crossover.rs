use super::{crossed_above, crossed_below, Signal, SignalContext, SignalRule, StrategyKind};
use crate::domain::indicator::IndicatorType;

/// Long when the fast SMA crosses above the slow SMA, short on the reverse.
pub struct MaCrossover {
    fast: IndicatorType,
    slow: IndicatorType,
    slow_period: usize,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        Self {
            fast: IndicatorType::Sma(fast_period),
            slow: IndicatorType::Sma(slow_period),
            slow_period,
        }
    }
}

impl SignalRule for MaCrossover {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MaCrossover
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.fast, self.slow]
    }

    fn warmup(&self) -> usize {
        self.slow_period
    }

    fn evaluate(&self, ctx: &SignalContext<'_>, index: usize) -> Signal {
        if index == 0 {
            return Signal::None;
        }
        let values = (
            ctx.indicator(self.fast, index - 1),
            ctx.indicator(self.slow, index - 1),
            ctx.indicator(self.fast, index),
            ctx.indicator(self.slow, index),
        );
        let (Some(prev_fast), Some(prev_slow), Some(fast), Some(slow)) = values else {
            return Signal::None;
        };

        if crossed_above(prev_fast, prev_slow, fast, slow) {
            Signal::Long
        } else if crossed_below(prev_fast, prev_slow, fast, slow) {
            Signal::Short
        } else {
            Signal::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::{bars_from_closes, signals};

    #[test]
    fn no_signal_during_warmup() {
        let closes: Vec<f64> = (0..5).map(|i| 100.0 - i as f64).collect();
        let bars = bars_from_closes(&closes);
        let out = signals(&MaCrossover::new(2, 4), &bars, false);
        assert!(out[..4].iter().all(|s| *s == Signal::None));
    }

    #[test]
    fn golden_cross_emits_long() {
        // falling then sharply rising: fast(2) overtakes slow(4)
        let closes = [10.0, 9.0, 8.0, 7.0, 6.0, 12.0, 14.0];
        let out = signals(&MaCrossover::new(2, 4), &bars_from_closes(&closes), false);
        let first = out.iter().position(|s| *s != Signal::None).unwrap();
        assert_eq!(out[first], Signal::Long);
        assert_eq!(first, 5);
    }

    #[test]
    fn death_cross_emits_short() {
        let closes = [6.0, 7.0, 8.0, 9.0, 10.0, 4.0, 2.0];
        let out = signals(&MaCrossover::new(2, 4), &bars_from_closes(&closes), false);
        assert_eq!(out[5], Signal::Short);
        assert_eq!(out.iter().filter(|s| **s != Signal::None).count(), 1);
    }

    #[test]
    fn sustained_trend_does_not_repeat_signal() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = signals(&MaCrossover::new(3, 10), &bars_from_closes(&closes), false);
        assert!(out.iter().all(|s| *s == Signal::None));
    }

    #[test]
    fn warmup_is_slow_period() {
        assert_eq!(MaCrossover::new(5, 20).warmup(), 20);
        assert_eq!(
            MaCrossover::new(5, 20).required_indicators(),
            vec![IndicatorType::Sma(5), IndicatorType::Sma(20)]
        );
    }
}
