use chrono::Weekday;

use super::{Signal, SignalContext, SignalRule, StrategyKind};
use crate::domain::indicator::IndicatorType;

/// Sell a straddle on Monday, buy it back on Thursday.
///
/// Entry is only emitted while flat and exit only while a position is held.
pub struct WeeklyStraddle;

impl SignalRule for WeeklyStraddle {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StraddleSell
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        Vec::new()
    }

    fn warmup(&self) -> usize {
        0
    }

    fn evaluate(&self, ctx: &SignalContext<'_>, index: usize) -> Signal {
        let Some(bar) = ctx.bars.get(index) else {
            return Signal::None;
        };
        match (bar.weekday(), ctx.in_position) {
            (Weekday::Mon, false) => Signal::SellStraddle,
            (Weekday::Thu, true) => Signal::ExitStraddle,
            _ => Signal::None,
        }
    }
}
