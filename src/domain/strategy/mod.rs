//! Signal strategies.
//!
//! Each strategy is a [`SignalRule`] evaluated once per bar against
//! precomputed indicator series. Rules only look at bars up to and including
//! the index they are asked about.

pub mod breakout;
pub mod ma_crossover;
pub mod rsi_reversal;
pub mod straddle;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::OptraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::IndicatorMap;
use crate::domain::ohlcv::OhlcvBar;

pub use breakout::Breakout;
pub use ma_crossover::MaCrossover;
pub use rsi_reversal::RsiReversal;
pub use straddle::WeeklyStraddle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    None,
    Long,
    Short,
    SellStraddle,
    ExitStraddle,
}

/// Everything a rule may look at for one bar.
pub struct SignalContext<'a> {
    pub bars: &'a [OhlcvBar],
    pub indicators: &'a IndicatorMap,
    pub in_position: bool,
}

impl SignalContext<'_> {
    pub fn indicator(&self, indicator_type: IndicatorType, index: usize) -> Option<f64> {
        self.indicators
            .get(&indicator_type)
            .and_then(|series| series.value_at(index))
    }
}

pub trait SignalRule: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn required_indicators(&self) -> Vec<IndicatorType>;

    /// Bars needed before the rule can emit anything.
    fn warmup(&self) -> usize;

    fn evaluate(&self, ctx: &SignalContext<'_>, index: usize) -> Signal;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MaCrossover,
    Rsi,
    Breakout,
    StraddleSell,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::MaCrossover,
        StrategyKind::Rsi,
        StrategyKind::Breakout,
        StrategyKind::StraddleSell,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::MaCrossover => "ma_crossover",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Breakout => "breakout",
            StrategyKind::StraddleSell => "straddle_sell",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = OptraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| OptraderError::UnknownStrategy {
                name: s.trim().to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub fast_ma: usize,
    pub slow_ma: usize,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub breakout_lookback: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            fast_ma: 9,
            slow_ma: 21,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            breakout_lookback: 20,
        }
    }
}

pub fn build_rule(kind: StrategyKind, params: &StrategyParams) -> Box<dyn SignalRule> {
    match kind {
        StrategyKind::MaCrossover => Box::new(MaCrossover::new(params.fast_ma, params.slow_ma)),
        StrategyKind::Rsi => Box::new(RsiReversal::new(
            params.rsi_period,
            params.rsi_oversold,
            params.rsi_overbought,
        )),
        StrategyKind::Breakout => Box::new(Breakout::new(params.breakout_lookback)),
        StrategyKind::StraddleSell => Box::new(WeeklyStraddle),
    }
}

/// `a` moved from at-or-below `b` to strictly above it.
pub(crate) fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

/// `a` moved from at-or-above `b` to strictly below it.
pub(crate) fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}
