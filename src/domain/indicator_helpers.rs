//! Batch indicator computation shared by the backtest runner.

use std::collections::HashMap;

use crate::domain::indicator::rolling::{calculate_rolling_high, calculate_rolling_low};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub type IndicatorMap = HashMap<IndicatorType, IndicatorSeries>;

pub fn calculate(bars: &[OhlcvBar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::RollingHigh(window) => calculate_rolling_high(bars, window),
        IndicatorType::RollingLow(window) => calculate_rolling_low(bars, window),
    }
}

/// Compute each requested indicator once over the whole bar slice.
pub fn compute_indicators(bars: &[OhlcvBar], types: &[IndicatorType]) -> IndicatorMap {
    let mut map = IndicatorMap::with_capacity(types.len());
    for &indicator_type in types {
        map.entry(indicator_type)
            .or_insert_with(|| calculate(bars, indicator_type));
    }
    map
}
