//! Rolling high/low over the bars preceding the current one.
//!
//! HIGH(n)[i] = max(H[i-n..i]), LOW(n)[i] = min(L[i-n..i]). The current bar is
//! excluded so a close above HIGH(n) is a breakout of the prior n-bar range.
//! The first n bars are warm-up.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

fn rolling_extreme(
    bars: &[OhlcvBar],
    window: usize,
    field: fn(&OhlcvBar) -> f64,
    pick: fn(f64, f64) -> f64,
) -> Vec<IndicatorPoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = if window > 0 && i >= window {
                bars[i - window..i].iter().map(field).reduce(pick)
            } else {
                None
            };
            IndicatorPoint {
                date: bar.date,
                value,
            }
        })
        .collect()
}

pub fn calculate_rolling_high(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::RollingHigh(window),
        values: rolling_extreme(bars, window, |b| b.high, f64::max),
    }
}

pub fn calculate_rolling_low(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::RollingLow(window),
        values: rolling_extreme(bars, window, |b| b.low, f64::min),
    }
}
