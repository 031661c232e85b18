//! Simple Moving Average.
//!
//! SMA[i] = mean(C[i-n+1..=i]); the first (n-1) bars are warm-up.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            date: b.date,
            value: None,
        })
        .collect();

    if period > 0 && bars.len() >= period {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        for (offset, window) in closes.windows(period).enumerate() {
            let mean = window.iter().sum::<f64>() / period as f64;
            values[offset + period - 1].value = Some(mean);
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
