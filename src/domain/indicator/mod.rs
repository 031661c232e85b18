//! Technical indicator implementations.
//!
//! Every series is parallel to the bar slice it was computed from
//! (`series.values.len() == bars.len()`); points inside the warm-up window
//! carry `None`.

pub mod rolling;
pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    /// Highest high of the prior `n` bars, current bar excluded.
    RollingHigh(usize),
    /// Lowest low of the prior `n` bars, current bar excluded.
    RollingLow(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::RollingHigh(window) => write!(f, "HIGH({})", window),
            IndicatorType::RollingLow(window) => write!(f, "LOW({})", window),
        }
    }
}
