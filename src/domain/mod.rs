//! Core domain types and logic.

pub mod ohlcv;
pub mod pricing;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod strategy;
pub mod timeframe;
pub mod backtest;
pub mod metrics;
pub mod sweep;
pub mod config_validation;
pub mod error;
