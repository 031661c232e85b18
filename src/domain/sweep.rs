//! Moving-average parameter sweep.
//!
//! Every combination runs as an independent backtest over the same bars;
//! runs share nothing but the read-only input.

use rayon::prelude::*;
use serde::Serialize;

use super::backtest::{run_backtest, BacktestConfig};
use super::error::OptraderError;
use super::ohlcv::OhlcvBar;
use super::strategy::StrategyParams;

/// Parse a comma-separated list of positive periods such as `5,10,20`.
pub fn parse_period_list(input: &str) -> Result<Vec<usize>, String> {
    let mut periods = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(format!("empty entry in period list '{input}'"));
        }
        let value: usize = token
            .parse()
            .map_err(|_| format!("'{token}' is not a valid period"))?;
        if value == 0 {
            return Err("periods must be positive".to_string());
        }
        if periods.contains(&value) {
            return Err(format!("duplicate period {value}"));
        }
        periods.push(value);
    }
    Ok(periods)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub fast: Vec<usize>,
    pub slow: Vec<usize>,
}

impl SweepGrid {
    /// All `(fast, slow)` pairs with `fast < slow`.
    pub fn combinations(&self) -> Vec<(usize, usize)> {
        self.fast
            .iter()
            .flat_map(|&f| self.slow.iter().map(move |&s| (f, s)))
            .filter(|(f, s)| f < s)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub fast_ma: usize,
    pub slow_ma: usize,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub final_capital: f64,
}

/// Run one backtest per grid combination in parallel, ranked by total
/// return (best first).
pub fn run_sweep(
    bars: &[OhlcvBar],
    base: &BacktestConfig,
    grid: &SweepGrid,
) -> Result<Vec<SweepOutcome>, OptraderError> {
    let combinations = grid.combinations();
    log::info!(
        "{}: sweeping {} {} combinations",
        base.symbol,
        combinations.len(),
        base.strategy
    );

    let mut outcomes = combinations
        .par_iter()
        .map(|&(fast_ma, slow_ma)| {
            let config = BacktestConfig {
                params: StrategyParams {
                    fast_ma,
                    slow_ma,
                    ..base.params.clone()
                },
                ..base.clone()
            };
            let result = run_backtest(bars, &config)?;
            Ok(SweepOutcome {
                fast_ma,
                slow_ma,
                total_return: result.statistics.total_return,
                sharpe_ratio: result.statistics.sharpe_ratio,
                max_drawdown: result.statistics.max_drawdown,
                win_rate: result.statistics.win_rate,
                total_trades: result.statistics.total_trades,
                final_capital: result.final_capital,
            })
        })
        .collect::<Result<Vec<_>, OptraderError>>()?;

    outcomes.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
    Ok(outcomes)
}
