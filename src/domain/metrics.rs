//! Performance statistics over the realized ledger and the equity curve.

use serde::{Deserialize, Serialize};

use super::portfolio::EquityPoint;
use super::position::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Percent fields (`total_return`, `win_rate`, `max_drawdown`) are already
/// multiplied by 100. P&L fields are in currency; `avg_loss` and
/// `worst_trade` are negative when losses exist. `profit_factor` is `None`
/// when there are winners but no losers (unbounded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_return: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub profit_factor: Option<f64>,
    pub final_capital: f64,
}

impl Statistics {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        starting_capital: f64,
        final_capital: f64,
    ) -> Self {
        let total_return = if starting_capital > 0.0 {
            (final_capital - starting_capital) / starting_capital * 100.0
        } else {
            0.0
        };

        let pnls: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_closing())
            .map(|t| t.realized_pnl)
            .collect();

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;

        for &pnl in &pnls {
            if pnl > 0.0 {
                winning_trades += 1;
                total_wins += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_losses += pnl;
            }
        }

        let total_trades = pnls.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses < 0.0 {
            Some(total_wins / total_losses.abs())
        } else if total_wins > 0.0 {
            None
        } else {
            Some(0.0)
        };

        let best_trade = pnls.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let worst_trade = pnls.iter().copied().reduce(f64::min).unwrap_or(0.0);

        Statistics {
            total_return,
            win_rate,
            avg_win,
            avg_loss,
            max_drawdown: compute_max_drawdown(equity_curve) * 100.0,
            sharpe_ratio: compute_sharpe(equity_curve),
            best_trade,
            worst_trade,
            total_trades,
            winning_trades,
            losing_trades,
            profit_factor,
            final_capital,
        }
    }
}

/// Largest `(peak - value) / peak` along the curve, as a fraction.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Annualized Sharpe of per-bar returns. Population standard deviation,
/// no risk-free deduction; 0 when returns have no dispersion.
pub fn compute_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
