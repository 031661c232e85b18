//! Backtest configuration and the bar-by-bar event loop.

use serde::Serialize;

use super::config_validation::validate_parameters;
use super::error::OptraderError;
use super::execution::{self, ExecutionParams};
use super::indicator_helpers::compute_indicators;
use super::metrics::Statistics;
use super::ohlcv::{sanitize_bars, OhlcvBar};
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{Side, Trade, TradeKind};
use super::pricing::{self, OptionType};
use super::strategy::{build_rule, Signal, SignalContext, StrategyKind, StrategyParams};
use super::timeframe::{LookbackPeriod, Timeframe};

/// Bars required before any run, and the earliest index the loop evaluates.
pub const MIN_BARS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub params: StrategyParams,
    pub timeframe: Timeframe,
    pub period: LookbackPeriod,
    pub starting_capital: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub lot_size: u32,
    pub strike_increment: f64,
    /// Premium stop-loss in percent; 0 disables.
    pub stop_loss_pct: f64,
    /// Premium take-profit in percent; 0 disables.
    pub take_profit_pct: f64,
}

impl BacktestConfig {
    /// Defaults for `symbol`, with lot size and strike increment taken from
    /// its [`SymbolProfile`](super::position::SymbolProfile).
    pub fn new(symbol: &str, strategy: StrategyKind) -> Self {
        let profile = super::position::SymbolProfile::for_symbol(symbol);
        BacktestConfig {
            symbol: symbol.to_string(),
            strategy,
            params: StrategyParams::default(),
            timeframe: Timeframe::default(),
            period: LookbackPeriod::default(),
            starting_capital: 100_000.0,
            risk_free_rate: pricing::DEFAULT_RISK_FREE_RATE,
            volatility: pricing::DEFAULT_VOLATILITY,
            lot_size: profile.lot_size,
            strike_increment: profile.strike_increment,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }

    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams {
            lot_size: self.lot_size,
            strike_increment: self.strike_increment,
            risk_free_rate: self.risk_free_rate,
            volatility: self.volatility,
            stop_loss_pct: self.stop_loss_pct,
            take_profit_pct: self.take_profit_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub starting_capital: f64,
    pub final_capital: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub statistics: Statistics,
    pub bars_processed: usize,
}

/// Replay `bars` through the configured strategy.
///
/// Bars are sanitised first; fewer than [`MIN_BARS`] usable bars is an
/// [`OptraderError::InsufficientData`] with no trades or equity produced.
/// The loop starts at `max(warmup, MIN_BARS)`. Each bar checks premium
/// triggers, then evaluates the signal, then records equity. Anything still
/// open after the last bar is force-closed.
pub fn run_backtest(
    bars: &[OhlcvBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, OptraderError> {
    validate_parameters(config)?;

    let bars = sanitize_bars(bars.to_vec());
    if bars.len() < MIN_BARS {
        return Err(OptraderError::InsufficientData {
            symbol: config.symbol.clone(),
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }

    let rule = build_rule(config.strategy, &config.params);
    let indicators = compute_indicators(&bars, &rule.required_indicators());
    let exec = config.execution_params();
    let start = rule.warmup().max(MIN_BARS);

    log::info!(
        "{}: running {} over {} bars from index {}",
        config.symbol,
        config.strategy,
        bars.len(),
        start
    );

    let mut portfolio = Portfolio::new(config.starting_capital);

    for (index, bar) in bars.iter().enumerate().skip(start) {
        let triggered = execution::check_triggers(&mut portfolio, bar, index, &exec).is_some();

        if !triggered {
            let ctx = SignalContext {
                bars: &bars,
                indicators: &indicators,
                in_position: !portfolio.is_flat(),
            };
            let signal = rule.evaluate(&ctx, index);
            apply_signal(&mut portfolio, bar, index, signal, &exec);
        }

        portfolio.record_equity(bar.date);
    }

    if let Some(last) = bars.last() {
        let last_index = bars.len() - 1;
        if execution::force_close(&mut portfolio, last, last_index).is_some() {
            let cash = portfolio.cash;
            if let Some(point) = portfolio.equity_curve.last_mut() {
                point.equity = cash;
            }
        }
    }

    let final_capital = portfolio.cash;
    let statistics = Statistics::compute(
        &portfolio.trades,
        &portfolio.equity_curve,
        config.starting_capital,
        final_capital,
    );
    let bars_processed = portfolio.equity_curve.len();

    log::info!(
        "{}: {} closed trades, final capital {:.2} ({:+.2}%)",
        config.symbol,
        statistics.total_trades,
        final_capital,
        statistics.total_return
    );

    Ok(BacktestResult {
        symbol: config.symbol.clone(),
        strategy: config.strategy,
        starting_capital: config.starting_capital,
        final_capital,
        trades: portfolio.trades,
        equity_curve: portfolio.equity_curve,
        statistics,
        bars_processed,
    })
}

/// Route one signal through the position state machine.
///
/// An opposing directional signal closes the held option and leaves the
/// book flat for this bar.
fn apply_signal(
    portfolio: &mut Portfolio,
    bar: &OhlcvBar,
    index: usize,
    signal: Signal,
    exec: &ExecutionParams,
) {
    let held = portfolio.position().map(|p| p.side());

    match (signal, held) {
        (Signal::None, _) => {}
        (Signal::Long, None) => {
            execution::enter_directional(portfolio, bar, index, OptionType::Call, exec);
        }
        (Signal::Short, None) => {
            execution::enter_directional(portfolio, bar, index, OptionType::Put, exec);
        }
        (Signal::Long, Some(Side::Put)) | (Signal::Short, Some(Side::Call)) => {
            execution::exit_position(
                portfolio,
                bar,
                index,
                TradeKind::Exit,
                exec.risk_free_rate,
                exec.volatility,
            );
        }
        (Signal::SellStraddle, None) => {
            execution::enter_straddle(portfolio, bar, index, exec);
        }
        (Signal::ExitStraddle, Some(Side::Straddle)) => {
            execution::exit_position(
                portfolio,
                bar,
                index,
                TradeKind::StraddleExit,
                exec.risk_free_rate,
                exec.volatility,
            );
        }
        _ => {}
    }
}
