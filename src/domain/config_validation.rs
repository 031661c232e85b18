//! Configuration validation.
//!
//! The `validate_*_config` functions check the raw INI values before a run;
//! [`validate_parameters`] applies the same numeric rules to an assembled
//! [`BacktestConfig`].

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::OptraderError;
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::domain::timeframe::{LookbackPeriod, Timeframe};
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), OptraderError> {
    validate_symbol(config)?;
    let strategy = validate_strategy_id(config)?;
    let timeframe = validate_timeframe(config)?;
    check_timeframe_strategy(timeframe, strategy)?;
    validate_period(config)?;
    check_starting_capital(config.get_double("backtest", "starting_capital", 100_000.0))?;
    check_risk_free_rate(config.get_double("backtest", "risk_free_rate", 0.065))?;
    check_volatility(config.get_double("backtest", "volatility", 0.16))?;
    check_lot_size(config.get_int("backtest", "lot_size", 1))?;
    check_strike_increment(config.get_double("backtest", "strike_increment", 50.0))?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), OptraderError> {
    let defaults = StrategyParams::default();
    let period = |key: &str, default: usize| {
        let value = config.get_int("strategy", key, default as i64);
        usize::try_from(value).map_err(|_| {
            OptraderError::invalid("strategy", key, format!("{key} must be non-negative"))
        })
    };

    let params = StrategyParams {
        fast_ma: period("fast_ma", defaults.fast_ma)?,
        slow_ma: period("slow_ma", defaults.slow_ma)?,
        rsi_period: period("rsi_period", defaults.rsi_period)?,
        rsi_overbought: config.get_double("strategy", "rsi_overbought", defaults.rsi_overbought),
        rsi_oversold: config.get_double("strategy", "rsi_oversold", defaults.rsi_oversold),
        breakout_lookback: period("breakout_lookback", defaults.breakout_lookback)?,
    };
    check_strategy_params(&params)?;
    check_trigger_pct("stop_loss", config.get_double("strategy", "stop_loss", 0.0))?;
    check_trigger_pct("take_profit", config.get_double("strategy", "take_profit", 0.0))?;
    Ok(())
}

/// Numeric checks on an assembled config; run at the start of every backtest.
pub fn validate_parameters(config: &BacktestConfig) -> Result<(), OptraderError> {
    check_timeframe_strategy(config.timeframe, config.strategy)?;
    check_starting_capital(config.starting_capital)?;
    check_risk_free_rate(config.risk_free_rate)?;
    check_volatility(config.volatility)?;
    check_lot_size(i64::from(config.lot_size))?;
    check_strike_increment(config.strike_increment)?;
    check_strategy_params(&config.params)?;
    check_trigger_pct("stop_loss", config.stop_loss_pct)?;
    check_trigger_pct("take_profit", config.take_profit_pct)?;
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), OptraderError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(OptraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_strategy_id(config: &dyn ConfigPort) -> Result<StrategyKind, OptraderError> {
    let id = config
        .get_string("backtest", "strategy")
        .ok_or_else(|| OptraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "strategy".to_string(),
        })?;
    Ok(id.parse::<StrategyKind>()?)
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<Timeframe, OptraderError> {
    match config.get_string("backtest", "timeframe") {
        Some(value) => value
            .parse::<Timeframe>()
            .map_err(|reason| OptraderError::invalid("backtest", "timeframe", reason)),
        None => Ok(Timeframe::default()),
    }
}

// Weekly bars all fall on the week's first trading day, so the Thursday
// buyback would never fire.
fn check_timeframe_strategy(
    timeframe: Timeframe,
    strategy: StrategyKind,
) -> Result<(), OptraderError> {
    if timeframe == Timeframe::Weekly && strategy == StrategyKind::StraddleSell {
        return Err(OptraderError::invalid(
            "backtest",
            "timeframe",
            "straddle_sell needs daily bars",
        ));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), OptraderError> {
    if let Some(value) = config.get_string("backtest", "period") {
        value
            .parse::<LookbackPeriod>()
            .map_err(|reason| OptraderError::invalid("backtest", "period", reason))?;
    }
    Ok(())
}

fn check_starting_capital(value: f64) -> Result<(), OptraderError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(OptraderError::invalid(
            "backtest",
            "starting_capital",
            "starting_capital must be positive",
        ));
    }
    Ok(())
}

fn check_risk_free_rate(value: f64) -> Result<(), OptraderError> {
    if !(0.0..1.0).contains(&value) {
        return Err(OptraderError::invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn check_volatility(value: f64) -> Result<(), OptraderError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(OptraderError::invalid(
            "backtest",
            "volatility",
            "volatility must be positive",
        ));
    }
    Ok(())
}

fn check_lot_size(value: i64) -> Result<(), OptraderError> {
    if value < 1 || value > i64::from(u32::MAX) {
        return Err(OptraderError::invalid(
            "backtest",
            "lot_size",
            "lot_size must be at least 1",
        ));
    }
    Ok(())
}

fn check_strike_increment(value: f64) -> Result<(), OptraderError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(OptraderError::invalid(
            "backtest",
            "strike_increment",
            "strike_increment must be positive",
        ));
    }
    Ok(())
}

fn check_strategy_params(params: &StrategyParams) -> Result<(), OptraderError> {
    if params.fast_ma == 0 {
        return Err(OptraderError::invalid("strategy", "fast_ma", "fast_ma must be at least 1"));
    }
    if params.fast_ma >= params.slow_ma {
        return Err(OptraderError::invalid(
            "strategy",
            "fast_ma",
            format!(
                "fast_ma ({}) must be below slow_ma ({})",
                params.fast_ma, params.slow_ma
            ),
        ));
    }
    if params.rsi_period == 0 {
        return Err(OptraderError::invalid(
            "strategy",
            "rsi_period",
            "rsi_period must be at least 1",
        ));
    }
    if params.rsi_oversold < 0.0 || params.rsi_overbought > 100.0 {
        return Err(OptraderError::invalid(
            "strategy",
            "rsi_overbought",
            "rsi thresholds must lie within 0..=100",
        ));
    }
    if params.rsi_oversold >= params.rsi_overbought {
        return Err(OptraderError::invalid(
            "strategy",
            "rsi_oversold",
            format!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                params.rsi_oversold, params.rsi_overbought
            ),
        ));
    }
    if params.breakout_lookback == 0 {
        return Err(OptraderError::invalid(
            "strategy",
            "breakout_lookback",
            "breakout_lookback must be at least 1",
        ));
    }
    Ok(())
}

fn check_trigger_pct(key: &str, value: f64) -> Result<(), OptraderError> {
    if value < 0.0 || !value.is_finite() {
        return Err(OptraderError::invalid(
            "strategy",
            key,
            format!("{key} must be non-negative"),
        ));
    }
    Ok(())
}
