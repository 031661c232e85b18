//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_result_adapter::JsonResultAdapter;
use crate::adapters::trades_csv_adapter::TradesCsvAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    validate_backtest_config, validate_parameters, validate_strategy_config,
};
use crate::domain::error::OptraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::SymbolProfile;
use crate::domain::pricing::{self, OptionType};
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::domain::sweep::{parse_period_list, run_sweep, SweepGrid, SweepOutcome};
use crate::domain::timeframe::{LookbackPeriod, Timeframe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::result_port::ResultPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "optrader", about = "Synthetic options strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding <SYMBOL>.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        strategy: Option<String>,
        /// Write the full result as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the trade ledger as CSV
        #[arg(long)]
        trades_csv: Option<PathBuf>,
    },
    /// Price an option and print its Greeks
    Price {
        #[arg(long)]
        spot: f64,
        #[arg(long)]
        strike: f64,
        /// Calendar days to expiry
        #[arg(long)]
        days: f64,
        #[arg(long, default_value_t = pricing::DEFAULT_VOLATILITY)]
        vol: f64,
        #[arg(long, default_value_t = pricing::DEFAULT_RISK_FREE_RATE)]
        rate: f64,
        #[arg(long = "type", default_value = "call")]
        option_type: OptionType,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Sweep moving-average crossover periods
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// Comma-separated fast periods, e.g. 5,9
        #[arg(long)]
        fast: String,
        /// Comma-separated slow periods, e.g. 20,30
        #[arg(long)]
        slow: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            symbol,
            strategy,
            json,
            trades_csv,
        } => {
            let overrides = Overrides {
                data_dir,
                symbol,
                strategy,
            };
            run_backtest_command(&config, &overrides, json.as_deref(), trades_csv.as_deref())
        }
        Command::Price {
            spot,
            strike,
            days,
            vol,
            rate,
            option_type,
        } => run_price(spot, strike, days, vol, rate, option_type),
        Command::Validate { config } => run_validate(&config),
        Command::Sweep {
            config,
            data_dir,
            symbol,
            fast,
            slow,
        } => {
            let overrides = Overrides {
                data_dir,
                symbol,
                strategy: None,
            };
            run_sweep_command(&config, &overrides, &fast, &slow)
        }
    }
}

/// Command-line values that take precedence over the INI file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub symbol: Option<String>,
    pub strategy: Option<String>,
}

/// A [`ConfigPort`] that answers `[backtest]` keys from [`Overrides`] first.
pub struct OverlayConfig<'a> {
    base: &'a dyn ConfigPort,
    overrides: &'a Overrides,
}

impl<'a> OverlayConfig<'a> {
    pub fn new(base: &'a dyn ConfigPort, overrides: &'a Overrides) -> Self {
        Self { base, overrides }
    }

    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        if section != "backtest" {
            return None;
        }
        match key {
            "symbol" => self.overrides.symbol.clone(),
            "strategy" => self.overrides.strategy.clone(),
            "data_dir" => self
                .overrides
                .data_dir
                .as_ref()
                .map(|p| p.display().to_string()),
            _ => None,
        }
    }
}

impl ConfigPort for OverlayConfig<'_> {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key)
            .or_else(|| self.base.get_string(section, key))
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.lookup(section, key) {
            Some(v) => v.trim().parse().unwrap_or(default),
            None => self.base.get_int(section, key, default),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        match self.lookup(section, key) {
            Some(v) => v.trim().parse().unwrap_or(default),
            None => self.base.get_double(section, key, default),
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.base.get_bool(section, key, default)
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn report(err: OptraderError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

fn usize_setting(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, OptraderError> {
    let value = adapter.get_int(section, key, default as i64);
    usize::try_from(value)
        .map_err(|_| OptraderError::invalid(section, key, format!("{key} must be non-negative")))
}

/// Assemble a [`BacktestConfig`] from `[backtest]` and `[strategy]`.
///
/// Lot size and strike increment default to the symbol's profile.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, OptraderError> {
    let symbol = adapter
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OptraderError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })?;

    let strategy: StrategyKind = adapter
        .get_string("backtest", "strategy")
        .ok_or_else(|| OptraderError::ConfigMissing {
            section: "backtest".into(),
            key: "strategy".into(),
        })?
        .parse()?;

    let timeframe: Timeframe = adapter
        .get_string_or("backtest", "timeframe", "daily")
        .parse()
        .map_err(|reason| OptraderError::invalid("backtest", "timeframe", reason))?;
    let period: LookbackPeriod = adapter
        .get_string_or("backtest", "period", "1y")
        .parse()
        .map_err(|reason| OptraderError::invalid("backtest", "period", reason))?;

    let profile = SymbolProfile::for_symbol(&symbol);
    let lot_size = adapter.get_int("backtest", "lot_size", i64::from(profile.lot_size));
    let lot_size = u32::try_from(lot_size)
        .map_err(|_| OptraderError::invalid("backtest", "lot_size", "lot_size must be at least 1"))?;

    let defaults = StrategyParams::default();
    let params = StrategyParams {
        fast_ma: usize_setting(adapter, "strategy", "fast_ma", defaults.fast_ma)?,
        slow_ma: usize_setting(adapter, "strategy", "slow_ma", defaults.slow_ma)?,
        rsi_period: usize_setting(adapter, "strategy", "rsi_period", defaults.rsi_period)?,
        rsi_overbought: adapter.get_double("strategy", "rsi_overbought", defaults.rsi_overbought),
        rsi_oversold: adapter.get_double("strategy", "rsi_oversold", defaults.rsi_oversold),
        breakout_lookback: usize_setting(
            adapter,
            "strategy",
            "breakout_lookback",
            defaults.breakout_lookback,
        )?,
    };

    let config = BacktestConfig {
        symbol,
        strategy,
        params,
        timeframe,
        period,
        starting_capital: adapter.get_double("backtest", "starting_capital", 100_000.0),
        risk_free_rate: adapter.get_double(
            "backtest",
            "risk_free_rate",
            pricing::DEFAULT_RISK_FREE_RATE,
        ),
        volatility: adapter.get_double("backtest", "volatility", pricing::DEFAULT_VOLATILITY),
        lot_size,
        strike_increment: adapter.get_double(
            "backtest",
            "strike_increment",
            profile.strike_increment,
        ),
        stop_loss_pct: adapter.get_double("strategy", "stop_loss", 0.0),
        take_profit_pct: adapter.get_double("strategy", "take_profit", 0.0),
    };
    validate_parameters(&config)?;
    Ok(config)
}

pub fn data_dir(adapter: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(adapter.get_string_or("backtest", "data_dir", DEFAULT_DATA_DIR))
}

/// Fetch the configured lookback window ending at the newest available bar
/// and convert it to the configured timeframe.
pub fn load_bars(
    data: &dyn DataPort,
    config: &BacktestConfig,
) -> Result<Vec<OhlcvBar>, OptraderError> {
    let (first, last, count) = data
        .get_data_range(&config.symbol)?
        .ok_or_else(|| OptraderError::Data {
            reason: format!("no bars available for {}", config.symbol),
        })?;
    let start = config.period.start_from(last).max(first);
    log::info!(
        "{}: {} bars on file ({} to {}), using {} from {}",
        config.symbol,
        count,
        first,
        last,
        config.period,
        start
    );

    let bars = data.fetch_bars(&config.symbol, start, last)?;
    Ok(config.timeframe.apply(bars))
}

/// Validate, load, run and write outputs. Shared by the `backtest` command
/// and tests that supply their own [`DataPort`].
pub fn run_backtest_pipeline(
    adapter: &dyn ConfigPort,
    data: &dyn DataPort,
    json_path: Option<&Path>,
    trades_csv_path: Option<&Path>,
) -> Result<BacktestResult, OptraderError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;
    let config = build_backtest_config(adapter)?;

    let bars = load_bars(data, &config)?;
    let result = run_backtest(&bars, &config)?;

    let writers: [(Option<&Path>, &dyn ResultPort); 2] = [
        (json_path, &JsonResultAdapter),
        (trades_csv_path, &TradesCsvAdapter),
    ];
    for (path, writer) in writers {
        if let Some(path) = path {
            writer.write(&result, path)?;
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(result)
}

fn run_backtest_command(
    config_path: &Path,
    overrides: &Overrides,
    json_path: Option<&Path>,
    trades_csv_path: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let file = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let adapter = OverlayConfig::new(&file, overrides);
    let data = CsvAdapter::new(data_dir(&adapter));

    match run_backtest_pipeline(&adapter, &data, json_path, trades_csv_path) {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

pub fn print_summary(result: &BacktestResult) {
    let stats = &result.statistics;
    eprintln!("\n=== {} / {} ===", result.symbol, result.strategy);
    eprintln!("Bars Processed:   {}", result.bars_processed);
    eprintln!("Starting Capital: {:.2}", result.starting_capital);
    eprintln!("Final Capital:    {:.2}", result.final_capital);
    eprintln!("Total Return:     {:.2}%", stats.total_return);
    eprintln!("Sharpe Ratio:     {:.2}", stats.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.2}%", stats.max_drawdown);
    eprintln!("Closed Trades:    {}", stats.total_trades);
    eprintln!("Win Rate:         {:.1}%", stats.win_rate);
    eprintln!("Avg Win / Loss:   {:.2} / {:.2}", stats.avg_win, stats.avg_loss);
    eprintln!("Best / Worst:     {:.2} / {:.2}", stats.best_trade, stats.worst_trade);
    match stats.profit_factor {
        Some(pf) => eprintln!("Profit Factor:    {pf:.2}"),
        None => eprintln!("Profit Factor:    inf"),
    }

    if !result.trades.is_empty() {
        eprintln!("\n=== Trades ===");
        for t in &result.trades {
            let exit = t
                .exit_price
                .map(|p| format!("{p:>10.2}"))
                .unwrap_or_else(|| format!("{:>10}", "-"));
            eprintln!(
                "{}  {:<13} {:<8} {:>9.0}  {:>10.2} {}  {:>12.2}  {:>14.2}",
                t.date,
                t.kind,
                t.side,
                t.strike,
                t.entry_price,
                exit,
                t.realized_pnl,
                t.capital_after
            );
        }
    }
}

pub fn run_price(
    spot: f64,
    strike: f64,
    days: f64,
    vol: f64,
    rate: f64,
    option_type: OptionType,
) -> ExitCode {
    if spot <= 0.0 || strike <= 0.0 || vol <= 0.0 || days < 0.0 {
        eprintln!("error: spot, strike and vol must be positive and days non-negative");
        return ExitCode::from(2);
    }
    let time = days / pricing::DAYS_PER_YEAR;
    let fair = pricing::price(spot, strike, time, rate, vol, option_type);
    let g = pricing::greeks(spot, strike, time, rate, vol, option_type);

    println!("{option_type} {strike} @ spot {spot}, {days} days, vol {vol}, rate {rate}");
    println!("price: {fair:.4}");
    println!("delta: {:.4}", g.delta);
    println!("gamma: {:.6}", g.gamma);
    println!("theta: {:.4} /day", g.theta);
    println!("vega:  {:.4} /vol pt", g.vega);
    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checked = validate_backtest_config(&adapter)
        .and_then(|()| validate_strategy_config(&adapter))
        .and_then(|()| build_backtest_config(&adapter));
    let config = match checked {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    eprintln!("  symbol:           {}", config.symbol);
    eprintln!("  strategy:         {}", config.strategy);
    eprintln!("  timeframe:        {} ({})", config.timeframe, config.period);
    eprintln!("  starting capital: {:.2}", config.starting_capital);
    eprintln!(
        "  lot size:         {} (strike step {})",
        config.lot_size, config.strike_increment
    );
    eprintln!(
        "  rate / vol:       {} / {}",
        config.risk_free_rate, config.volatility
    );
    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

/// Load bars per the config and run a fast/slow grid over them.
pub fn run_sweep_pipeline(
    adapter: &dyn ConfigPort,
    data: &dyn DataPort,
    grid: &SweepGrid,
) -> Result<Vec<SweepOutcome>, OptraderError> {
    validate_backtest_config(adapter)?;
    let mut config = build_backtest_config(adapter)?;
    if config.strategy != StrategyKind::MaCrossover {
        log::info!(
            "sweep runs {} rather than configured {}",
            StrategyKind::MaCrossover,
            config.strategy
        );
        config.strategy = StrategyKind::MaCrossover;
    }
    let bars = load_bars(data, &config)?;
    run_sweep(&bars, &config, grid)
}

fn run_sweep_command(config_path: &Path, overrides: &Overrides, fast: &str, slow: &str) -> ExitCode {
    let grid = match (parse_period_list(fast), parse_period_list(slow)) {
        (Ok(fast), Ok(slow)) => SweepGrid { fast, slow },
        (Err(reason), _) => return report(OptraderError::invalid("sweep", "fast", reason)),
        (_, Err(reason)) => return report(OptraderError::invalid("sweep", "slow", reason)),
    };
    if grid.combinations().is_empty() {
        return report(OptraderError::invalid(
            "sweep",
            "fast",
            "no fast period is below any slow period",
        ));
    }

    eprintln!("Loading config from {}", config_path.display());
    let file = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let adapter = OverlayConfig::new(&file, overrides);
    let data = CsvAdapter::new(data_dir(&adapter));

    let outcomes = match run_sweep_pipeline(&adapter, &data, &grid) {
        Ok(o) => o,
        Err(e) => return report(e),
    };

    println!(
        "{:>5} {:>5} {:>10} {:>8} {:>9} {:>8} {:>7} {:>14}",
        "fast", "slow", "return%", "sharpe", "maxdd%", "win%", "trades", "final"
    );
    for o in &outcomes {
        println!(
            "{:>5} {:>5} {:>10.2} {:>8.2} {:>9.2} {:>8.1} {:>7} {:>14.2}",
            o.fast_ma,
            o.slow_ma,
            o.total_return,
            o.sharpe_ratio,
            o.max_drawdown,
            o.win_rate,
            o.total_trades,
            o.final_capital
        );
    }
    ExitCode::SUCCESS
}
