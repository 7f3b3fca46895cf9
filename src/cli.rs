//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::catalog_csv_adapter::CatalogCsvAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::rate_limiter::{FixedDelayLimiter, ThrottledDataPort};
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::analysis::{SymbolInput, analyze_batch};
use crate::domain::config::{AnalysisConfig, DEFAULT_DENYLIST, ReturnAggregation};
use crate::domain::error::PivotError;
use crate::domain::ranking::Ranking;
use crate::domain::signal::{Signal, classify_latest};
use crate::domain::universe::{CatalogEntry, UniverseSelection, parse_symbols, select_universe};
use crate::ports::catalog_port::CatalogPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pivotscan", about = "Local price extrema detection and backtesting")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the local extrema strategy over the symbol universe
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        no_filter: bool,
        #[arg(long)]
        max_symbols: Option<usize>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report the signals printed by each symbol's most recent window
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        max_symbols: Option<usize>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
    },
    /// Print the filtered symbol universe
    Universe {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file and print the effective settings
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

/// Everything a command needs, resolved from the config file and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub analysis: AnalysisConfig,
    pub data_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub symbols: Option<Vec<String>>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub request_delay_ms: u64,
    pub max_symbols: Option<usize>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub threshold: Option<f64>,
    pub no_filter: bool,
    pub max_symbols: Option<usize>,
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Analyze {
            config,
            threshold,
            no_filter,
            max_symbols,
            format,
            output,
        } => run_analyze(
            &config,
            Overrides {
                threshold,
                no_filter,
                max_symbols,
                format,
                output,
            },
        ),
        Command::Scan {
            config,
            max_symbols,
            format,
        } => run_scan(
            &config,
            Overrides {
                max_symbols,
                format,
                ..Overrides::default()
            },
        ),
        Command::Universe { config } => run_universe(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PivotError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Parse an optional key, failing on values that are present but malformed.
fn parse_key<T>(adapter: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<T>, PivotError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    adapter
        .get_string(section, key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                PivotError::invalid_config(key, format!("[{section}] {key} = '{raw}': {e}"))
            })
        })
        .transpose()
}

fn parse_date(adapter: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, PivotError> {
    adapter
        .get_string("data", key)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                PivotError::invalid_config(key, "invalid date format (expected YYYY-MM-DD)")
            })
        })
        .transpose()
}

fn parse_format(raw: &str) -> Result<ReportFormat, PivotError> {
    match raw.trim().to_lowercase().as_str() {
        "text" => Ok(ReportFormat::Text),
        "json" => Ok(ReportFormat::Json),
        other => Err(PivotError::invalid_config(
            "format",
            format!("unknown report format '{other}' (expected text or json)"),
        )),
    }
}

/// Build and validate the core configuration from `[analysis]` and `[universe]`.
pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, PivotError> {
    let defaults = AnalysisConfig::default();

    let buffer_days = match parse_key::<i64>(adapter, "analysis", "buffer_days")? {
        Some(n) if n < 0 => {
            return Err(PivotError::invalid_config(
                "buffer_days",
                format!("buffer_days must not be negative, got {n}"),
            ));
        }
        Some(n) => n as usize,
        None => defaults.buffer_days,
    };

    let max_hold_days = match parse_key::<i64>(adapter, "analysis", "max_hold_days")? {
        Some(n) if n < 0 => {
            return Err(PivotError::invalid_config(
                "max_hold_days",
                format!("max_hold_days must not be negative, got {n}"),
            ));
        }
        Some(0) | None => None,
        Some(n) => Some(n as usize),
    };

    let aggregation = match adapter.get_string("analysis", "aggregation") {
        Some(raw) => raw.parse::<ReturnAggregation>()?,
        None => defaults.aggregation,
    };

    let denylist_patterns = adapter
        .get_list("universe", "denylist")
        .unwrap_or_else(|| DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect());

    let config = AnalysisConfig {
        threshold: parse_key(adapter, "analysis", "threshold")?.unwrap_or(defaults.threshold),
        filtering_enabled: adapter
            .get_bool("analysis", "filtering_enabled")?
            .unwrap_or(defaults.filtering_enabled),
        buffer_days,
        max_symbol_length: parse_key(adapter, "universe", "max_symbol_length")?
            .unwrap_or(defaults.max_symbol_length),
        denylist_patterns,
        aggregation,
        max_hold_days,
    };
    config.validate()?;
    Ok(config)
}

/// Resolve the full run settings, applying `overrides` on top of the file.
pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<RunSettings, PivotError> {
    let mut analysis = build_analysis_config(adapter)?;
    if let Some(threshold) = overrides.threshold {
        analysis.threshold = threshold;
    }
    if overrides.no_filter {
        analysis.filtering_enabled = false;
    }
    analysis.validate()?;

    let data_dir = adapter
        .get_string("data", "dir")
        .map(PathBuf::from)
        .ok_or_else(|| PivotError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;

    let start_date = parse_date(adapter, "start_date")?.unwrap_or(NaiveDate::MIN);
    let end_date = parse_date(adapter, "end_date")?.unwrap_or(NaiveDate::MAX);
    if start_date > end_date {
        return Err(PivotError::invalid_config(
            "end_date",
            format!("end_date {end_date} is before start_date {start_date}"),
        ));
    }

    let symbols = match adapter.get_string("universe", "symbols") {
        Some(raw) => Some(
            parse_symbols(&raw).map_err(|e| PivotError::invalid_config("symbols", e.to_string()))?,
        ),
        None => None,
    };

    let max_symbols = match overrides.max_symbols {
        Some(n) => Some(n),
        None => parse_key(adapter, "universe", "max_symbols")?,
    };
    if max_symbols == Some(0) {
        return Err(PivotError::invalid_config(
            "max_symbols",
            "max_symbols must be at least 1 when set",
        ));
    }

    let format = match overrides.format {
        Some(f) => f,
        None => match adapter.get_string("report", "format") {
            Some(raw) => parse_format(&raw)?,
            None => ReportFormat::default(),
        },
    };

    Ok(RunSettings {
        analysis,
        data_dir,
        catalog: adapter.get_string("data", "catalog").map(PathBuf::from),
        symbols,
        start_date,
        end_date,
        request_delay_ms: parse_key(adapter, "data", "request_delay_ms")?.unwrap_or(0),
        max_symbols,
        format,
        output: overrides
            .output
            .clone()
            .or_else(|| adapter.get_string("report", "output").map(PathBuf::from)),
    })
}

/// Raw catalog rows: an explicit symbol list wins, then the catalog file,
/// then every price file in the data directory.
pub fn load_catalog(
    settings: &RunSettings,
    data_port: &dyn DataPort,
) -> Result<Vec<CatalogEntry>, PivotError> {
    if let Some(symbols) = &settings.symbols {
        return Ok(symbols.iter().map(|s| CatalogEntry::new(s.as_str(), "")).collect());
    }
    if let Some(path) = &settings.catalog {
        return CatalogCsvAdapter::new(path.clone()).load_catalog();
    }
    Ok(data_port
        .list_symbols()?
        .into_iter()
        .map(|s| CatalogEntry::new(s, ""))
        .collect())
}

/// Filter the catalog and apply the `max_symbols` cap.
pub fn resolve_universe(catalog: &[CatalogEntry], settings: &RunSettings) -> UniverseSelection {
    let analysis = &settings.analysis;
    let mut selection = select_universe(
        catalog,
        &analysis.denylist_patterns,
        analysis.max_symbol_length,
    );
    for rejected in &selection.rejected {
        tracing::debug!(symbol = %rejected.symbol, reason = ?rejected.reason, "symbol excluded");
    }
    if let Some(cap) = settings.max_symbols {
        selection.symbols.truncate(cap);
    }
    selection
}

/// Fetch every symbol in turn, then analyze and rank them in parallel.
pub fn run_pipeline(
    data_port: &dyn DataPort,
    symbols: &[String],
    settings: &RunSettings,
) -> Result<Ranking, PivotError> {
    settings.analysis.validate()?;

    let inputs: Vec<SymbolInput> = symbols
        .iter()
        .map(|symbol| {
            let series = data_port.fetch_series(symbol, settings.start_date, settings.end_date);
            SymbolInput::new(symbol.as_str(), series)
        })
        .collect();

    analyze_batch(inputs, &settings.analysis)
}

/// Latest-window signals for each symbol. Fetch failures are logged and skipped.
pub fn scan_latest(
    data_port: &dyn DataPort,
    symbols: &[String],
    settings: &RunSettings,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for symbol in symbols {
        match data_port.fetch_series(symbol, settings.start_date, settings.end_date) {
            Ok(series) => signals.extend(classify_latest(&series)),
            Err(e) => tracing::warn!(symbol = %symbol, "skipping: {e}"),
        }
    }
    signals
}

fn data_port_for(settings: &RunSettings) -> ThrottledDataPort<CsvAdapter, FixedDelayLimiter> {
    ThrottledDataPort::new(
        CsvAdapter::new(settings.data_dir.clone()),
        FixedDelayLimiter::from_millis(settings.request_delay_ms),
    )
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, PivotError> {
    match path {
        Some(p) => Ok(Box::new(io::BufWriter::new(fs::File::create(p)?))),
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn run_analyze(config_path: &Path, overrides: Overrides) -> Result<(), PivotError> {
    // Stage 1: Load and validate config
    let adapter = load_config(config_path)?;
    let settings = build_run_settings(&adapter, &overrides)?;

    // Stage 2: Resolve the universe
    let data_port = data_port_for(&settings);
    let catalog = load_catalog(&settings, &data_port)?;
    let selection = resolve_universe(&catalog, &settings);
    tracing::info!(
        catalog = catalog.len(),
        selected = selection.symbols.len(),
        rejected = selection.rejected.len(),
        "universe resolved"
    );

    // Stage 3: Fetch, analyze, rank
    let ranking = run_pipeline(&data_port, &selection.symbols, &settings)?;

    // Stage 4: Report
    let reporter: Box<dyn ReportPort> = match settings.format {
        ReportFormat::Text => Box::new(TextReportAdapter),
        ReportFormat::Json => Box::new(JsonReportAdapter::pretty()),
    };
    let mut out = open_output(settings.output.as_ref())?;
    reporter.write(&ranking, &settings.analysis, out.as_mut())?;
    out.flush()?;

    if let Some(path) = &settings.output {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_scan(config_path: &Path, overrides: Overrides) -> Result<(), PivotError> {
    let adapter = load_config(config_path)?;
    let settings = build_run_settings(&adapter, &overrides)?;

    let data_port = data_port_for(&settings);
    let catalog = load_catalog(&settings, &data_port)?;
    let selection = resolve_universe(&catalog, &settings);
    let signals = scan_latest(&data_port, &selection.symbols, &settings);

    let mut out = io::stdout().lock();
    match settings.format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &signals).map_err(|e| PivotError::Io(e.into()))?;
            writeln!(out)?;
        }
        ReportFormat::Text => {
            if signals.is_empty() {
                writeln!(out, "No signals in the latest window.")?;
            }
            for s in &signals {
                writeln!(
                    out,
                    "{:<8} {} {:<20} {:.2}",
                    s.symbol, s.date, s.kind, s.reference_value
                )?;
            }
        }
    }
    Ok(())
}

fn run_universe(config_path: &Path) -> Result<(), PivotError> {
    let adapter = load_config(config_path)?;
    let settings = build_run_settings(&adapter, &Overrides::default())?;

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let catalog = load_catalog(&settings, &data_port)?;
    let selection = resolve_universe(&catalog, &settings);

    let mut out = io::stdout().lock();
    for symbol in &selection.symbols {
        writeln!(out, "{symbol}")?;
    }
    eprintln!(
        "{} of {} symbols selected ({} rejected)",
        selection.symbols.len(),
        catalog.len(),
        selection.rejected.len()
    );
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), PivotError> {
    let adapter = load_config(config_path)?;
    let settings = build_run_settings(&adapter, &Overrides::default())?;
    let a = &settings.analysis;

    println!("Configuration is valid.");
    println!("  data dir:          {}", settings.data_dir.display());
    match &settings.catalog {
        Some(path) => println!("  catalog:           {}", path.display()),
        None => println!("  catalog:           (none)"),
    }
    println!("  date range:        {} .. {}", settings.start_date, settings.end_date);
    println!("  request delay:     {} ms", settings.request_delay_ms);
    println!("  threshold:         {}", a.threshold);
    println!("  filtering:         {}", a.filtering_enabled);
    println!("  buffer days:       {}", a.buffer_days);
    println!("  aggregation:       {}", a.aggregation);
    match a.max_hold_days {
        Some(n) => println!("  max hold days:     {n}"),
        None => println!("  max hold days:     (none)"),
    }
    println!("  max symbol length: {}", a.max_symbol_length);
    println!("  denylist:          {}", a.denylist_patterns.join(", "));
    if let Some(n) = settings.max_symbols {
        println!("  max symbols:       {n}");
    }
    println!("  report format:     {}", settings.format);
    Ok(())
}
