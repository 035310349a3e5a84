//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_results_adapter::CsvResultsAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart::{self, SvgChartAdapter};
use crate::domain::annual::{self, Analysis, AnalysisConfig, MissingValuation, DEFAULT_ANNUAL_AMOUNT};
use crate::domain::config_validation::validate_config;
use crate::domain::error::DcaError;
use crate::domain::price::{count_adjusted_differences, date_range, monthly_records};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CHART_PATH: &str = "annual_returns.svg";

#[derive(Parser, Debug)]
#[command(
    name = "dcacompare",
    about = "Compare lump-sum and dollar-cost-averaging annual returns"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute annual returns per strategy, print them and plot them
    Analyze(AnalyzeArgs),
    /// Show the columns, size and date range of a price file
    Inspect {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        date_format: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Price CSV with at least Date and Close columns
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Dollars invested per calendar year by every strategy
    #[arg(short, long)]
    pub amount: Option<f64>,
    /// Return for years without a following-January close: zero, total_loss or skip
    #[arg(long)]
    pub missing_valuation: Option<MissingValuation>,
    /// chrono format for the Date column; guessed when omitted
    #[arg(long)]
    pub date_format: Option<String>,
    /// Where to write the SVG chart
    #[arg(long)]
    pub chart: Option<PathBuf>,
    /// Skip writing the chart
    #[arg(long)]
    pub no_chart: bool,
    /// Also write the yearly results table as CSV
    #[arg(long)]
    pub results: Option<PathBuf>,
}

/// Where the analysis output goes.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    pub chart: Option<PathBuf>,
    pub chart_width: f64,
    pub chart_height: f64,
    pub results: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Inspect {
            data,
            config,
            date_format,
        } => run_inspect(data.as_ref(), config.as_ref(), date_format.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, DcaError> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| DcaError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn resolve_data_path(
    data_override: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, DcaError> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    config
        .get_string("data", "path")
        .map(|p| PathBuf::from(p.trim()))
        .ok_or_else(|| DcaError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

pub fn build_price_source(
    data_override: Option<&PathBuf>,
    date_format_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<CsvAdapter, DcaError> {
    let path = resolve_data_path(data_override, config)?;
    let date_format = date_format_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "date_format"));
    let adapter = CsvAdapter::new(path);
    Ok(match date_format {
        Some(format) => adapter.with_date_format(format),
        None => adapter,
    })
}

/// Command-line values win over the config file, which wins over defaults.
pub fn build_analysis_config(
    args: &AnalyzeArgs,
    config: &dyn ConfigPort,
) -> Result<AnalysisConfig, DcaError> {
    let annual_amount = args.amount.unwrap_or_else(|| {
        config.get_double("investment", "annual_amount", DEFAULT_ANNUAL_AMOUNT)
    });
    if !annual_amount.is_finite() || annual_amount <= 0.0 {
        return Err(DcaError::ConfigInvalid {
            section: "investment".into(),
            key: "annual_amount".into(),
            reason: "annual_amount must be positive".into(),
        });
    }

    let missing_valuation = match args.missing_valuation {
        Some(policy) => policy,
        None => match config.get_string("investment", "missing_valuation") {
            Some(raw) => raw.parse().map_err(|reason| DcaError::ConfigInvalid {
                section: "investment".into(),
                key: "missing_valuation".into(),
                reason,
            })?,
            None => MissingValuation::default(),
        },
    };

    Ok(AnalysisConfig {
        annual_amount,
        missing_valuation,
    })
}

pub fn build_output_plan(args: &AnalyzeArgs, config: &dyn ConfigPort) -> OutputPlan {
    let write_chart = !args.no_chart && config.get_bool("output", "write_chart", true);
    let chart = write_chart.then(|| {
        args.chart.clone().unwrap_or_else(|| {
            config
                .get_string("output", "chart")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_PATH))
        })
    });
    let results = args
        .results
        .clone()
        .or_else(|| config.get_string("output", "results").map(PathBuf::from));

    OutputPlan {
        chart,
        chart_width: config.get_int("chart", "width", svg_chart::DEFAULT_WIDTH as i64) as f64,
        chart_height: config.get_int("chart", "height", svg_chart::DEFAULT_HEIGHT as i64) as f64,
        results,
    }
}

fn run_analyze(args: &AnalyzeArgs) -> Result<(), DcaError> {
    let config = load_config(args.config.as_ref())?;
    let analysis_config = build_analysis_config(args, &config)?;
    let source = build_price_source(args.data.as_ref(), args.date_format.as_deref(), &config)?;
    let plan = build_output_plan(args, &config);

    info!("Reading prices from {}", source.path().display());
    let columns = source.columns()?;
    println!("Columns: {}", columns.join(", "));

    let analysis = run_analysis_pipeline(&source, &analysis_config, &plan)?;
    println!("{}", format_summary(&analysis));
    Ok(())
}

/// Loads prices, runs the calculation and writes the configured reports.
pub fn run_analysis_pipeline(
    source: &dyn PricePort,
    config: &AnalysisConfig,
    plan: &OutputPlan,
) -> Result<Analysis, DcaError> {
    let records = source.fetch_prices()?;
    info!(
        records = records.len(),
        annual_amount = config.annual_amount,
        missing_valuation = %config.missing_valuation,
        "running analysis"
    );

    let analysis = annual::analyze(&records, config)?;

    let unvalued = analysis.results.iter().filter(|r| !r.valued).count();
    if unvalued > 0 {
        warn!(
            years = unvalued,
            policy = %config.missing_valuation,
            "some years have no following-January close"
        );
    }

    if let Some(path) = &plan.chart {
        SvgChartAdapter::new(plan.chart_width, plan.chart_height).write(&analysis, path)?;
    }
    if let Some(path) = &plan.results {
        CsvResultsAdapter::new().write(&analysis, path)?;
    }

    Ok(analysis)
}

/// `Some(0.0123)` renders as `1.23%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

pub fn format_results_table(analysis: &Analysis) -> String {
    let mut out = format!(
        "{:>6} {:>18} {:>20} {:>19} {:>22} {:>21}\n",
        "Year",
        Strategy::EquallyInvested.key(),
        Strategy::AllInFirstMonth.key(),
        Strategy::AllInLastMonth.key(),
        "rel_perf_first_month",
        "rel_perf_last_month"
    );
    for r in &analysis.results {
        out.push_str(&format!(
            "{:>6} {:>18.6} {:>20.6} {:>19.6} {:>22.6} {:>21.6}{}\n",
            r.year,
            r.annual_return(Strategy::EquallyInvested),
            r.annual_return(Strategy::AllInFirstMonth),
            r.annual_return(Strategy::AllInLastMonth),
            r.rel_perf_first_month(),
            r.rel_perf_last_month(),
            if r.valued { "" } else { "  *" }
        ));
    }
    out
}

pub fn format_summary(analysis: &Analysis) -> String {
    let mut out = format!(
        "Number of differences: {}\n\n",
        analysis.adjusted_differences
    );
    out.push_str(&format_results_table(analysis));
    if analysis.results.iter().any(|r| !r.valued) {
        out.push_str(&format!(
            "* no following-January close; return set by policy '{}'\n",
            analysis.config.missing_valuation
        ));
    }
    out.push_str(&format!(
        "\nAverage Relative Performance (All in First Month): {}\n",
        format_percent(analysis.summary.avg_rel_perf_first_month)
    ));
    out.push_str(&format!(
        "Average Relative Performance (All in Last Month): {}",
        format_percent(analysis.summary.avg_rel_perf_last_month)
    ));
    out
}

fn run_inspect(
    data: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    date_format: Option<&str>,
) -> Result<(), DcaError> {
    let config = load_config(config_path)?;
    let source = build_price_source(data, date_format, &config)?;
    println!("{}", inspect_source(&source)?);
    Ok(())
}

pub fn inspect_source(source: &dyn PricePort) -> Result<String, DcaError> {
    let columns = source.columns()?;
    let records = source.fetch_prices()?;
    let monthly = monthly_records(&records);

    let mut out = format!("Columns: {}\n", columns.join(", "));
    out.push_str(&format!("Records: {}\n", records.len()));
    out.push_str(&format!("Months:  {}\n", monthly.len()));
    match date_range(&records) {
        Some((first, last)) => out.push_str(&format!("Range:   {} to {}\n", first, last)),
        None => out.push_str("Range:   no data\n"),
    }
    out.push_str(&format!(
        "Number of differences: {}",
        count_adjusted_differences(&records)
    ));
    Ok(out)
}

fn run_validate(config_path: &Path) -> Result<(), DcaError> {
    let path = config_path.to_path_buf();
    load_config(Some(&path))?;
    println!("Configuration {} is valid.", config_path.display());
    Ok(())
}
