//! Command-line interface for the `ofa` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ofa_common::{OutputFormat, Result, SCHEMA_VERSION};
use ofa_config::{resolve_config, Config, ConfigOverrides};
use ofa_store::ProcessedStore;
use serde::Serialize;
use tracing::{debug, error};

use crate::abtest::{analyze, ExperimentDesign};
use crate::etl::run_etl;
use crate::exit_codes::ExitCode;
use crate::export::export_tables;
use crate::filter::OrderFilter;
use crate::master::MasterTable;
use crate::report::MetricsReport;

#[derive(Parser, Debug)]
#[command(name = "ofa", version, about = "Order funnel analytics: ETL and metrics")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Config file (TOML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the raw CSV exports
    #[arg(long, global = true, value_name = "DIR")]
    pub raw_dir: Option<PathBuf>,

    /// Directory for the processed Parquet tables
    #[arg(long, global = true, value_name = "DIR")]
    pub processed_dir: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the processed tables from the raw CSV exports
    Etl,
    /// Compute funnel, weekly, geo, cohort, SLA and payment metrics
    Metrics(MetricsArgs),
    /// Mock A/B readout over delivered-order conversion
    Abtest,
    /// Export the master table and tabular metrics as CSV
    Export {
        /// Destination directory
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,
    },
    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MetricsArgs {
    /// First purchase week to include (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last purchase week to include (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Customer state to include; repeatable
    #[arg(long = "state", value_name = "STATE")]
    pub states: Vec<String>,

    /// Number of locations in the geo ranking
    #[arg(long)]
    pub top_geo: Option<usize>,

    /// Number of categories in the category ranking
    #[arg(long)]
    pub top_categories: Option<usize>,
}

impl MetricsArgs {
    pub fn filter(&self) -> OrderFilter {
        OrderFilter {
            week_from: self.from,
            week_to: self.to,
            states: self.states.iter().cloned().collect(),
        }
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let (top_geo, top_categories) = match &self.command {
            Commands::Metrics(args) => (args.top_geo, args.top_categories),
            _ => (None, None),
        };
        ConfigOverrides {
            config_path: self.global.config.clone(),
            raw_dir: self.global.raw_dir.clone(),
            processed_dir: self.global.processed_dir.clone(),
            top_geo,
            top_categories,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    schema_version: &'a str,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: u32,
    message: String,
}

/// Run a parsed command line and report the outcome as an exit code.
pub fn run(cli: &Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            error!(code = err.code(), "{err}");
            if cli.global.format == OutputFormat::Json {
                let body = ErrorBody {
                    schema_version: SCHEMA_VERSION,
                    error: ErrorDetail {
                        code: err.code(),
                        message: err.to_string(),
                    },
                };
                if let Ok(json) = serde_json::to_string_pretty(&body) {
                    println!("{json}");
                }
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::from_error(&err)
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let config = resolve_config(&cli.overrides())?;
    debug!(
        raw_dir = %config.paths.raw_dir.display(),
        processed_dir = %config.paths.processed_dir.display(),
        "configuration resolved"
    );
    let format = cli.global.format;

    match &cli.command {
        Commands::Etl => {
            let summary = run_etl(&config)?;
            emit(format, &summary, || summary.render_summary())
        }
        Commands::Metrics(args) => {
            let (table, store) = load_master(&config)?;
            let report = MetricsReport::build(&table, &store, &args.filter(), &config.metrics)?;
            emit(format, &report, || report.render_summary())
        }
        Commands::Abtest => {
            let (table, _) = load_master(&config)?;
            let report = analyze(table.rows(), &ExperimentDesign::default());
            emit(format, &report, || render_abtest(&report))
        }
        Commands::Export { out_dir } => {
            let (table, _) = load_master(&config)?;
            let paths = export_tables(&table, out_dir)?;
            emit(format, &paths, || {
                paths
                    .iter()
                    .map(|p| format!("wrote {}", p.display()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::Config => emit(format, &config, || render_config(&config)),
    }
}

fn load_master(config: &Config) -> Result<(MasterTable, ProcessedStore)> {
    let store = ProcessedStore::new(config.paths.processed_dir.clone());
    let rows = store.read_orders_master()?;
    Ok((MasterTable::from_rows(rows), store))
}

fn emit<T, F>(format: OutputFormat, value: &T, summary: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Summary => println!("{}", summary()),
    }
    Ok(())
}

fn render_abtest(report: &crate::abtest::AbTestReport) -> String {
    let mut lines = vec![
        "Assignment: 50/50 by hashing order_id; conversion = delivered to customer".to_string(),
    ];
    for v in [&report.a, &report.b] {
        lines.push(format!(
            "  {}: {}/{} = {:.2}%",
            v.variant,
            v.conversions,
            v.n,
            v.rate * 100.0
        ));
    }
    lines.push(format!("  uplift: {:.2}%", report.uplift * 100.0));
    lines.push(format!(
        "  one-sided z-test (B > A): z = {:.4}, p = {:.4} ({} at alpha {})",
        report.z_statistic,
        report.p_value,
        if report.is_significant() {
            "significant"
        } else {
            "not significant"
        },
        report.design.alpha
    ));
    let required = report
        .power
        .required_n_per_group
        .map_or_else(|| "n/a".to_string(), |n| n.to_string());
    lines.push(format!(
        "  power: baseline {:.2}%, MDE +{:.0}pp, alpha {}, power {} -> n per group {}",
        report.power.baseline * 100.0,
        report.design.mde * 100.0,
        report.design.alpha,
        report.design.power,
        required
    ));
    lines.join("\n")
}

fn render_config(config: &Config) -> String {
    format!(
        "raw_dir: {}\nprocessed_dir: {}\ntop_geo: {}\ntop_categories: {}",
        config.paths.raw_dir.display(),
        config.paths.processed_dir.display(),
        config.metrics.top_geo,
        config.metrics.top_categories
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn metrics_flags_build_a_filter() {
        let cli = Cli::parse_from([
            "ofa", "metrics", "--from", "2018-01-01", "--to", "2018-03-26", "--state", "SP", "--state", "RJ",
        ]);
        let Commands::Metrics(args) = &cli.command else {
            panic!("expected metrics");
        };
        let filter = args.filter();
        assert_eq!(filter.week_from, NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(filter.states.len(), 2);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ofa", "etl", "--format", "json", "--raw-dir", "/tmp/raw", "-vv"]);
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.overrides().raw_dir, Some(PathBuf::from("/tmp/raw")));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["ofa", "metrics", "--from", "01/02/2018"]).is_err());
    }

    #[test]
    fn abtest_summary_reports_significance() {
        let mut report = crate::abtest::analyze(&[], &crate::abtest::ExperimentDesign::default());
        assert!(render_abtest(&report).contains("(not significant at alpha 0.05)"));
        report.p_value = 0.001;
        assert!(render_abtest(&report).contains("(significant at alpha 0.05)"));
    }

    #[test]
    fn top_n_overrides_only_apply_to_metrics() {
        let cli = Cli::parse_from(["ofa", "metrics", "--top-geo", "3"]);
        assert_eq!(cli.overrides().top_geo, Some(3));
    }
}
