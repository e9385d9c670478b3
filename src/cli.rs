use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use crossterm::style::{style, Color, Stylize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::core;
use crate::core::alert::{compose_alert, Alert};
use crate::core::batch::read_log_lines;
use crate::core::classify::{Bucket, BucketPolicy};
use crate::core::error::MonitorError;
use crate::core::formatter::{
    format_threshold, render_report, render_report_styled, save_report,
};
use crate::core::parser::{Diagnostic, TracingSink};
use crate::core::transport::{deliver, AlertTransport, CommandTransport, DryRunTransport};

#[derive(Debug, Parser)]
#[command(name = "jobwatch", version, about = "Job duration monitor for START/END logs")]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./jobwatch.toml when present)
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the report, save it, and alert on non-OK jobs
    Report(ReportArgs),
    /// Parse and classify only, listing skipped lines
    Check(CheckArgs),
    /// Print the effective bucket thresholds
    Thresholds(ThresholdArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ThresholdArgs {
    /// Jobs longer than this many seconds are WARNING
    #[arg(long = "warning-after", value_name = "SECS")]
    pub warning_after: Option<f64>,
    /// Jobs longer than this many seconds are ERROR
    #[arg(long = "error-after", value_name = "SECS")]
    pub error_after: Option<f64>,
}

impl ThresholdArgs {
    pub fn apply(&self, base: BucketPolicy) -> Result<BucketPolicy, MonitorError> {
        BucketPolicy::new(
            self.warning_after.unwrap_or(base.warning_after_secs),
            self.error_after.unwrap_or(base.error_after_secs),
        )
    }
}

#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Job log to read
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
    /// Where to save the plain-text report
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Skip the alert step entirely
    #[arg(long = "no-alert")]
    pub no_alert: bool,
    /// Compose the alert but only log it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Job log to read
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

pub fn execute(cli: Cli) -> Result<(), MonitorError> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Report(args) => report(args, &config),
        Commands::Check(args) => check(args, &config),
        Commands::Thresholds(args) => {
            let policy = args.apply(config.thresholds)?;
            for line in describe_policy(&policy) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn report(args: ReportArgs, config: &Config) -> Result<(), MonitorError> {
    let policy = args.thresholds.apply(config.thresholds)?;
    let input = args.file.unwrap_or_else(|| config.input.path.clone());
    let output = args.output.unwrap_or_else(|| config.report.path.clone());

    let lines = read_log_lines(&input)?;
    let mut sink = TracingSink::default();
    let outcome = core::run(&lines, &policy, &mut sink);

    if std::io::stdout().is_terminal() {
        println!("{}", render_report_styled(&outcome.reports, &policy, color_header));
    } else {
        println!("{}", render_report(&outcome.reports, &policy));
    }

    save_report(&output, &render_report(&outcome.reports, &policy))?;
    println!("\nReport saved to '{}'", output.display());

    if args.no_alert || !config.alert.enabled {
        debug!("alerting disabled");
        return Ok(());
    }

    match compose_alert(&outcome.reports) {
        Some(alert) => send_alert(config, &alert, args.dry_run),
        None => {
            println!("\nNo alerts to send. All monitored jobs are within acceptable limits.")
        }
    }
    Ok(())
}

fn send_alert(config: &Config, alert: &Alert, dry_run: bool) {
    let Some(envelope) = config.envelope() else {
        warn!("alert sender/recipient not configured");
        println!("\nAlert not sent: sender and recipient are not configured.");
        return;
    };

    let transport: Box<dyn AlertTransport> = if dry_run {
        Box::new(DryRunTransport)
    } else {
        match CommandTransport::from_command_line(&config.alert.command) {
            Ok(transport) => Box::new(transport),
            Err(err) => {
                println!("\nFailed to send alert: {err}");
                return;
            }
        }
    };

    if deliver(transport.as_ref(), &envelope, alert) {
        let verb = if dry_run { "prepared (dry run)" } else { "sent" };
        println!("\nAlert '{}' {verb} for {}", alert.subject, envelope.recipient);
    } else {
        println!("\nFailed to send alert '{}' to {}", alert.subject, envelope.recipient);
    }
}

fn check(args: CheckArgs, config: &Config) -> Result<(), MonitorError> {
    let policy = args.thresholds.apply(config.thresholds)?;
    let input = args.file.unwrap_or_else(|| config.input.path.clone());

    let lines = read_log_lines(&input)?;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let outcome = core::run(&lines, &policy, &mut diagnostics);

    for diagnostic in &diagnostics {
        println!(
            "line {}: {}: {}",
            diagnostic.line_number, diagnostic.reason, diagnostic.raw
        );
    }
    println!("{}", outcome.summary.to_line());
    let orphans = outcome.summary.jobs_unreported();
    if orphans > 0 {
        println!("{orphans} job(s) have an END without a START");
    }
    Ok(())
}

pub fn describe_policy(policy: &BucketPolicy) -> Vec<String> {
    vec![
        format!(
            "{:<8} duration <= {}s ({})",
            Bucket::Ok.label(),
            policy.warning_after_secs,
            format_threshold(policy.warning_after_secs)
        ),
        format!(
            "{:<8} duration >  {}s",
            Bucket::Warning.label(),
            policy.warning_after_secs
        ),
        format!(
            "{:<8} duration >  {}s ({})",
            Bucket::Error.label(),
            policy.error_after_secs,
            format_threshold(policy.error_after_secs)
        ),
        format!("{:<8} started but never ended", Bucket::Critical.label()),
    ]
}

fn color_header(bucket: Bucket, header: &str) -> String {
    let color = match bucket {
        Bucket::Ok => Color::Green,
        Bucket::Warning => Color::Yellow,
        Bucket::Error => Color::Red,
        Bucket::Critical => Color::Magenta,
    };
    style(header).with(color).bold().to_string()
}
