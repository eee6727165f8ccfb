//! metrix-runner: headless host for the DP1GAME METRIX pipeline.
//!
//! Usage:
//!   metrix-runner --retention levels.csv --ads ads.csv --export-dir out/
//!   metrix-runner --ipc-mode
//!
//! In IPC mode one session lives for the lifetime of the process. Each
//! stdin line is a JSON request; each reply is one JSON line on stdout.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use dp1_metrix_core::{
    baseline::BaselinePolicy,
    chart::render_charts,
    command::SessionCommand,
    config::MetrixConfig,
    dates::{ReportHeader, DEFAULT_VERSION_LABEL},
    duplicates::DuplicatePolicy,
    export::{clipboard_text, write_summary_csv, write_workbook},
    pipeline::PipelineOutput,
    session::SessionState,
    summary::ManualField,
    table::RawTable,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "metrix-runner", about = "Retention and ad-exposure metrics from analytics exports")]
struct Args {
    /// Per-level retention export (LEVEL, USERS columns).
    #[arg(long, required_unless_present = "ipc_mode")]
    retention: Option<PathBuf>,

    /// Ad-impression event export (EVENT, USERS columns).
    #[arg(long, required_unless_present = "ipc_mode")]
    ads: Option<PathBuf>,

    /// Run a JSON-lines session over stdin/stdout.
    #[arg(long)]
    ipc_mode: bool,

    /// Optional JSON config file.
    #[arg(long)]
    config: Option<String>,

    #[arg(long, default_value = DEFAULT_VERSION_LABEL)]
    version_label: String,

    /// Selected date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Check date (YYYY-MM-DD). Defaults to the day after --date.
    #[arg(long)]
    check_date: Option<NaiveDate>,

    /// Replace the computed baseline users.
    #[arg(long)]
    baseline_override: Option<u64>,

    /// first_levels | max_observed | manual_only
    #[arg(long, default_value = "first_levels")]
    baseline_policy: BaselinePolicy,

    /// reject | keep_first | sum
    #[arg(long, default_value = "reject")]
    duplicates: DuplicatePolicy,

    #[arg(long)]
    day1_retention: Option<String>,

    #[arg(long)]
    day3_retention: Option<String>,

    /// Session length in seconds.
    #[arg(long)]
    session_length: Option<String>,

    /// Playtime length in seconds.
    #[arg(long)]
    playtime_length: Option<String>,

    /// Write the workbook bundle into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Write the summary alone as CSV.
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Print tab-separated summary lines for pasting.
    #[arg(long)]
    clipboard: bool,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Command { command: SessionCommand },
    Recompute,
    Export { dir: PathBuf },
    SummaryCsv,
    Clipboard,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => MetrixConfig::load(path)?,
        None => MetrixConfig::default(),
    };

    let header = ReportHeader::new(
        args.version_label.clone(),
        args.date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        args.check_date,
    );
    let mut session = SessionState::with_header(header);
    session.apply(SessionCommand::SetBaselinePolicy { policy: args.baseline_policy })?;
    session.apply(SessionCommand::SetDuplicatePolicy { policy: args.duplicates })?;
    if let Some(users) = args.baseline_override {
        session.apply(SessionCommand::SetBaselineOverride { users })?;
    }

    if args.ipc_mode {
        run_ipc_loop(&mut session, &config)?;
        session.end();
        return Ok(());
    }

    let (Some(retention_path), Some(ads_path)) = (&args.retention, &args.ads) else {
        anyhow::bail!("Please provide both --retention and --ads");
    };
    session.set_retention_table(
        RawTable::from_path(retention_path)
            .with_context(|| format!("Cannot read {}", retention_path.display()))?,
    );
    session.set_ad_event_table(
        RawTable::from_path(ads_path).with_context(|| format!("Cannot read {}", ads_path.display()))?,
    );

    let manual = [
        (ManualField::Day1Retention, &args.day1_retention),
        (ManualField::Day3Retention, &args.day3_retention),
        (ManualField::SessionLength, &args.session_length),
        (ManualField::PlaytimeLength, &args.playtime_length),
    ];
    let mut any_manual = false;
    for (field, text) in manual {
        if let Some(text) = text {
            session.apply(SessionCommand::EditManualField { field, text: text.clone() })?;
            any_manual = true;
        }
    }
    if any_manual {
        session.apply(SessionCommand::ConfirmManualMetrics)?;
    }

    let output = session
        .recompute(&config)?
        .context("Both tables are required")?;

    for line in output.status_lines() {
        println!("✅ {line}");
    }
    print_summary(&output);

    if let Some(path) = &args.summary_csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Cannot create {}", path.display()))?;
        write_summary_csv(&output.summary, file)?;
        println!("Summary CSV written to {}", path.display());
    }
    if let Some(dir) = &args.export_dir {
        export_workbook(dir, &output, &session, &config)?;
        println!("Workbook written to {}", dir.display());
    }
    if args.clipboard {
        println!();
        println!("{}", clipboard_text(&output.summary));
    }

    session.end();
    Ok(())
}

fn run_ipc_loop(session: &mut SessionState, config: &MetrixConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => Ok(serde_json::json!({ "session": session.view() })),
            IpcRequest::Command { command } => match session.apply(command) {
                Ok(()) => recompute_reply(session, config),
                Err(e) => Err(e.into()),
            },
            IpcRequest::Recompute => recompute_reply(session, config),
            IpcRequest::Export { dir } => ipc_export(session, config, &dir),
            IpcRequest::SummaryCsv => ipc_summary_csv(session, config),
            IpcRequest::Clipboard => ipc_clipboard(session, config),
        };

        let line = match reply {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Request failed: {e:#}");
                serde_json::json!({ "error": format!("{e:#}") })
            }
        };
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn recompute_reply(session: &SessionState, config: &MetrixConfig) -> Result<serde_json::Value> {
    Ok(match session.recompute(config)? {
        Some(output) => serde_json::json!({
            "session": session.view(),
            "status":  output.status_lines(),
            "output":  output,
        }),
        None => serde_json::json!({
            "session": session.view(),
            "warning": "Please upload both files to continue.",
        }),
    })
}

fn require_output(session: &SessionState, config: &MetrixConfig) -> Result<PipelineOutput> {
    session
        .recompute(config)?
        .context("Please upload both files to continue.")
}

fn ipc_export(session: &SessionState, config: &MetrixConfig, dir: &Path) -> Result<serde_json::Value> {
    let output = require_output(session, config)?;
    let manifest = export_workbook(dir, &output, session, config)?;
    Ok(serde_json::json!({ "workbook": manifest }))
}

fn ipc_summary_csv(session: &SessionState, config: &MetrixConfig) -> Result<serde_json::Value> {
    let output = require_output(session, config)?;
    let mut buf = Vec::new();
    write_summary_csv(&output.summary, &mut buf)?;
    Ok(serde_json::json!({ "csv": String::from_utf8(buf)? }))
}

fn ipc_clipboard(session: &SessionState, config: &MetrixConfig) -> Result<serde_json::Value> {
    let output = require_output(session, config)?;
    Ok(serde_json::json!({ "clipboard": clipboard_text(&output.summary) }))
}

fn export_workbook(
    dir: &Path,
    output: &PipelineOutput,
    session: &SessionState,
    config: &MetrixConfig,
) -> Result<dp1_metrix_core::export::WorkbookManifest> {
    let charts = render_charts(&output.retention, &session.header, config).context("Cannot render charts")?;
    let manifest = write_workbook(dir, output, &charts, config)
        .with_context(|| format!("Cannot write workbook to {}", dir.display()))?;
    Ok(manifest)
}

fn print_summary(output: &PipelineOutput) {
    println!("=== FINAL SUMMARY ===");
    let width = output
        .summary
        .entries
        .iter()
        .map(|e| e.metric.len())
        .max()
        .unwrap_or(0);
    for entry in &output.summary.entries {
        println!("  {:<width$}  {}", entry.metric, entry.value);
    }

    println!();
    println!("=== LEVEL PROGRESSION ===");
    if output.retention.is_empty() {
        println!("  (No levels parsed)");
    } else {
        println!("  {:>6} {:>10} {:>12} {:>8}", "Level", "Users", "Retention %", "Drop %");
        for row in &output.retention.rows {
            println!(
                "  {:>6} {:>10} {:>12.2} {:>8.2}",
                row.level, row.users, row.retention_pct, row.drop_pct
            );
        }
    }
}
