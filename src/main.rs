mod alerts;
mod collectors;
mod config;
mod models;
mod scan;
mod util;

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Parser;
use config::Config;
use log::{debug, error, info, warn, LevelFilter};
use models::host::HostStatus;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use util::{mailer, report};

#[derive(Parser, Debug)]
#[command(name = "repreport", about = "Replication fleet health reporter", version = "0.1")]
struct Cli {
    /// Use configuration from FILE instead of the default search path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Send the report as one email digest
    #[arg(short = 'm', long)]
    mail: bool,

    /// Only report hosts with active warnings; suppress the all-clear email
    #[arg(short = 'w', long)]
    warn: bool,

    /// Output the report as CSV rows
    #[arg(short = 'v', long)]
    csv: bool,

    /// Print a one-shot JSON snapshot of all host statuses and exit
    #[arg(long)]
    json: bool,

    /// Skip the per-host usage walk (used space = allocation - free)
    #[arg(long)]
    fast: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.debug);

    // Configuration problems are fatal before any scanning starts.
    let cfg = match load_and_validate(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            std::process::exit(2);
        }
    };

    // Anything else is caught here so a partial failure still reports
    // instead of crashing silently.
    if let Err(err) = run(&cli, &cfg) {
        error!("run failed: {err:?}");
        std::process::exit(1);
    }
}

fn load_and_validate(cli: &Cli) -> Result<Config> {
    let cfg = Config::load(cli.config.as_deref())?;
    cfg.compiled_dirmatch()?;
    if cli.mail {
        cfg.require_email()?;
    }
    Ok(cfg)
}

fn run(cli: &Cli, cfg: &Config) -> Result<()> {
    let started = Local::now();
    let pattern: Regex = cfg.compiled_dirmatch()?;

    let mut statuses = scan::scan_fleet(cfg, &pattern, cli.fast, started)?;
    report::sort_statuses(&mut statuses);

    if cli.json {
        return print_json(&statuses, started);
    }

    let lines = report::generate(&statuses, cli.csv);
    let summary = report::RunSummary::new(&statuses, started, Local::now());

    for line in &lines {
        if line.warn {
            warn!("{}", line.text);
        } else if !cli.warn {
            info!("{}", line.text);
        }
    }
    // The final tally always reaches the console, warn-only or not.
    info!("{}", summary.line());

    if cli.mail {
        if report::should_email(&summary, cli.warn) {
            let email = cfg.require_email()?;
            let banner = cfg.instance_banner();
            let subject = report::email_subject(&banner, &summary);
            let body = report::email_body(&banner, &summary, &lines, cli.warn);
            mailer::send_digest(email, &subject, &body)?;
            info!("report emailed to {}", email.recipients().join(", "));
        } else {
            debug!("all clear and warn-only set; email suppressed");
        }
    }
    Ok(())
}

fn print_json(statuses: &[HostStatus], started: DateTime<Local>) -> Result<()> {
    let snapshot = serde_json::json!({
        "repreport_version": "0.1",
        "timestamp": started.to_rfc3339(),
        "hosts": statuses,
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn init_logger(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}
