use anyhow::Result;
use chrono::{DateTime, Local};
use log::debug;
use regex::Regex;
use std::path::Path;

use crate::alerts;
use crate::collectors::{markers, space, topology};
use crate::config::Config;
use crate::models::host::HostStatus;

/// floor(100 * free / allocated), `None` when nothing is allocated.
/// Clamped so a transient free > allocated reading cannot exceed 100.
pub fn free_percent(allocated: u64, free: u64) -> Option<u8> {
    if allocated == 0 {
        return None;
    }
    let pct = (u128::from(free) * 100) / u128::from(allocated);
    Some(pct.min(100) as u8)
}

/// Walk the whole customer/host tree and evaluate every host in sequence.
/// Enumeration order is whatever the filesystem gives; the renderer sorts.
pub fn scan_fleet(
    cfg: &Config,
    pattern: &Regex,
    fast: bool,
    now: DateTime<Local>,
) -> Result<Vec<HostStatus>> {
    let mut statuses = Vec::new();
    debug!("starting processing under {}", cfg.scan.basepath.display());
    for customer in topology::list_customers(&cfg.scan.basepath, pattern, &cfg.scan.ignore_customers)? {
        debug!("processing customer {customer}");
        for host in topology::list_hosts(&cfg.scan.basepath, &customer, pattern) {
            let hostdir = cfg.scan.basepath.join(&customer).join(&host);
            debug!("checking stats for {customer}/{host}");
            statuses.push(evaluate_host(&customer, &host, &hostdir, cfg, fast, now));
        }
    }
    Ok(statuses)
}

/// Probe space and markers for one host and apply the alert rules.
/// Never fails: a host the prober cannot read reports zero allocation and
/// carries the matching alert instead of aborting the run.
fn evaluate_host(
    customer: &str,
    host: &str,
    hostdir: &Path,
    cfg: &Config,
    fast: bool,
    now: DateTime<Local>,
) -> HostStatus {
    let (allocated_bytes, free_bytes) = match space::probe(hostdir) {
        Ok(p) => (p.allocated_bytes, p.free_bytes),
        Err(err) => {
            debug!("space probe failed for {customer}/{host}: {err:#}");
            (0, 0)
        }
    };
    let used_bytes = if fast {
        allocated_bytes.saturating_sub(free_bytes)
    } else {
        space::used_bytes_by_walk(hostdir).total_bytes
    };
    let pct = free_percent(allocated_bytes, free_bytes);
    let last_start = markers::last_modified(hostdir, &cfg.scan.bwtest_file);
    let last_complete = markers::last_modified(hostdir, &cfg.scan.lastlog_file);
    let (rate_limit_kbps, rate_percent) = markers::last_rate(hostdir, &cfg.scan.lastlog_file);
    let alerts = alerts::evaluate(free_bytes, pct, last_complete, &cfg.alerts, now);

    HostStatus {
        customer: customer.to_string(),
        hostname: host.to_string(),
        allocated_bytes,
        free_bytes,
        used_bytes,
        free_percent: pct,
        last_start,
        last_complete,
        rate_limit_kbps,
        rate_percent,
        alerts,
    }
}
