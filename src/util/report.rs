use crate::models::host::HostStatus;
use crate::util::render;
use chrono::{DateTime, Local};

const TIMEFORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One rendered report line (or block) with its console severity.
#[derive(Debug, Clone)]
pub struct ReportLine {
    pub warn: bool,
    pub text: String,
}

/// Final counts for the run, computed after all hosts are evaluated.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub hosts: usize,
    pub warnings: usize,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

impl RunSummary {
    pub fn new(statuses: &[HostStatus], started: DateTime<Local>, finished: DateTime<Local>) -> Self {
        Self {
            hosts: statuses.len(),
            warnings: statuses.iter().filter(|s| s.warn()).count(),
            started,
            finished,
        }
    }

    pub fn line(&self) -> String {
        format!("{} hosts checked, {} warning(s)", self.hosts, self.warnings)
    }
}

/// Impose the contractual report order: customers lexicographic, hosts
/// lexicographic within each customer, regardless of filesystem order.
pub fn sort_statuses(statuses: &mut [HostStatus]) {
    statuses.sort_by(|a, b| {
        a.customer
            .cmp(&b.customer)
            .then_with(|| a.hostname.cmp(&b.hostname))
    });
}

/// Render the full (already sorted) collection. CSV mode emits the header
/// line first; text mode emits one block per host.
pub fn generate(statuses: &[HostStatus], csv: bool) -> Vec<ReportLine> {
    let mut lines = Vec::with_capacity(statuses.len() + 1);
    if csv {
        // The header inherits the run's worst severity so warn-only output
        // still leads with it when any row follows.
        let any_warn = statuses.iter().any(HostStatus::warn);
        lines.push(ReportLine { warn: any_warn, text: render::csv_header() });
        for h in statuses {
            lines.push(ReportLine { warn: h.warn(), text: render::csv_row(h) });
        }
    } else {
        for h in statuses {
            lines.push(ReportLine { warn: h.warn(), text: render::text_block(h) });
        }
    }
    lines
}

/// Warn-only runs with nothing to warn about send no email at all.
pub fn should_email(summary: &RunSummary, warn_only: bool) -> bool {
    summary.warnings > 0 || !warn_only
}

pub fn email_subject(instance: &str, summary: &RunSummary) -> String {
    let notice = if summary.warnings > 0 { " (WARNING ALERT)" } else { "" };
    let verdict = if summary.warnings > 0 {
        format!("{} WARNING(S)", summary.warnings)
    } else {
        "ALL OK".to_string()
    };
    format!(
        "{}{}: {} hosts checked [{}] ({})",
        instance,
        notice,
        summary.hosts,
        verdict,
        summary.finished.format(TIMEFORMAT)
    )
}

/// Digest body: headline summary, every visible report line, then the run
/// start/end timestamps.
pub fn email_body(
    instance: &str,
    summary: &RunSummary,
    lines: &[ReportLine],
    warn_only: bool,
) -> String {
    let mut body = format!(
        "{} Report - {} of {} hosts with warnings\r\n",
        instance, summary.warnings, summary.hosts
    );
    body.push_str(&format!("Start Time: {}\r\n", summary.started.format(TIMEFORMAT)));
    body.push_str(&format!("End Time  : {}\r\n\r\n", summary.finished.format(TIMEFORMAT)));
    for line in lines.iter().filter(|l| l.warn || !warn_only) {
        body.push_str(&line.text);
        body.push_str("\r\n");
    }
    body.push_str(&format!("\r\n{}\r\n", summary.line()));
    body
}

#[cfg(test)]
mod tests {
    use super::{email_body, email_subject, generate, should_email, sort_statuses, RunSummary};
    use crate::alerts::AlertTag;
    use crate::models::host::HostStatus;
    use chrono::Local;

    fn status(customer: &str, host: &str, alerts: Vec<AlertTag>) -> HostStatus {
        HostStatus {
            customer: customer.into(),
            hostname: host.into(),
            allocated_bytes: 1 << 40,
            free_bytes: 1 << 39,
            used_bytes: 1 << 39,
            free_percent: Some(50),
            last_start: None,
            last_complete: Some(Local::now()),
            rate_limit_kbps: "0".into(),
            rate_percent: "0".into(),
            alerts,
        }
    }

    #[test]
    fn statuses_sort_by_customer_then_host() {
        let mut v = vec![
            status("zeta", "a01", vec![]),
            status("acme", "web01", vec![]),
            status("acme", "db01", vec![]),
        ];
        sort_statuses(&mut v);
        let keys: Vec<String> = v.iter().map(|s| format!("{}/{}", s.customer, s.hostname)).collect();
        assert_eq!(keys, vec!["acme/db01", "acme/web01", "zeta/a01"]);
    }

    #[test]
    fn csv_mode_leads_with_a_single_header() {
        let v = vec![status("acme", "db01", vec![]), status("acme", "web01", vec![])];
        let lines = generate(&v, true);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].text.starts_with("Customer,Hostname,"));
        assert!(!lines[0].warn);
    }

    #[test]
    fn warn_flag_follows_the_host_alerts() {
        let v = vec![
            status("acme", "db01", vec![]),
            status("acme", "web01", vec![AlertTag::Stale]),
        ];
        let lines = generate(&v, false);
        assert!(!lines[0].warn);
        assert!(lines[1].warn);
    }

    #[test]
    fn summary_counts_hosts_and_warnings() {
        let v = vec![
            status("acme", "db01", vec![]),
            status("acme", "web01", vec![AlertTag::Stale]),
            status("zeta", "a01", vec![AlertTag::FreeGb, AlertTag::Stale]),
        ];
        let now = Local::now();
        let summary = RunSummary::new(&v, now, now);
        assert_eq!(summary.hosts, 3);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.line(), "3 hosts checked, 2 warning(s)");
    }

    #[test]
    fn all_clear_warn_only_run_sends_no_email() {
        let now = Local::now();
        let clean = RunSummary::new(&[status("acme", "db01", vec![])], now, now);
        assert!(!should_email(&clean, true));
        assert!(should_email(&clean, false));

        let noisy = RunSummary::new(&[status("acme", "db01", vec![AlertTag::Stale])], now, now);
        assert!(should_email(&noisy, true));
    }

    #[test]
    fn subject_carries_severity_marker_only_when_warning() {
        let now = Local::now();
        let clean = RunSummary::new(&[status("acme", "db01", vec![])], now, now);
        let subject = email_subject("backups (srv1)", &clean);
        assert!(subject.contains("[ALL OK]"));
        assert!(!subject.contains("WARNING ALERT"));

        let noisy = RunSummary::new(&[status("acme", "db01", vec![AlertTag::Stale])], now, now);
        let subject = email_subject("backups (srv1)", &noisy);
        assert!(subject.starts_with("backups (srv1) (WARNING ALERT):"));
        assert!(subject.contains("[1 WARNING(S)]"));
    }

    #[test]
    fn warn_only_body_drops_clean_blocks() {
        let v = vec![
            status("acme", "db01", vec![]),
            status("acme", "web01", vec![AlertTag::Stale]),
        ];
        let now = Local::now();
        let summary = RunSummary::new(&v, now, now);
        let lines = generate(&v, false);

        let full = email_body("backups", &summary, &lines, false);
        assert!(full.contains("acme/db01"));
        assert!(full.contains("acme/web01"));

        let filtered = email_body("backups", &summary, &lines, true);
        assert!(!filtered.contains("acme/db01"));
        assert!(filtered.contains("acme/web01"));
        assert!(filtered.contains("Start Time:"));
        assert!(filtered.contains("2 hosts checked, 1 warning(s)"));
    }
}
