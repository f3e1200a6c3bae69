use crate::models::host::HostStatus;
use crate::util::human::fmt_size;
use chrono::{DateTime, Local};

/// Fixed report column set, shared by CSV and text rendering.
pub const COLUMNS: [&str; 11] = [
    "Customer",
    "Hostname",
    "Allocated Bytes",
    "Free Bytes",
    "Free %",
    "Host Used Bytes",
    "Last Start Time",
    "Last Completed Time",
    "Last Rate Limit",
    "Last Rate %",
    "Alert Flags",
];

const BANNER: &str = "----------------------------------------";

/// Local-time `YYYY-MM-DD HH:MM:SS`, or the literal "never".
pub fn time_string(t: Option<DateTime<Local>>) -> String {
    match t {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    }
}

fn percent_cell(pct: Option<u8>) -> String {
    match pct {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

pub fn csv_header() -> String {
    COLUMNS.join(",")
}

/// One comma-joined row in the fixed column order, raw byte integers.
pub fn csv_row(h: &HostStatus) -> String {
    [
        h.customer.clone(),
        h.hostname.clone(),
        h.allocated_bytes.to_string(),
        h.free_bytes.to_string(),
        percent_cell(h.free_percent),
        h.used_bytes.to_string(),
        time_string(h.last_start),
        time_string(h.last_complete),
        h.rate_limit_kbps.clone(),
        h.rate_percent.clone(),
        h.alert_text(),
    ]
    .join(",")
}

/// Human-readable block for one host: banner plus labeled fields.
pub fn text_block(h: &HostStatus) -> String {
    let mut out = String::new();
    out.push_str(BANNER);
    out.push('\n');
    out.push_str(&format!("{}/{}\n", h.customer, h.hostname));
    out.push_str(&format!("  Allocated:      {}\n", fmt_size(h.allocated_bytes)));
    out.push_str(&format!(
        "  Free:           {} ({}%)\n",
        fmt_size(h.free_bytes),
        percent_cell(h.free_percent)
    ));
    out.push_str(&format!("  Host Used:      {}\n", fmt_size(h.used_bytes)));
    out.push_str(&format!("  Last Start:     {}\n", time_string(h.last_start)));
    out.push_str(&format!("  Last Complete:  {}\n", time_string(h.last_complete)));
    out.push_str(&format!(
        "  Rate Limit:     {}Kbps ({}%)\n",
        h.rate_limit_kbps, h.rate_percent
    ));
    out.push_str(&format!("  Status:         {}", h.alert_text()));
    out
}
