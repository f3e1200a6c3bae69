use crate::alerts::AlertTag;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Fully evaluated status for one replicated host.
///
/// Built once per run by the scanner, immutable afterwards; the renderer
/// never sees a partially computed record.
#[derive(Debug, Clone, Serialize)]
pub struct HostStatus {
    pub customer: String,
    pub hostname: String,
    pub allocated_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
    /// floor(100 * free / allocated); `None` when the allocation is zero.
    pub free_percent: Option<u8>,
    pub last_start: Option<DateTime<Local>>,
    pub last_complete: Option<DateTime<Local>>,
    /// Rate pair from the replication log, `"0"`/`"0"` when no line matched.
    pub rate_limit_kbps: String,
    pub rate_percent: String,
    pub alerts: Vec<AlertTag>,
}

impl HostStatus {
    pub fn warn(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Space-joined alert tags, or "OK" for a clean host.
    pub fn alert_text(&self) -> String {
        if self.alerts.is_empty() {
            "OK".to_string()
        } else {
            self.alerts
                .iter()
                .map(AlertTag::label)
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}
