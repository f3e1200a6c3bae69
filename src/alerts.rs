use crate::config::AlertThresholds;
use chrono::{DateTime, Duration, Local};

const GIB: u64 = 1 << 30;

/// One triggered alert condition on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTag {
    /// Free space at or below the configured percentage of allocation.
    FreePercent,
    /// Free space at or below the configured absolute GB floor.
    FreeGb,
    /// Last completion marker absent or older than the allowed age.
    Stale,
    /// Filesystem reported zero allocation; percent rule not applicable.
    NoAlloc,
}

impl AlertTag {
    pub fn label(&self) -> &'static str {
        match self {
            AlertTag::FreePercent => "ALERT-FREE%",
            AlertTag::FreeGb      => "ALERT-FREE-GB",
            AlertTag::Stale       => "ALERT-LATE",
            AlertTag::NoAlloc     => "ALERT-NO-ALLOC",
        }
    }
}

impl serde::Serialize for AlertTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Evaluate the three independent alert rules for one host.
///
/// The rules never short-circuit each other: a host can carry any
/// combination of tags. A `None` free percent means the allocation was
/// zero and is reported as its own tag instead of entering the
/// percentage comparison.
pub fn evaluate(
    free_bytes: u64,
    free_percent: Option<u8>,
    last_complete: Option<DateTime<Local>>,
    thr: &AlertThresholds,
    now: DateTime<Local>,
) -> Vec<AlertTag> {
    let mut alerts = Vec::new();

    match free_percent {
        Some(pct) if pct <= thr.free_percent => alerts.push(AlertTag::FreePercent),
        Some(_) => {}
        None => alerts.push(AlertTag::NoAlloc),
    }

    // Inclusive floor: landing exactly on the threshold triggers.
    if free_bytes <= thr.free_gb.saturating_mul(GIB) {
        alerts.push(AlertTag::FreeGb);
    }

    // A host that never completed is stale by definition.
    let cutoff = now - Duration::seconds(thr.stale_secs);
    match last_complete {
        Some(t) if t > cutoff => {}
        _ => alerts.push(AlertTag::Stale),
    }

    alerts
}
