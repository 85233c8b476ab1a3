// Numan Thabit 2025
use crate::payload::{AlertBatchPayload, AlertRecord};

pub const STATUS_FIRING: &str = "firing";
pub const STATUS_RESOLVED: &str = "resolved";

/// Pick the one alert to report.
///
/// The declared status wins when its batch is populated; otherwise any
/// populated batch is used, firing first. Only the first entry of a batch is
/// ever considered, and an empty record stands in when nothing is present.
pub fn select(payload: &AlertBatchPayload) -> AlertRecord {
    let firing = payload.alerts_firing.first();
    let resolved = payload.alerts_resolved.first();

    let chosen = match payload.status.as_str() {
        STATUS_FIRING if firing.is_some() => firing,
        STATUS_RESOLVED if resolved.is_some() => resolved,
        _ => firing.or(resolved),
    };
    chosen.cloned().unwrap_or_default()
}
