// Numan Thabit 2025
use std::fmt;

use crate::{
    kv::KvMap,
    payload::AlertRecord,
    select::{STATUS_FIRING, STATUS_RESOLVED},
};

const FALLBACK_ALERTNAME: &str = "Unknown alert";
const FALLBACK_SUMMARY: &str = "No summary provided";
const TAG_FIRING: &str = "red_circle";
const TAG_RESOLVED: &str = "green_circle";
pub const DEFAULT_PRIORITY: &str = "default";

/// Push notification ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundNotification {
    pub title: String,
    pub body: String,
    pub priority: &'static str,
    pub markdown: bool,
    pub severity_tag: &'static str,
    pub actions: Vec<Action>,
}

impl OutboundNotification {
    /// ntfy `Actions` header value, `None` when there is nothing to attach.
    pub fn actions_header(&self) -> Option<String> {
        if self.actions.is_empty() {
            return None;
        }
        let joined = self
            .actions
            .iter()
            .map(Action::to_string)
            .collect::<Vec<_>>()
            .join(";");
        Some(joined)
    }
}

/// A ntfy `view` action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: &'static str,
    pub url: String,
    pub clear: bool,
}

impl Action {
    fn view(label: &'static str, url: &str, clear: bool) -> Self {
        Self {
            label,
            url: url.to_string(),
            clear,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view,{},{},clear={}", self.label, self.url, self.clear)
    }
}

/// Build the notification for the selected alert.
///
/// Missing labels and annotations fall back to fixed placeholders. Only an
/// exact `firing` status renders as firing, whichever batch the alert came
/// from; the title carries the raw status.
pub fn compose(
    status: &str,
    labels: &KvMap,
    annotations: &KvMap,
    alert: &AlertRecord,
) -> OutboundNotification {
    let alertname = non_empty(labels, "alertname").unwrap_or(FALLBACK_ALERTNAME);
    let summary = non_empty(annotations, "summary").unwrap_or(FALLBACK_SUMMARY);
    let is_firing = status == STATUS_FIRING;
    let state = if is_firing { STATUS_FIRING } else { STATUS_RESOLVED };

    let mut actions = Vec::with_capacity(2);
    if let Some(url) = alert.dashboard_url.as_deref() {
        actions.push(Action::view("Dashboard", url, false));
    }
    if let Some(url) = alert.silence_url.as_deref() {
        actions.push(Action::view("Silence alert", url, true));
    }

    OutboundNotification {
        title: format!("Grafana alert ({status})"),
        body: format!("{alertname} is **{state}**\n({summary})."),
        priority: DEFAULT_PRIORITY,
        markdown: true,
        severity_tag: if is_firing { TAG_FIRING } else { TAG_RESOLVED },
        actions,
    }
}

fn non_empty<'a>(map: &'a KvMap, key: &str) -> Option<&'a str> {
    map.get(key).map(String::as_str).filter(|v| !v.is_empty())
}
