// Numan Thabit 2025
//! grafana-ntfy-relay: turns Grafana alert webhooks into ntfy push notifications.

/// Notification composition from a selected alert.
pub mod compose;
/// CLI, environment and TOML configuration.
pub mod config;
/// Outbound push delivery.
pub mod dispatch;
/// Request-level error taxonomy.
pub mod error;
/// HTTP surface: webhook, health and metrics routes.
pub mod http;
/// Decoder for comma separated `key=value` strings.
pub mod kv;
/// Prometheus metrics for the relay.
pub mod metrics;
/// Inbound payload repair and decoding.
pub mod payload;
/// Per-request orchestration.
pub mod relay;
/// Selection of the single alert to report.
pub mod select;

pub use compose::{compose, Action, OutboundNotification};
pub use dispatch::{Dispatch, NtfyDispatcher};
pub use error::{DispatchError, RelayError};
pub use relay::Relay;
