// Numan Thabit 2025
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, Method};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    compose::{compose, OutboundNotification},
    dispatch::Dispatch,
    error::RelayError,
    kv,
    metrics::{RelayMetrics, OUTCOME_ACCEPTED},
    payload, select,
};

/// Stateless webhook handler: auth, method, then the alert pipeline.
#[derive(Clone)]
pub struct Relay {
    expected_authorization: String,
    dispatcher: Arc<dyn Dispatch>,
    metrics: RelayMetrics,
}

impl Relay {
    pub fn new(auth_token: &str, dispatcher: Arc<dyn Dispatch>, metrics: RelayMetrics) -> Self {
        Self {
            expected_authorization: format!("Bearer {auth_token}"),
            dispatcher,
            metrics,
        }
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Handle one inbound request. Dispatch failures are logged and counted
    /// but never turn into an error for the caller.
    pub async fn handle(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), RelayError> {
        let result = self.process(method, headers, body).await;
        match &result {
            Ok(()) => self.metrics.record_outcome(OUTCOME_ACCEPTED),
            Err(err) => {
                debug!(error = %err, "webhook rejected");
                self.metrics.record_outcome(err.outcome());
            }
        }
        result
    }

    async fn process(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), RelayError> {
        self.authorize(headers)?;
        if *method != Method::POST {
            return Err(RelayError::MethodNotAllowed(method.to_string()));
        }

        let notification = build_notification(&String::from_utf8_lossy(body))?;
        self.deliver(&notification).await;
        Ok(())
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), RelayError> {
        // Raw bytes: a UTF-8 token is not visible ASCII and would fail `to_str`.
        let provided = headers
            .get(AUTHORIZATION)
            .map(|value| value.as_bytes())
            .unwrap_or_default();
        if provided != self.expected_authorization.as_bytes() {
            return Err(RelayError::Unauthorized);
        }
        Ok(())
    }

    async fn deliver(&self, notification: &OutboundNotification) {
        let start = Instant::now();
        let result = self.dispatcher.dispatch(notification).await;
        self.metrics.record_dispatch(start.elapsed(), result.is_ok());
        match result {
            Ok(()) => info!(
                title = %notification.title,
                actions = notification.actions.len(),
                "notification dispatched"
            ),
            Err(err) => warn!(
                error = %err,
                title = %notification.title,
                "notification dispatch failed"
            ),
        }
    }
}

/// Sanitize, parse, select and compose. The only failure is invalid JSON.
pub fn build_notification(raw: &str) -> Result<OutboundNotification, RelayError> {
    let payload = payload::parse(&payload::sanitize(raw))?;
    let alert = select::select(&payload);
    let labels = kv::decode(alert.labels.as_deref());
    let annotations = kv::decode(alert.annotations.as_deref());
    Ok(compose(&payload.status, &labels, &annotations, &alert))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Action;

    struct NoopDispatcher;

    #[async_trait::async_trait]
    impl Dispatch for NoopDispatcher {
        async fn dispatch(
            &self,
            _notification: &OutboundNotification,
        ) -> Result<(), crate::error::DispatchError> {
            Ok(())
        }
    }

    fn relay(token: &str) -> Relay {
        Relay::new(
            token,
            Arc::new(NoopDispatcher),
            RelayMetrics::new().expect("metrics"),
        )
    }

    fn bearer(value: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            axum::http::HeaderValue::from_bytes(value).expect("header value"),
        );
        headers
    }

    #[test]
    fn utf8_token_matches_byte_for_byte() {
        let relay = relay("clé-secrète");
        relay
            .authorize(&bearer("Bearer clé-secrète".as_bytes()))
            .expect("identical utf-8 token");
        let err = relay
            .authorize(&bearer("Bearer cle-secrete".as_bytes()))
            .expect_err("different token");
        assert!(matches!(err, RelayError::Unauthorized));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = relay("t").authorize(&HeaderMap::new()).expect_err("no header");
        assert!(matches!(err, RelayError::Unauthorized));
    }

    #[test]
    fn grafana_firing_example() {
        let raw = r#"{"status":"firing","alerts_firing":[{"labels":"alertname=HighCPU","annotations":"summary=CPU \(hot\)","dashboard_url":"http://d"}]}"#;
        let n = build_notification(raw).expect("valid after sanitizing");
        assert_eq!(n.body, "HighCPU is **firing**\n(CPU (hot)).");
        assert_eq!(n.title, "Grafana alert (firing)");
        assert_eq!(
            n.actions,
            vec![Action {
                label: "Dashboard",
                url: "http://d".into(),
                clear: false,
            }]
        );
        assert_eq!(
            n.actions_header().as_deref(),
            Some("view,Dashboard,http://d,clear=false")
        );
    }

    #[test]
    fn empty_batches_still_produce_a_notification() {
        let n = build_notification(r#"{"status":"firing"}"#).expect("valid");
        assert_eq!(n.body, "Unknown alert is **firing**\n(No summary provided).");
        assert!(n.actions.is_empty());
    }

    #[test]
    fn fallback_alert_keeps_declared_status_for_display() {
        let raw = r#"{"status":"resolved","alerts_firing":[{"labels":"alertname=Mem"}]}"#;
        let n = build_notification(raw).expect("valid");
        assert_eq!(n.body, "Mem is **resolved**\n(No summary provided).");
        assert_eq!(n.severity_tag, "green_circle");
    }

    #[test]
    fn unknown_status_uses_resolved_batch() {
        let raw = r#"{"alerts_firing":[],"alerts_resolved":[{"labels":"alertname=Disk","annotations":"summary=ok again","silence_url":"http://s"}]}"#;
        let n = build_notification(raw).expect("valid");
        assert_eq!(n.title, "Grafana alert (unknown)");
        assert_eq!(n.body, "Disk is **resolved**\n(ok again).");
        assert_eq!(
            n.actions_header().as_deref(),
            Some("view,Silence alert,http://s,clear=true")
        );
    }

    #[test]
    fn malformed_json_is_the_only_failure() {
        let err = build_notification("{\"status\":").expect_err("truncated body");
        assert!(matches!(err, RelayError::InvalidJson(_)));
    }
}
