// Numan Thabit 2025
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Url,
};
use tracing::debug;

use crate::{compose::OutboundNotification, error::DispatchError};

const PLAIN_TEXT_UTF8: &str = "text/plain; charset=utf-8";

const TITLE: HeaderName = HeaderName::from_static("title");
const PRIORITY: HeaderName = HeaderName::from_static("priority");
const MARKDOWN: HeaderName = HeaderName::from_static("markdown");
const TAGS: HeaderName = HeaderName::from_static("tags");
const ACTIONS: HeaderName = HeaderName::from_static("actions");

/// Delivers a composed notification to the push service.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, notification: &OutboundNotification) -> Result<(), DispatchError>;
}

/// Posts notifications to `{base}/{topic}` on an ntfy server.
#[derive(Clone, Debug)]
pub struct NtfyDispatcher {
    client: Client,
    endpoint: Url,
}

impl NtfyDispatcher {
    pub fn new(base: &Url, topic: &str, timeout: Option<Duration>) -> Result<Self, DispatchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: topic_endpoint(base, topic)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Dispatch for NtfyDispatcher {
    async fn dispatch(&self, notification: &OutboundNotification) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(ntfy_headers(notification)?)
            .body(notification.body.clone())
            .send()
            .await?;

        // ntfy's answer is informational only.
        debug!(status = %response.status(), endpoint = %self.endpoint, "push service responded");
        Ok(())
    }
}

fn topic_endpoint(base: &Url, topic: &str) -> Result<Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{topic}"))
}

/// Header set understood by ntfy. `Actions` is left out when empty.
pub fn ntfy_headers(notification: &OutboundNotification) -> Result<HeaderMap, DispatchError> {
    let mut headers = HeaderMap::new();
    headers.insert(TITLE, header_value("Title", &notification.title)?);
    headers.insert(PRIORITY, HeaderValue::from_static(notification.priority));
    headers.insert(
        MARKDOWN,
        HeaderValue::from_static(if notification.markdown { "yes" } else { "no" }),
    );
    headers.insert(TAGS, HeaderValue::from_static(notification.severity_tag));
    if let Some(actions) = notification.actions_header() {
        headers.insert(ACTIONS, header_value("Actions", &actions)?);
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PLAIN_TEXT_UTF8));
    Ok(headers)
}

// Raw bytes so UTF-8 text survives; control characters are still rejected.
fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, DispatchError> {
    HeaderValue::from_bytes(value.as_bytes()).map_err(|_| DispatchError::Header { name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Action;

    fn notification(actions: Vec<Action>) -> OutboundNotification {
        OutboundNotification {
            title: "Grafana alert (firing)".into(),
            body: "A is **firing**\n(s).".into(),
            priority: "default",
            markdown: true,
            severity_tag: "red_circle",
            actions,
        }
    }

    #[test]
    fn endpoint_joins_topic_onto_base() {
        let base = Url::parse("https://ntfy.sh").expect("url");
        assert_eq!(
            topic_endpoint(&base, "alerts").expect("endpoint").as_str(),
            "https://ntfy.sh/alerts"
        );
        let nested = Url::parse("http://push.local/ntfy/").expect("url");
        assert_eq!(
            topic_endpoint(&nested, "ops").expect("endpoint").as_str(),
            "http://push.local/ntfy/ops"
        );
    }

    #[test]
    fn headers_without_actions() {
        let headers = ntfy_headers(&notification(Vec::new())).expect("headers");
        assert_eq!(headers["title"], "Grafana alert (firing)");
        assert_eq!(headers["priority"], "default");
        assert_eq!(headers["markdown"], "yes");
        assert_eq!(headers["tags"], "red_circle");
        assert_eq!(headers[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert!(!headers.contains_key("actions"));
    }

    #[test]
    fn headers_with_actions() {
        let headers = ntfy_headers(&notification(vec![Action {
            label: "Dashboard",
            url: "http://d".into(),
            clear: false,
        }]))
        .expect("headers");
        assert_eq!(headers["actions"], "view,Dashboard,http://d,clear=false");
    }

    #[test]
    fn control_characters_in_title_are_rejected() {
        let mut n = notification(Vec::new());
        n.title = "Grafana alert (fir\ning)".into();
        let err = ntfy_headers(&n).expect_err("newline cannot be sent as a header");
        assert!(matches!(err, DispatchError::Header { name: "Title" }));
    }

    #[test]
    fn utf8_title_is_accepted() {
        let mut n = notification(Vec::new());
        n.title = "Grafana alert (déclenché)".into();
        let headers = ntfy_headers(&n).expect("utf-8 title");
        assert_eq!(headers["title"].as_bytes(), "Grafana alert (déclenché)".as_bytes());
    }
}
