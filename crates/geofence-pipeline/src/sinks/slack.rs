//! Slack incoming-webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Notifier, RouteMessage};
use crate::error::SinkError;

/// Posts Block Kit messages to one webhook. The recipient is sent as the
/// `channel` field; webhooks bound to a fixed channel ignore it.
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the HTTP client cannot be built.
    pub fn new(webhook_url: &str, timeout_secs: u64) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("geofence-route/0.1")
            .build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.to_owned(),
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, recipient: &str, message: &RouteMessage) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&slack_payload(recipient, message))
            .send()
            .await
            .map_err(|e| SinkError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        tracing::info!(recipient, stops = message.stop_count, "slack notification sent");
        Ok(())
    }
}

/// Header, summary, then a fields section with stop #1 and the export links.
/// Empty fields are left out since Slack rejects blank text objects.
#[must_use]
pub fn slack_payload(recipient: &str, message: &RouteMessage) -> Value {
    let mut fields: Vec<Value> = Vec::new();
    if let Some((name, address)) = &message.first_stop {
        fields.push(mrkdwn(&format!("*1.* {name}\n{address}")));
    }
    let links = links_text(message);
    if !links.is_empty() {
        fields.push(mrkdwn(&links));
    }

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": "Geofence Route Generator" }
        }),
        json!({ "type": "section", "text": mrkdwn(&message.summary) }),
    ];
    if !fields.is_empty() {
        blocks.push(json!({ "type": "section", "fields": fields }));
    }

    json!({
        "channel": recipient,
        "text": message.summary,
        "blocks": blocks,
    })
}

fn mrkdwn(text: &str) -> Value {
    json!({ "type": "mrkdwn", "text": text })
}

fn links_text(message: &RouteMessage) -> String {
    let mut parts = Vec::new();
    if let Some(url) = &message.sheet_url {
        parts.push(format!("<{url}|Open Sheet>"));
    }
    if let Some(url) = &message.csv_url {
        parts.push(format!("<{url}|Download CSV>"));
    }
    parts.join("  •  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(first: bool, sheet: bool, csv: bool) -> RouteMessage {
        RouteMessage {
            subject: "Your Geofence Route (2 stops)".into(),
            summary: "Origin: HQ • Radius: 5 mi • Stops: 2".into(),
            stop_count: 2,
            sheet_url: sheet.then(|| "file:///x/sheet.tsv".to_owned()),
            csv_url: csv.then(|| "file:///x/route.csv".to_owned()),
            first_stop: first.then(|| ("Beta Books".to_owned(), "2 Main St".to_owned())),
        }
    }

    #[test]
    fn payload_has_header_summary_and_fields() {
        let payload = slack_payload("#field-team", &message(true, true, true));
        assert_eq!(payload["channel"], "#field-team");
        assert_eq!(payload["text"], "Origin: HQ • Radius: 5 mi • Stops: 2");

        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0]["type"], "header");
        assert_eq!(blocks[1]["text"]["text"], "Origin: HQ • Radius: 5 mi • Stops: 2");
        assert_eq!(blocks[2]["fields"][0]["text"], "*1.* Beta Books\n2 Main St");
        assert_eq!(
            blocks[2]["fields"][1]["text"],
            "<file:///x/sheet.tsv|Open Sheet>  •  <file:///x/route.csv|Download CSV>"
        );
    }

    #[test]
    fn payload_omits_empty_fields_section() {
        let payload = slack_payload("@sam", &message(false, false, false));
        assert_eq!(payload["blocks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn single_link_has_no_separator() {
        let payload = slack_payload("@sam", &message(false, false, true));
        assert_eq!(
            payload["blocks"][2]["fields"][0]["text"],
            "<file:///x/route.csv|Download CSV>"
        );
    }
}
