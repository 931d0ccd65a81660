//! Email notifier over a pluggable transport.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Notifier, RouteMessage};
use crate::error::SinkError;

/// Hands a rendered message to whatever actually sends mail.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), SinkError>;
}

/// Reason reported when only [`LogTransport`] is wired in.
pub const NO_EMAIL_TRANSPORT: &str = "no email transport configured";

/// Logs the message instead of sending it. Used when no mail service is
/// wired in; the run reports email as skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), SinkError> {
        tracing::info!(to, subject, bytes = html.len(), reason = NO_EMAIL_TRANSPORT, "email not sent");
        Err(SinkError::NotConfigured(NO_EMAIL_TRANSPORT.to_owned()))
    }
}

pub struct EmailNotifier {
    transport: Arc<dyn EmailTransport>,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }
}

impl Default for EmailNotifier {
    fn default() -> Self {
        Self::new(Arc::new(LogTransport))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, recipient: &str, message: &RouteMessage) -> Result<(), SinkError> {
        let html = render_email_html(message);
        self.transport
            .send(recipient, &message.subject, &html)
            .await
    }
}

/// `<p>summary</p><p>links</p>`, with text escaped.
#[must_use]
pub fn render_email_html(message: &RouteMessage) -> String {
    let mut links = Vec::new();
    if let Some(url) = &message.sheet_url {
        links.push(format!("<a href='{}'>Open Google Sheet</a>", escape_html(url)));
    }
    if let Some(url) = &message.csv_url {
        links.push(format!("<a href='{}'>Download CSV</a>", escape_html(url)));
    }
    format!(
        "<p>{}</p><p>{}</p>",
        escape_html(&message.summary),
        links.join(" • ")
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
