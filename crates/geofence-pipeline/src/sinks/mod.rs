//! Export and delivery sinks.
//!
//! Exporters ([`TableSink`]) persist a table and return a link. Notifiers
//! ([`Notifier`]) push a short route summary to a person or channel. Every
//! sink call is reported on its own in a [`DeliveryReport`]; one failing sink
//! never hides another's success.

mod email;
mod files;
mod slack;

use std::sync::Arc;

use async_trait::async_trait;
use geofence_core::{Cell, Table};
use serde::Serialize;

use crate::error::SinkError;

pub use email::{
    render_email_html, EmailNotifier, EmailTransport, LogTransport, NO_EMAIL_TRANSPORT,
};
pub use files::{to_csv_string, to_delimited_bytes, CsvWriter, SheetWriter};
pub use slack::{slack_payload, SlackNotifier};

/// Persists a table somewhere and returns a link to it.
#[async_trait]
pub trait TableSink: Send + Sync {
    async fn write(&self, title: &str, table: &Table) -> Result<String, SinkError>;
}

/// Sends a route summary to `recipient`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, message: &RouteMessage) -> Result<(), SinkError>;
}

/// What a notifier needs to describe a finished route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMessage {
    pub subject: String,
    pub summary: String,
    pub stop_count: usize,
    pub sheet_url: Option<String>,
    pub csv_url: Option<String>,
    /// Name and address of stop #1, if any.
    pub first_stop: Option<(String, String)>,
}

impl RouteMessage {
    /// Builds the message from the run summary, its table, and export links.
    #[must_use]
    pub fn new(
        summary: String,
        table: &Table,
        sheet_url: Option<String>,
        csv_url: Option<String>,
    ) -> Self {
        let stop_count = table.rows.len();
        let first_stop = table.rows.first().map(|row| {
            let text = |i: usize| row.get(i).map(Cell::to_string).unwrap_or_default();
            (text(1), text(2))
        });
        Self {
            subject: format!("Your Geofence Route ({stop_count} stops)"),
            summary,
            stop_count,
            sheet_url,
            csv_url,
            first_stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Sheet,
    Csv,
    Slack,
    Email,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Sheet => write!(f, "sheet"),
            SinkKind::Csv => write!(f, "csv"),
            SinkKind::Slack => write!(f, "slack"),
            SinkKind::Email => write!(f, "email"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Delivered {
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

/// Outcome of one sink for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sink: SinkKind,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    #[must_use]
    pub fn delivered(sink: SinkKind, link: Option<String>) -> Self {
        Self {
            sink,
            outcome: DeliveryOutcome::Delivered { link },
        }
    }

    #[must_use]
    pub fn skipped(sink: SinkKind, reason: impl Into<String>) -> Self {
        Self {
            sink,
            outcome: DeliveryOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    #[must_use]
    pub fn failed(sink: SinkKind, error: &SinkError) -> Self {
        Self {
            sink,
            outcome: DeliveryOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    /// The link, when the sink delivered one.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match &self.outcome {
            DeliveryOutcome::Delivered { link } => link.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Failed { .. })
    }
}

/// The set of sinks a planner hands finished routes to.
#[derive(Clone)]
pub struct Sinks {
    pub sheet: Arc<dyn TableSink>,
    pub csv: Arc<dyn TableSink>,
    /// `None` when no webhook is configured.
    pub slack: Option<Arc<dyn Notifier>>,
    pub email: Arc<dyn Notifier>,
}
