//! Caller-facing request shape and its defaults.

use geofence_core::clamp_radius_miles;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Where the route table is exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Sheet,
    Csv,
    Both,
}

impl OutputTarget {
    #[must_use]
    pub fn wants_sheet(self) -> bool {
        matches!(self, OutputTarget::Sheet | OutputTarget::Both)
    }

    #[must_use]
    pub fn wants_csv(self) -> bool {
        matches!(self, OutputTarget::Csv | OutputTarget::Both)
    }
}

impl std::str::FromStr for OutputTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheet" => Ok(OutputTarget::Sheet),
            "csv" => Ok(OutputTarget::Csv),
            "both" => Ok(OutputTarget::Both),
            other => Err(format!("unknown output '{other}' (expected sheet, csv, or both)")),
        }
    }
}

/// Who gets notified once the route is ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryTarget {
    Slack,
    Email,
    /// No notification; the caller reads the links from the response.
    #[default]
    Auto,
}

impl std::str::FromStr for DeliveryTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slack" => Ok(DeliveryTarget::Slack),
            "email" => Ok(DeliveryTarget::Email),
            "auto" => Ok(DeliveryTarget::Auto),
            other => Err(format!("unknown delivery '{other}' (expected slack, email, or auto)")),
        }
    }
}

/// One route-planning run as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// `"lat,lng"` or address text.
    pub location: String,
    #[serde(default)]
    pub radius_miles: Option<f64>,
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    #[serde(default)]
    pub output: OutputTarget,
    #[serde(default)]
    pub deliver: DeliveryTarget,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub slack_recipient: Option<String>,
    /// Serve providers from fixtures instead of the live APIs.
    #[serde(default)]
    pub test_mode: bool,
}

impl PlanRequest {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Rejects input that cannot produce a run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] when the location is blank.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.location.trim().is_empty() {
            return Err(PipelineError::Validation("location is required".to_owned()));
        }
        Ok(())
    }

    /// Radius clamped to the supported range, default when absent.
    #[must_use]
    pub fn effective_radius(&self) -> f64 {
        clamp_radius_miles(self.radius_miles)
    }

    /// Exclusion terms with blanks removed.
    #[must_use]
    pub fn exclusions(&self) -> Vec<String> {
        self.excluded_categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// The Slack recipient, when Slack delivery is requested and a
    /// recipient was given.
    #[must_use]
    pub fn slack_target(&self) -> Option<&str> {
        if self.deliver != DeliveryTarget::Slack {
            return None;
        }
        non_blank(self.slack_recipient.as_deref())
    }

    /// The email address, when email delivery is requested and an address
    /// was given.
    #[must_use]
    pub fn email_target(&self) -> Option<&str> {
        if self.deliver != DeliveryTarget::Email {
            return None;
        }
        non_blank(self.email.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
