use geofence_core::{ConfigError, CoreError};
use geofence_places::PlacesError;
use thiserror::Error;

/// Run-level failures. Each variant is one class of the error taxonomy the
/// HTTP layer turns into a status code.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing backend or configuration. Fatal to the run, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed caller input, rejected before any provider call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Places or directions failed; the stage produced nothing.
    #[error("provider error: {0}")]
    Provider(#[from] PlacesError),
}

impl PipelineError {
    /// Stable machine-readable code for API envelopes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "configuration_error",
            PipelineError::Validation(_) => "validation_error",
            PipelineError::Provider(_) => "provider_error",
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        PipelineError::Validation(err.to_string())
    }
}

/// Failure of a single delivery or export sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    /// The sink has no backend wired in. Reported as skipped, not failed.
    #[error("{0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(
            PipelineError::Configuration("x".into()).code(),
            "configuration_error"
        );
        assert_eq!(
            PipelineError::Validation("x".into()).code(),
            "validation_error"
        );
        assert_eq!(
            PipelineError::Provider(PlacesError::Fixture("x".into())).code(),
            "provider_error"
        );
    }

    #[test]
    fn non_finite_coordinate_is_a_validation_error() {
        let err: PipelineError = CoreError::NonFiniteCoordinate {
            lat: f64::NAN,
            lng: 0.0,
        }
        .into();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
