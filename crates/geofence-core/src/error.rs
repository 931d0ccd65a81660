use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read category synonyms file {path}: {source}")]
    SynonymsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse category synonyms file: {0}")]
    SynonymsFileParse(#[source] serde_yaml::Error),

    #[error("invalid category synonyms: {0}")]
    InvalidSynonyms(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("coordinate is not finite: ({lat}, {lng})")]
    NonFiniteCoordinate { lat: f64, lng: f64 },
}
