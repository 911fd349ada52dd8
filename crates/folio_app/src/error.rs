//! Error types for folio_app

use folio_core::{DomError, MarginError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating a [`FolioConfig`](crate::config::FolioConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid root margin for section `{section}`: {source}")]
    RootMargin {
        section: String,
        #[source]
        source: MarginError,
    },

    #[error("invalid value for `{field}`: {message}")]
    Value { field: String, message: String },
}

/// Errors reading site content
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while setting up a page
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

/// Result type for folio_app operations
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FolioConfig;

    #[test]
    fn test_config_errors_convert_to_folio_error() {
        let err: FolioError = FolioConfig::from_toml_str("capability = 3")
            .map(|_| ())
            .unwrap_err()
            .into();
        assert!(matches!(err, FolioError::Config(ConfigError::Parse(_))));
        assert!(err.to_string().starts_with("configuration error: invalid config TOML"));
    }

    #[test]
    fn test_content_errors_convert_to_folio_error() {
        let err: FolioError = crate::content::SiteContent::from_json("{")
            .map(|_| ())
            .unwrap_err()
            .into();
        assert!(matches!(err, FolioError::Content(ContentError::Json(_))));
    }
}
