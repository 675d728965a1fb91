//! CSD-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SignageError>;

/// Top-level error type for the classroom signage engine.
#[derive(Debug, Error)]
pub enum SignageError {
    #[error("[CSD-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[CSD-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[CSD-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[CSD-2001] feed failure on {feed}: {details}")]
    Feed {
        feed: &'static str,
        details: String,
    },

    #[error("[CSD-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[CSD-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[CSD-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[CSD-3101] audio playback failure: {details}")]
    Audio { details: String },

    #[error("[CSD-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SignageError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "CSD-1001",
            Self::MissingConfig { .. } => "CSD-1002",
            Self::ConfigParse { .. } => "CSD-1003",
            Self::Feed { .. } => "CSD-2001",
            Self::Serialization { .. } => "CSD-2101",
            Self::Io { .. } => "CSD-3002",
            Self::ChannelClosed { .. } => "CSD-3003",
            Self::Audio { .. } => "CSD-3101",
            Self::Runtime { .. } => "CSD-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Feed { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Audio { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for SignageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SignageError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_errors() -> Vec<SignageError> {
        vec![
            SignageError::InvalidConfig {
                details: String::new(),
            },
            SignageError::MissingConfig {
                path: PathBuf::new(),
            },
            SignageError::ConfigParse {
                context: "",
                details: String::new(),
            },
            SignageError::Feed {
                feed: "settings",
                details: String::new(),
            },
            SignageError::Serialization {
                context: "",
                details: String::new(),
            },
            SignageError::Io {
                path: PathBuf::new(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "test"),
            },
            SignageError::ChannelClosed { component: "" },
            SignageError::Audio {
                details: String::new(),
            },
            SignageError::Runtime {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = all_errors();
        let codes: Vec<&str> = errors.iter().map(SignageError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_csd_prefix() {
        for err in &all_errors() {
            assert!(
                err.code().starts_with("CSD-"),
                "code {} must start with CSD-",
                err.code()
            );
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = SignageError::Feed {
            feed: "daily",
            details: "subscription dropped".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CSD-2001"), "display should contain code: {msg}");
        assert!(
            msg.contains("subscription dropped"),
            "display should contain details: {msg}"
        );
    }

    #[test]
    fn retryable_errors_are_correct() {
        assert!(
            SignageError::Feed {
                feed: "settings",
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            SignageError::Audio {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(SignageError::ChannelClosed { component: "engine" }.is_retryable());

        assert!(
            !SignageError::InvalidConfig {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            !SignageError::MissingConfig {
                path: PathBuf::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = SignageError::io(
            "/tmp/store/settings.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "CSD-3002");
        assert!(err.to_string().contains("/tmp/store/settings.json"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: SignageError = json_err.into();
        assert_eq!(err.code(), "CSD-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: SignageError = toml_err.into();
        assert_eq!(err.code(), "CSD-1003");
    }
}
