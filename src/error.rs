//! Error types for packserve
//!
//! All modules use `PackserveResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for packserve operations
pub type PackserveResult<T> = Result<T, PackserveError>;

/// All errors that can occur in packserve
#[derive(Error, Debug)]
pub enum PackserveError {
    // Index errors
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    // Archive errors
    #[error("Failed to read archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("Archive has no manifest member: {0}")]
    ManifestMissing(PathBuf),

    #[error("Malformed manifest in {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    #[error("Failed to extract member {member}: {reason}")]
    Extract { member: String, reason: String },

    // Resolution errors
    #[error("No content named '{name}' in package {uid}")]
    ContentNotFound { uid: String, name: String },

    #[error("Invalid size format '{0}': expected <width>x<height>, e.g. 200x150")]
    InvalidSizeFormat(String),

    #[error("Failed to derive image {path}: {reason}")]
    ImageDerive { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl PackserveError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an archive error
    pub fn archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an extraction error
    pub fn extract(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extract {
            member: member.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the requested thing does not exist,
    /// as opposed to a failure reading something that should exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PackageNotFound(_) | Self::ContentNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PackserveError::PackageNotFound("abc123".to_string());
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn error_not_found_classification() {
        assert!(PackserveError::PackageNotFound("x".into()).is_not_found());
        assert!(PackserveError::ContentNotFound {
            uid: "x".into(),
            name: "cover".into()
        }
        .is_not_found());
        assert!(!PackserveError::InvalidSizeFormat("bad".into()).is_not_found());
    }

    #[test]
    fn io_error_keeps_context() {
        let err = PackserveError::io(
            "copying content",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(err.to_string().contains("copying content"));
    }
}
