use std::path::PathBuf;

use thiserror::Error;

use crate::plugins::Capability;

/// Unified error type for verbump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Invalid bump label: '{0}' (expected patch, minor or major)")]
    InvalidBumpLabel(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Hook '{name}' failed with exit code {code}")]
    HookFailed { name: String, code: i32 },

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("Tag '{0}' already exists")]
    TagExists(String),

    #[error("Version validation failed: {0}")]
    ValidationFailed(String),

    #[error("Release gate blocked the bump: {0}")]
    ReleaseGate(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("A {0} plugin is already registered")]
    DuplicatePlugin(Capability),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Task failed: {0}")]
    Task(String),
}

/// Convenience type alias for Results in verbump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Attach the originating path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BumpError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    pub fn hook(msg: impl Into<String>) -> Self {
        BumpError::Hook(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        BumpError::ValidationFailed(msg.into())
    }

    pub fn gate(msg: impl Into<String>) -> Self {
        BumpError::ReleaseGate(msg.into())
    }

    pub fn plugin(msg: impl Into<String>) -> Self {
        BumpError::Plugin(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        BumpError::Serialization(msg.into())
    }

    /// Whether this error is a precondition failure, i.e. the version file
    /// was guaranteed untouched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            BumpError::HookFailed { .. }
                | BumpError::Hook(_)
                | BumpError::TagExists(_)
                | BumpError::ValidationFailed(_)
                | BumpError::ReleaseGate(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BumpError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_io_error_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = BumpError::io("/tmp/.version", io_err);
        let msg = err.to_string();
        assert!(msg.contains("/tmp/.version"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_hook_failed_display() {
        let err = BumpError::HookFailed {
            name: "lint".to_string(),
            code: 3,
        };
        assert_eq!(err.to_string(), "Hook 'lint' failed with exit code 3");
    }

    #[test]
    fn test_duplicate_plugin_display() {
        let err = BumpError::DuplicatePlugin(Capability::TagManager);
        assert_eq!(err.to_string(), "A tag-manager plugin is already registered");
    }

    #[test]
    fn test_precondition_classification() {
        assert!(BumpError::TagExists("v1.0.0".to_string()).is_precondition());
        assert!(BumpError::validation("major too high").is_precondition());
        assert!(BumpError::gate("branch blocked").is_precondition());
        assert!(!BumpError::plugin("audit write").is_precondition());
        assert!(!BumpError::InvalidVersionFormat("x".to_string()).is_precondition());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (BumpError::config("x"), "Configuration error"),
            (BumpError::InvalidVersionFormat("x".into()), "Invalid version format"),
            (BumpError::TagExists("x".into()), "Tag 'x'"),
            (BumpError::plugin("x"), "Plugin error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
