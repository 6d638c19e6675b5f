use std::fmt;
use std::path::PathBuf;

/// Non-fatal problems raised after the version file was written.
/// The bump stands; these are reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BumpWarning {
    /// Tag could not be created
    TagCreateFailed { tag: String, reason: String },
    /// Tag was created but could not be pushed
    TagPushFailed { tag: String, reason: String },
    AuditLogFailed { reason: String },
    DependencySyncFailed { reason: String },
    /// Tracked file does not carry the new version (sync disabled)
    DependencyDrift {
        path: PathBuf,
        found: Option<String>,
    },
    ChangelogFailed { reason: String },
    PostBumpHookFailed { hook: String, reason: String },
}

impl BumpWarning {
    /// Whether the warning comes from a user hook
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, BumpWarning::PostBumpHookFailed { .. })
    }
}

impl fmt::Display for BumpWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpWarning::TagCreateFailed { tag, reason } => {
                write!(f, "Could not create tag '{}': {}", tag, reason)
            }
            BumpWarning::TagPushFailed { tag, reason } => {
                write!(f, "Could not push tag '{}': {}", tag, reason)
            }
            BumpWarning::AuditLogFailed { reason } => {
                write!(f, "Could not record audit entry: {}", reason)
            }
            BumpWarning::DependencySyncFailed { reason } => {
                write!(f, "Could not sync dependent files: {}", reason)
            }
            BumpWarning::DependencyDrift { path, found } => match found {
                Some(found) => write!(f, "{} still carries version {}", path.display(), found),
                None => write!(f, "{} carries no version", path.display()),
            },
            BumpWarning::ChangelogFailed { reason } => {
                write!(f, "Could not update changelog: {}", reason)
            }
            BumpWarning::PostBumpHookFailed { hook, reason } => {
                write!(f, "Post-bump hook '{}' failed: {}", hook, reason)
            }
        }
    }
}
