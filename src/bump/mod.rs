//! The bump pipeline: one version file, one requested bump

pub mod pipeline;

pub use pipeline::BumpPipeline;

use crate::domain::{BumpLabel, SemVersion};
use crate::error::{BumpError, Result};
use crate::git::{CommitHistoryProvider, RepositoryInfo, TagProvider};
use crate::hooks::CommandRunner;
use crate::warning::BumpWarning;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Requested operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
    /// Drop the pre-release label
    Release,
    /// Explicit label, inference, or the `bump_next` heuristic
    Auto,
    /// Start or advance a pre-release series
    Pre,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
            BumpKind::Release => "release",
            BumpKind::Auto => "auto",
            BumpKind::Pre => "pre",
        }
    }
}

impl FromStr for BumpKind {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(BumpKind::Patch),
            "minor" => Ok(BumpKind::Minor),
            "major" => Ok(BumpKind::Major),
            "release" => Ok(BumpKind::Release),
            "auto" => Ok(BumpKind::Auto),
            "pre" => Ok(BumpKind::Pre),
            other => Err(BumpError::InvalidBumpLabel(other.to_string())),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the caller decides about a bump
#[derive(Debug, Clone, PartialEq)]
pub struct BumpRequest {
    pub kind: BumpKind,
    /// Explicit label for [BumpKind::Auto]; skips inference
    pub label: Option<BumpLabel>,
    /// Pre-release label to attach (patch/minor/major) or base label (pre)
    pub pre_release: Option<String>,
    /// Build metadata to attach; wins over `preserve_meta`
    pub metadata: Option<String>,
    pub preserve_meta: bool,
    pub skip_hooks: bool,
    pub disable_inference: bool,
}

impl BumpRequest {
    pub fn new(kind: BumpKind) -> Self {
        BumpRequest {
            kind,
            label: None,
            pre_release: None,
            metadata: None,
            preserve_meta: false,
            skip_hooks: false,
            disable_inference: false,
        }
    }

    pub fn with_label(mut self, label: BumpLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_pre_release(mut self, pre_release: impl Into<String>) -> Self {
        self.pre_release = Some(pre_release.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn preserving_meta(mut self) -> Self {
        self.preserve_meta = true;
        self
    }

    pub fn skipping_hooks(mut self) -> Self {
        self.skip_hooks = true;
        self
    }

    pub fn without_inference(mut self) -> Self {
        self.disable_inference = true;
        self
    }
}

/// Result of a successful bump
#[derive(Debug, Clone, PartialEq)]
pub struct BumpOutcome {
    pub previous: SemVersion,
    pub new: SemVersion,
    /// Resolved bump: `patch`, `minor`, `major`, `release` or `pre`
    pub bump_type: String,
    /// Tag created for the new version
    pub tag: Option<String>,
    pub warnings: Vec<BumpWarning>,
}

impl BumpOutcome {
    pub fn has_hook_failures(&self) -> bool {
        self.warnings.iter().any(BumpWarning::is_hook_failure)
    }
}

/// Collaborators the pipeline and plugins talk to
#[derive(Clone)]
pub struct Services {
    pub commits: Arc<dyn CommitHistoryProvider>,
    pub tags: Arc<dyn TagProvider>,
    pub repo_info: Arc<dyn RepositoryInfo>,
    pub runner: Arc<dyn CommandRunner>,
}

impl Services {
    /// All three git roles served by one repository handle
    pub fn from_repository<R>(repo: Arc<R>, runner: Arc<dyn CommandRunner>) -> Self
    where
        R: CommitHistoryProvider + TagProvider + RepositoryInfo + 'static,
    {
        Services {
            commits: repo.clone(),
            tags: repo.clone(),
            repo_info: repo,
            runner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_kind_round_trip_names() {
        for kind in [
            BumpKind::Patch,
            BumpKind::Minor,
            BumpKind::Major,
            BumpKind::Release,
            BumpKind::Auto,
            BumpKind::Pre,
        ] {
            assert_eq!(kind.as_str().parse::<BumpKind>().unwrap(), kind);
        }
        assert!("huge".parse::<BumpKind>().is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = BumpRequest::new(BumpKind::Minor)
            .with_pre_release("rc.1")
            .with_metadata("ci.7")
            .skipping_hooks();
        assert_eq!(request.pre_release.as_deref(), Some("rc.1"));
        assert_eq!(request.metadata.as_deref(), Some("ci.7"));
        assert!(request.skip_hooks);
        assert!(!request.preserve_meta);
    }
}
