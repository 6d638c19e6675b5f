//! Version-control abstraction layer
//!
//! The bump pipeline never talks to git directly. It consumes three narrow
//! traits:
//!
//! - [CommitHistoryProvider]: commit messages for bump inference and changelogs
//! - [TagProvider]: latest tag lookup, tag creation and push
//! - [RepositoryInfo]: branch / HEAD / author details for audit entries and
//!   branch-scoped policy rules
//!
//! [repository::Git2Repository] implements all three over `git2`;
//! [mock::MockRepository] is an in-memory implementation for tests.
//!
//! All implementors must be `Send + Sync`: a single repository handle is
//! shared by every module task in a parallel workspace run.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Number of commits read when no tag bounds the history
pub const FALLBACK_COMMIT_WINDOW: usize = 10;

/// Source of commit messages
pub trait CommitHistoryProvider: Send + Sync {
    /// Commit messages reachable from `until` but not from `since`, newest
    /// first.
    ///
    /// `since` defaults to the latest tag, or to the last
    /// [FALLBACK_COMMIT_WINDOW] commits when no tag exists. `until` defaults
    /// to HEAD.
    fn commits(&self, since: Option<&str>, until: Option<&str>) -> Result<Vec<String>>;
}

/// Tag queries and mutations
pub trait TagProvider: Send + Sync {
    /// Name of the most recent tag reachable from HEAD, if any
    fn describe_latest_tag(&self) -> Result<Option<String>>;

    /// Create a tag at HEAD. An empty message creates a lightweight tag,
    /// otherwise an annotated one.
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    fn tag_exists(&self, name: &str) -> Result<bool>;

    fn push_tag(&self, name: &str) -> Result<()>;
}

/// Repository metadata
pub trait RepositoryInfo: Send + Sync {
    fn current_branch(&self) -> Result<Option<String>>;

    fn head_commit_sha(&self) -> Result<Option<String>>;

    fn author_name(&self) -> Result<Option<String>>;
}
