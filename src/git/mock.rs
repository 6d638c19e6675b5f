use crate::error::{BumpError, Result};
use crate::git::{CommitHistoryProvider, RepositoryInfo, TagProvider};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    commits: Vec<String>,
    tags: Vec<String>,
    created: Vec<(String, String)>,
    pushed: Vec<String>,
    branch: Option<String>,
    head_sha: Option<String>,
    author: Option<String>,
    fail_commits: bool,
    fail_create: bool,
    fail_push: bool,
}

/// In-memory repository for tests
///
/// Tags created through [TagProvider::create_tag] become visible to
/// [TagProvider::tag_exists] and [TagProvider::describe_latest_tag].
#[derive(Debug, Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a panicking test thread.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Commit messages returned by [CommitHistoryProvider::commits], newest first
    pub fn with_commits<I, S>(self, commits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guard().commits = commits.into_iter().map(Into::into).collect();
        self
    }

    /// Existing tags, oldest first
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guard().tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_branch(self, branch: impl Into<String>) -> Self {
        self.guard().branch = Some(branch.into());
        self
    }

    pub fn with_head_sha(self, sha: impl Into<String>) -> Self {
        self.guard().head_sha = Some(sha.into());
        self
    }

    pub fn with_author(self, author: impl Into<String>) -> Self {
        self.guard().author = Some(author.into());
        self
    }

    pub fn failing_commits(self) -> Self {
        self.guard().fail_commits = true;
        self
    }

    pub fn failing_create(self) -> Self {
        self.guard().fail_create = true;
        self
    }

    pub fn failing_push(self) -> Self {
        self.guard().fail_push = true;
        self
    }

    /// Tags created so far with their messages
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.guard().created.clone()
    }

    pub fn pushed_tags(&self) -> Vec<String> {
        self.guard().pushed.clone()
    }
}

impl CommitHistoryProvider for MockRepository {
    fn commits(&self, _since: Option<&str>, _until: Option<&str>) -> Result<Vec<String>> {
        let state = self.guard();
        if state.fail_commits {
            return Err(BumpError::Git(git2::Error::from_str("mock: cannot read history")));
        }
        Ok(state.commits.clone())
    }
}

impl TagProvider for MockRepository {
    fn describe_latest_tag(&self) -> Result<Option<String>> {
        Ok(self.guard().tags.last().cloned())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = self.guard();
        if state.fail_create {
            return Err(BumpError::Git(git2::Error::from_str("mock: cannot create tag")));
        }
        if state.tags.iter().any(|t| t == name) {
            return Err(BumpError::TagExists(name.to_string()));
        }
        state.tags.push(name.to_string());
        state.created.push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.guard().tags.iter().any(|t| t == name))
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        let mut state = self.guard();
        if state.fail_push {
            return Err(BumpError::Git(git2::Error::from_str("mock: remote rejected push")));
        }
        state.pushed.push(name.to_string());
        Ok(())
    }
}

impl RepositoryInfo for MockRepository {
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.guard().branch.clone())
    }

    fn head_commit_sha(&self) -> Result<Option<String>> {
        Ok(self.guard().head_sha.clone())
    }

    fn author_name(&self) -> Result<Option<String>> {
        Ok(self.guard().author.clone())
    }
}
