use crate::config::ReleaseGateConfig;
use crate::domain::branch::matches_any;
use crate::error::{BumpError, Result};
use crate::git::{CommitHistoryProvider, RepositoryInfo};
use std::sync::Arc;

/// Repository-state preconditions for releasing
pub trait ReleaseGate: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self) -> Result<()>;
}

/// Commit headers that mark unfinished work
const WIP_MARKERS: [&str; 4] = ["wip", "fixup!", "squash!", "draft"];

/// `header` is lowercase; a marker must be followed by a non-word character
fn is_wip(header: &str) -> bool {
    WIP_MARKERS.iter().any(|marker| {
        header
            .strip_prefix(marker)
            .map(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
            .unwrap_or(false)
    })
}

pub struct BranchReleaseGate {
    config: ReleaseGateConfig,
    repo: Arc<dyn RepositoryInfo>,
    commits: Arc<dyn CommitHistoryProvider>,
}

impl BranchReleaseGate {
    pub fn new(
        config: ReleaseGateConfig,
        repo: Arc<dyn RepositoryInfo>,
        commits: Arc<dyn CommitHistoryProvider>,
    ) -> Self {
        BranchReleaseGate {
            config,
            repo,
            commits,
        }
    }

    fn check_branch(&self) -> Result<()> {
        if self.config.allowed_branches.is_empty() && self.config.blocked_branches.is_empty() {
            return Ok(());
        }

        let branch = self
            .repo
            .current_branch()?
            .ok_or_else(|| BumpError::gate("cannot determine the current branch"))?;

        if matches_any(&self.config.blocked_branches, &branch) {
            return Err(BumpError::gate(format!("branch '{}' is blocked", branch)));
        }
        if !self.config.allowed_branches.is_empty()
            && !matches_any(&self.config.allowed_branches, &branch)
        {
            return Err(BumpError::gate(format!(
                "branch '{}' is not in the allowed list ({})",
                branch,
                self.config.allowed_branches.join(", ")
            )));
        }
        Ok(())
    }

    fn check_wip(&self) -> Result<()> {
        if !self.config.block_wip_commits {
            return Ok(());
        }

        for message in self.commits.commits(None, None)? {
            let header = message.lines().next().unwrap_or_default().trim().to_lowercase();
            if is_wip(&header) {
                return Err(BumpError::gate(format!("unfinished commit pending: '{}'", header)));
            }
        }
        Ok(())
    }
}

impl ReleaseGate for BranchReleaseGate {
    fn name(&self) -> &str {
        "branch-gate"
    }

    fn check(&self) -> Result<()> {
        self.check_branch()?;
        self.check_wip()
    }
}
