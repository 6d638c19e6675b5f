use crate::config::{AuditFormat, AuditLogConfig};
use crate::domain::SemVersion;
use crate::error::{BumpError, Result};
use crate::git::RepositoryInfo;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Arc, Mutex};

/// One recorded bump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub previous_version: String,
    pub new_version: String,
    pub bump_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// On-disk layout, newest entry first
#[derive(Debug, Default, Serialize, Deserialize)]
struct AuditFile {
    #[serde(default)]
    entries: Vec<AuditEntry>,
}

pub trait AuditLog: Send + Sync {
    fn name(&self) -> &str;

    fn record(&self, previous: &SemVersion, new: &SemVersion, bump_type: &str) -> Result<()>;
}

/// One instance is shared by every module task of a workspace run, so
/// `record` serializes the read-modify-write of the history file.
pub struct FileAuditLog {
    config: AuditLogConfig,
    repo: Arc<dyn RepositoryInfo>,
    write_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(config: AuditLogConfig, repo: Arc<dyn RepositoryInfo>) -> Self {
        FileAuditLog {
            config,
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Optional git details; lookup failures leave the field empty
    fn lookup(&self, enabled: bool, f: impl FnOnce() -> Result<Option<String>>) -> Option<String> {
        if !enabled {
            return None;
        }
        f().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "audit metadata unavailable");
            None
        })
    }

    fn entry(&self, previous: &SemVersion, new: &SemVersion, bump_type: &str) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            previous_version: previous.to_string(),
            new_version: new.to_string(),
            bump_type: bump_type.to_string(),
            author: self.lookup(self.config.include_author, || self.repo.author_name()),
            commit_sha: self.lookup(self.config.include_commit_sha, || self.repo.head_commit_sha()),
            branch: self.lookup(self.config.include_branch, || self.repo.current_branch()),
        }
    }

    fn load(&self) -> Result<AuditFile> {
        let path = &self.config.path;
        if !path.exists() {
            return Ok(AuditFile::default());
        }
        let text = fs::read_to_string(path).map_err(|e| BumpError::io(path, e))?;
        if text.trim().is_empty() {
            return Ok(AuditFile::default());
        }
        match self.config.format {
            AuditFormat::Json => serde_json::from_str(&text)
                .map_err(|e| BumpError::serialization(format!("{}: {}", path.display(), e))),
            AuditFormat::Yaml => serde_yaml::from_str(&text)
                .map_err(|e| BumpError::serialization(format!("{}: {}", path.display(), e))),
        }
    }

    fn store(&self, file: &AuditFile) -> Result<()> {
        let path = &self.config.path;
        let text = match self.config.format {
            AuditFormat::Json => serde_json::to_string_pretty(file)
                .map(|s| s + "\n")
                .map_err(|e| BumpError::serialization(e.to_string()))?,
            AuditFormat::Yaml => {
                serde_yaml::to_string(file).map_err(|e| BumpError::serialization(e.to_string()))?
            }
        };
        fs::write(path, text).map_err(|e| BumpError::io(path, e))
    }
}

impl AuditLog for FileAuditLog {
    fn name(&self) -> &str {
        "version-history"
    }

    fn record(&self, previous: &SemVersion, new: &SemVersion, bump_type: &str) -> Result<()> {
        let entry = self.entry(previous, new, bump_type);
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BumpError::plugin("audit log lock poisoned"))?;
        let mut file = self.load()?;
        file.entries.insert(0, entry);
        self.store(&file)?;
        tracing::debug!(path = %self.config.path.display(), entries = file.entries.len(), "audit entry recorded");
        Ok(())
    }
}
