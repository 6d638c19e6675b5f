use crate::domain::SemVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Points in the bump where user hooks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookType {
    PreRelease,
    PostBump,
}

impl HookType {
    /// Get the hook name as a string
    pub fn name(&self) -> &'static str {
        match self {
            HookType::PreRelease => "pre-release",
            HookType::PostBump => "post-bump",
        }
    }
}

/// Context information passed to a hook
#[derive(Debug, Clone)]
pub struct HookContext {
    pub hook_type: HookType,
    /// Version file being bumped
    pub version_file: PathBuf,
    pub previous_version: String,
    /// Requested operation, e.g. `auto`
    pub bump_kind: String,
    /// Only known after the bump
    pub new_version: Option<String>,
    /// Resolved bump type, e.g. `minor`; only known after the bump
    pub bump_type: Option<String>,
}

impl HookContext {
    pub fn pre_release(version_file: &Path, previous: &SemVersion, bump_kind: &str) -> Self {
        HookContext {
            hook_type: HookType::PreRelease,
            version_file: version_file.to_path_buf(),
            previous_version: previous.to_string(),
            bump_kind: bump_kind.to_string(),
            new_version: None,
            bump_type: None,
        }
    }

    pub fn post_bump(
        version_file: &Path,
        previous: &SemVersion,
        new: &SemVersion,
        bump_kind: &str,
        bump_type: &str,
    ) -> Self {
        HookContext {
            hook_type: HookType::PostBump,
            version_file: version_file.to_path_buf(),
            previous_version: previous.to_string(),
            bump_kind: bump_kind.to_string(),
            new_version: Some(new.to_string()),
            bump_type: Some(bump_type.to_string()),
        }
    }

    /// Convert context to environment variables for the hook command
    ///
    /// Maps context fields to VERBUMP_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("VERBUMP_HOOK".to_string(), self.hook_type.name().to_string());
        env.insert(
            "VERBUMP_VERSION_FILE".to_string(),
            self.version_file.display().to_string(),
        );
        env.insert(
            "VERBUMP_PREVIOUS_VERSION".to_string(),
            self.previous_version.clone(),
        );
        env.insert("VERBUMP_BUMP_KIND".to_string(), self.bump_kind.clone());

        if let Some(ref version) = self.new_version {
            env.insert("VERBUMP_NEW_VERSION".to_string(), version.clone());
        }

        if let Some(ref bump_type) = self.bump_type {
            env.insert("VERBUMP_BUMP_TYPE".to_string(), bump_type.clone());
        }

        env
    }
}
