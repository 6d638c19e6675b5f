use crate::error::{BumpError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the version file
pub const DEFAULT_VERSION_FILE: &str = ".version";

/// Project-local configuration file name
pub const CONFIG_FILE_NAME: &str = ".verbump.toml";

/// Complete configuration for verbump.
///
/// One typed section per plugin capability; every section is disabled by
/// default except the commit parser.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Version file for single-module mode
    #[serde(default = "default_version_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub hooks: HooksConfig,

    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

fn default_version_path() -> PathBuf {
    PathBuf::from(DEFAULT_VERSION_FILE)
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            path: default_version_path(),
            hooks: HooksConfig::default(),
            plugins: PluginsConfig::default(),
            workspace: WorkspaceConfig::default(),
        }
    }
}

/// A named shell command
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HookCommand {
    pub name: String,
    pub command: String,
}

impl HookCommand {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        HookCommand {
            name: name.into(),
            command: command.into(),
        }
    }
}

/// User-defined shell hooks, run in declaration order
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HooksConfig {
    /// Run before anything is mutated; any failure aborts the bump
    #[serde(default)]
    pub pre_release: Vec<HookCommand>,

    /// Run after the bump; failures are reported but do not undo it
    #[serde(default)]
    pub post_bump: Vec<HookCommand>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PluginsConfig {
    #[serde(default)]
    pub commit_parser: CommitParserConfig,

    #[serde(default)]
    pub tag_manager: TagManagerConfig,

    #[serde(default)]
    pub version_validator: VersionValidatorConfig,

    #[serde(default)]
    pub dependency_check: DependencyCheckConfig,

    #[serde(default)]
    pub changelog_parser: ChangelogParserConfig,

    #[serde(default)]
    pub changelog_generator: ChangelogGeneratorConfig,

    #[serde(default)]
    pub audit_log: AuditLogConfig,

    #[serde(default)]
    pub release_gate: ReleaseGateConfig,
}

/// Returns the default list of breaking change indicators.
fn default_breaking_change_indicators() -> Vec<String> {
    vec![
        "BREAKING CHANGE".to_string(),
        "BREAKING-CHANGE".to_string(),
    ]
}

/// Commit-message bump inference.
///
/// Defines the markers used to classify commits as major, minor or patch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitParserConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Substrings (case-insensitive) that mark a breaking change
    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,
}

impl Default for CommitParserConfig {
    fn default() -> Self {
        CommitParserConfig {
            enabled: true,
            breaking_change_indicators: default_breaking_change_indicators(),
        }
    }
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

/// Tag availability checks and tag creation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagManagerConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Create the tag after a successful bump
    #[serde(default = "default_true")]
    pub auto_create: bool,

    #[serde(default = "default_tag_prefix")]
    pub prefix: String,

    /// Annotated instead of lightweight tags
    #[serde(default = "default_true")]
    pub annotate: bool,

    /// Push the created tag to the remote
    #[serde(default)]
    pub push: bool,
}

impl Default for TagManagerConfig {
    fn default() -> Self {
        TagManagerConfig {
            enabled: false,
            auto_create: true,
            prefix: default_tag_prefix(),
            annotate: true,
            push: false,
        }
    }
}

/// Policy rules checked before the version is written
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct VersionValidatorConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}

/// One version-policy rule
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ValidationRule {
    /// Reject major versions above `value`
    MajorVersionMax { value: u64 },
    /// Reject minor versions above `value`
    MinorVersionMax { value: u64 },
    /// Reject patch versions above `value`
    PatchVersionMax { value: u64 },
    /// Pre-release labels must match `pattern`
    PreReleaseFormat { pattern: String },
    /// 0.x versions must carry a pre-release label
    #[serde(rename = "require-pre-release-for-0x")]
    RequirePreReleaseFor0x,
    /// The new version must not sort below the previous one
    NoDowngrade,
    /// On branches matching `branch`, only `allowed` bump types pass
    BranchConstraint { branch: String, allowed: Vec<String> },
}

/// Version string synchronization into other files
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DependencyCheckConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Rewrite files after a bump; otherwise only report drift
    #[serde(default = "default_true")]
    pub auto_sync: bool,

    #[serde(default)]
    pub files: Vec<SyncFile>,
}

impl Default for DependencyCheckConfig {
    fn default() -> Self {
        DependencyCheckConfig {
            enabled: false,
            auto_sync: true,
            files: Vec::new(),
        }
    }
}

/// A file that carries a copy of the version
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SyncFile {
    pub path: PathBuf,

    pub format: SyncFormat,

    /// Dot path for json / yaml / toml, e.g. `package.version`
    #[serde(default)]
    pub field: Option<String>,

    /// Regex whose first capture group holds the version (regex format)
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncFormat {
    Json,
    Yaml,
    Toml,
    Raw,
    Regex,
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

/// Bump inference from the `Unreleased` section of a changelog
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogParserConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_changelog_path")]
    pub path: PathBuf,
}

impl Default for ChangelogParserConfig {
    fn default() -> Self {
        ChangelogParserConfig {
            enabled: false,
            path: default_changelog_path(),
        }
    }
}

/// Changelog section generation from commits
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogGeneratorConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_changelog_path")]
    pub path: PathBuf,
}

impl Default for ChangelogGeneratorConfig {
    fn default() -> Self {
        ChangelogGeneratorConfig {
            enabled: false,
            path: default_changelog_path(),
        }
    }
}

fn default_audit_path() -> PathBuf {
    PathBuf::from(".version-history.json")
}

/// Version history file
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AuditLogConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_audit_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: AuditFormat,

    #[serde(default = "default_true")]
    pub include_author: bool,

    #[serde(default = "default_true")]
    pub include_commit_sha: bool,

    #[serde(default = "default_true")]
    pub include_branch: bool,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        AuditLogConfig {
            enabled: false,
            path: default_audit_path(),
            format: AuditFormat::Json,
            include_author: true,
            include_commit_sha: true,
            include_branch: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditFormat {
    #[default]
    Json,
    Yaml,
}

/// Release preconditions on the repository state
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ReleaseGateConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Branch patterns a bump may run on; empty allows all
    #[serde(default)]
    pub allowed_branches: Vec<String>,

    #[serde(default)]
    pub blocked_branches: Vec<String>,

    /// Refuse to release while WIP / fixup commits are pending
    #[serde(default)]
    pub block_wip_commits: bool,
}

/// Multi-module settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub fail_fast: bool,

    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ModuleConfig {
    pub name: String,
    pub path: PathBuf,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| BumpError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(BumpError::config("version file path must not be empty"));
        }

        for hook in self.hooks.pre_release.iter().chain(&self.hooks.post_bump) {
            if hook.command.trim().is_empty() {
                return Err(BumpError::config(format!(
                    "hook '{}' has an empty command",
                    hook.name
                )));
            }
        }

        for rule in &self.plugins.version_validator.rules {
            match rule {
                ValidationRule::PreReleaseFormat { pattern } => {
                    Regex::new(pattern).map_err(|e| {
                        BumpError::config(format!("invalid pre-release pattern '{}': {}", pattern, e))
                    })?;
                }
                ValidationRule::BranchConstraint { allowed, .. } => {
                    for bump in allowed {
                        if !matches!(bump.as_str(), "patch" | "minor" | "major" | "release" | "pre") {
                            return Err(BumpError::config(format!(
                                "unknown bump type '{}' in branch constraint",
                                bump
                            )));
                        }
                    }
                }
                _ => {}
            }
        }

        for file in &self.plugins.dependency_check.files {
            match file.format {
                SyncFormat::Json | SyncFormat::Yaml | SyncFormat::Toml if file.field.is_none() => {
                    return Err(BumpError::config(format!(
                        "{} needs a 'field' for its format",
                        file.path.display()
                    )));
                }
                SyncFormat::Regex => {
                    let pattern = file.pattern.as_deref().ok_or_else(|| {
                        BumpError::config(format!("{} needs a 'pattern'", file.path.display()))
                    })?;
                    let re = Regex::new(pattern).map_err(|e| {
                        BumpError::config(format!("invalid pattern '{}': {}", pattern, e))
                    })?;
                    if re.captures_len() < 2 {
                        return Err(BumpError::config(format!(
                            "pattern '{}' needs a capture group",
                            pattern
                        )));
                    }
                }
                _ => {}
            }
        }

        let mut names = HashSet::new();
        for module in &self.workspace.modules {
            if !names.insert(module.name.as_str()) {
                return Err(BumpError::config(format!(
                    "duplicate workspace module '{}'",
                    module.name
                )));
            }
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.verbump.toml` in current directory
/// 3. `verbump/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join("verbump").join("config.toml");
        if candidate.exists() {
            candidate
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    tracing::debug!(path = %path.display(), "loading configuration");
    let text = fs::read_to_string(&path).map_err(|e| BumpError::io(&path, e))?;
    Config::from_toml(&text)
}
