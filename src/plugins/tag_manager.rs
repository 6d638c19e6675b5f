use crate::config::TagManagerConfig;
use crate::domain::{SemVersion, TagPattern};
use crate::error::{BumpError, Result};
use crate::git::TagProvider;
use std::sync::Arc;

/// Tag availability checks and tag creation
pub trait TagManager: Send + Sync {
    fn name(&self) -> &str;

    fn tag_name(&self, version: &SemVersion) -> String;

    /// Fails with [BumpError::TagExists] when the tag for `version` is taken
    fn ensure_available(&self, version: &SemVersion) -> Result<()>;

    /// Whether tags are created after a bump
    fn auto_create(&self) -> bool;

    /// Create the tag for `version`, returning its name
    fn create(&self, version: &SemVersion) -> Result<String>;

    /// Whether created tags are pushed
    fn push_enabled(&self) -> bool;

    fn push(&self, tag: &str) -> Result<()>;
}

/// [TagManager] backed by a [TagProvider]
pub struct GitTagManager {
    config: TagManagerConfig,
    pattern: TagPattern,
    tags: Arc<dyn TagProvider>,
}

impl GitTagManager {
    pub fn new(config: TagManagerConfig, tags: Arc<dyn TagProvider>) -> Self {
        let pattern = TagPattern::new(config.prefix.clone());
        GitTagManager {
            config,
            pattern,
            tags,
        }
    }
}

impl TagManager for GitTagManager {
    fn name(&self) -> &str {
        "git-tags"
    }

    fn tag_name(&self, version: &SemVersion) -> String {
        self.pattern.format(version)
    }

    fn ensure_available(&self, version: &SemVersion) -> Result<()> {
        let tag = self.tag_name(version);
        if self.tags.tag_exists(&tag)? {
            return Err(BumpError::TagExists(tag));
        }
        Ok(())
    }

    fn auto_create(&self) -> bool {
        self.config.auto_create
    }

    fn create(&self, version: &SemVersion) -> Result<String> {
        let tag = self.tag_name(version);
        let message = if self.config.annotate {
            format!("Release {}", version)
        } else {
            String::new()
        };
        self.tags.create_tag(&tag, &message)?;
        tracing::info!(tag = %tag, annotated = self.config.annotate, "created tag");
        Ok(tag)
    }

    fn push_enabled(&self) -> bool {
        self.config.push
    }

    fn push(&self, tag: &str) -> Result<()> {
        self.tags.push_tag(tag)?;
        tracing::info!(tag = %tag, "pushed tag");
        Ok(())
    }
}
