//! Capability plugins
//!
//! Each capability has at most one active plugin. The bump pipeline asks the
//! [PluginRegistry] for a capability and simply skips the stage when nothing
//! is registered.

pub mod audit;
pub mod changelog;
pub mod commit_parser;
pub mod dependency;
pub mod release_gate;
pub mod tag_manager;
pub mod validator;

pub use audit::{AuditEntry, AuditLog, FileAuditLog};
pub use changelog::{
    ChangelogGenerator, ChangelogParser, KeepAChangelogParser, MarkdownChangelogGenerator,
};
pub use commit_parser::{CommitParser, ConventionalCommitParser};
pub use dependency::{DependencyChecker, FileDependencyChecker, VersionDrift};
pub use release_gate::{BranchReleaseGate, ReleaseGate};
pub use tag_manager::{GitTagManager, TagManager};
pub use validator::{RuleValidator, VersionValidator};

use crate::bump::Services;
use crate::config::Config;
use crate::error::{BumpError, Result};
use std::fmt;
use std::sync::Arc;

/// Kinds of plugin the pipeline knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CommitParser,
    TagManager,
    VersionValidator,
    DependencyChecker,
    ChangelogParser,
    ChangelogGenerator,
    AuditLog,
    ReleaseGate,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CommitParser => "commit-parser",
            Capability::TagManager => "tag-manager",
            Capability::VersionValidator => "version-validator",
            Capability::DependencyChecker => "dependency-checker",
            Capability::ChangelogParser => "changelog-parser",
            Capability::ChangelogGenerator => "changelog-generator",
            Capability::AuditLog => "audit-log",
            Capability::ReleaseGate => "release-gate",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin instance tagged with its capability
#[derive(Clone)]
pub enum Plugin {
    CommitParser(Arc<dyn CommitParser>),
    TagManager(Arc<dyn TagManager>),
    VersionValidator(Arc<dyn VersionValidator>),
    DependencyChecker(Arc<dyn DependencyChecker>),
    ChangelogParser(Arc<dyn ChangelogParser>),
    ChangelogGenerator(Arc<dyn ChangelogGenerator>),
    AuditLog(Arc<dyn AuditLog>),
    ReleaseGate(Arc<dyn ReleaseGate>),
}

impl Plugin {
    pub fn capability(&self) -> Capability {
        match self {
            Plugin::CommitParser(_) => Capability::CommitParser,
            Plugin::TagManager(_) => Capability::TagManager,
            Plugin::VersionValidator(_) => Capability::VersionValidator,
            Plugin::DependencyChecker(_) => Capability::DependencyChecker,
            Plugin::ChangelogParser(_) => Capability::ChangelogParser,
            Plugin::ChangelogGenerator(_) => Capability::ChangelogGenerator,
            Plugin::AuditLog(_) => Capability::AuditLog,
            Plugin::ReleaseGate(_) => Capability::ReleaseGate,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Plugin::CommitParser(p) => p.name(),
            Plugin::TagManager(p) => p.name(),
            Plugin::VersionValidator(p) => p.name(),
            Plugin::DependencyChecker(p) => p.name(),
            Plugin::ChangelogParser(p) => p.name(),
            Plugin::ChangelogGenerator(p) => p.name(),
            Plugin::AuditLog(p) => p.name(),
            Plugin::ReleaseGate(p) => p.name(),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("capability", &self.capability())
            .field("name", &self.name())
            .finish()
    }
}

/// One slot per capability; the first registration wins
#[derive(Default, Clone)]
pub struct PluginRegistry {
    commit_parser: Option<Arc<dyn CommitParser>>,
    tag_manager: Option<Arc<dyn TagManager>>,
    version_validator: Option<Arc<dyn VersionValidator>>,
    dependency_checker: Option<Arc<dyn DependencyChecker>>,
    changelog_parser: Option<Arc<dyn ChangelogParser>>,
    changelog_generator: Option<Arc<dyn ChangelogGenerator>>,
    audit_log: Option<Arc<dyn AuditLog>>,
    release_gate: Option<Arc<dyn ReleaseGate>>,
}

fn fill_slot<T: ?Sized>(slot: &mut Option<Arc<T>>, plugin: Arc<T>, capability: Capability) -> Result<()> {
    if slot.is_some() {
        return Err(BumpError::DuplicatePlugin(capability));
    }
    *slot = Some(plugin);
    Ok(())
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin.
    ///
    /// # Returns
    /// * `Ok(())` - The capability slot was empty and now holds `plugin`
    /// * `Err(DuplicatePlugin)` - The slot was taken; the registry is unchanged
    pub fn register(&mut self, plugin: Plugin) -> Result<()> {
        let capability = plugin.capability();
        tracing::debug!(capability = %capability, name = plugin.name(), "registering plugin");

        match plugin {
            Plugin::CommitParser(p) => fill_slot(&mut self.commit_parser, p, capability),
            Plugin::TagManager(p) => fill_slot(&mut self.tag_manager, p, capability),
            Plugin::VersionValidator(p) => fill_slot(&mut self.version_validator, p, capability),
            Plugin::DependencyChecker(p) => fill_slot(&mut self.dependency_checker, p, capability),
            Plugin::ChangelogParser(p) => fill_slot(&mut self.changelog_parser, p, capability),
            Plugin::ChangelogGenerator(p) => fill_slot(&mut self.changelog_generator, p, capability),
            Plugin::AuditLog(p) => fill_slot(&mut self.audit_log, p, capability),
            Plugin::ReleaseGate(p) => fill_slot(&mut self.release_gate, p, capability),
        }
    }

    /// Register several plugins, logging and skipping duplicates
    pub fn register_all(&mut self, plugins: impl IntoIterator<Item = Plugin>) {
        for plugin in plugins {
            let name = plugin.name().to_string();
            if let Err(e) = self.register(plugin) {
                tracing::warn!(plugin = %name, "{}", e);
            }
        }
    }

    /// Build the registry described by the `[plugins]` config sections
    pub fn from_config(config: &Config, services: &Services) -> Self {
        let plugins = &config.plugins;
        let mut wanted = Vec::new();

        if plugins.commit_parser.enabled {
            wanted.push(Plugin::CommitParser(Arc::new(ConventionalCommitParser::new(
                plugins.commit_parser.clone(),
            ))));
        }
        if plugins.tag_manager.enabled {
            wanted.push(Plugin::TagManager(Arc::new(GitTagManager::new(
                plugins.tag_manager.clone(),
                services.tags.clone(),
            ))));
        }
        if plugins.version_validator.enabled {
            wanted.push(Plugin::VersionValidator(Arc::new(RuleValidator::new(
                plugins.version_validator.rules.clone(),
                services.repo_info.clone(),
            ))));
        }
        if plugins.dependency_check.enabled {
            wanted.push(Plugin::DependencyChecker(Arc::new(FileDependencyChecker::new(
                plugins.dependency_check.clone(),
            ))));
        }
        if plugins.changelog_parser.enabled {
            wanted.push(Plugin::ChangelogParser(Arc::new(KeepAChangelogParser::new(
                plugins.changelog_parser.path.clone(),
            ))));
        }
        if plugins.changelog_generator.enabled {
            wanted.push(Plugin::ChangelogGenerator(Arc::new(
                MarkdownChangelogGenerator::new(plugins.changelog_generator.path.clone()),
            )));
        }
        if plugins.audit_log.enabled {
            wanted.push(Plugin::AuditLog(Arc::new(FileAuditLog::new(
                plugins.audit_log.clone(),
                services.repo_info.clone(),
            ))));
        }
        if plugins.release_gate.enabled {
            wanted.push(Plugin::ReleaseGate(Arc::new(BranchReleaseGate::new(
                plugins.release_gate.clone(),
                services.repo_info.clone(),
                services.commits.clone(),
            ))));
        }

        let mut registry = PluginRegistry::new();
        registry.register_all(wanted);
        registry
    }

    pub fn commit_parser(&self) -> Option<&Arc<dyn CommitParser>> {
        self.commit_parser.as_ref()
    }

    pub fn tag_manager(&self) -> Option<&Arc<dyn TagManager>> {
        self.tag_manager.as_ref()
    }

    pub fn version_validator(&self) -> Option<&Arc<dyn VersionValidator>> {
        self.version_validator.as_ref()
    }

    pub fn dependency_checker(&self) -> Option<&Arc<dyn DependencyChecker>> {
        self.dependency_checker.as_ref()
    }

    pub fn changelog_parser(&self) -> Option<&Arc<dyn ChangelogParser>> {
        self.changelog_parser.as_ref()
    }

    pub fn changelog_generator(&self) -> Option<&Arc<dyn ChangelogGenerator>> {
        self.changelog_generator.as_ref()
    }

    pub fn audit_log(&self) -> Option<&Arc<dyn AuditLog>> {
        self.audit_log.as_ref()
    }

    pub fn release_gate(&self) -> Option<&Arc<dyn ReleaseGate>> {
        self.release_gate.as_ref()
    }

    /// Capabilities that currently have a plugin
    pub fn capabilities(&self) -> Vec<Capability> {
        let slots = [
            (self.commit_parser.is_some(), Capability::CommitParser),
            (self.tag_manager.is_some(), Capability::TagManager),
            (self.version_validator.is_some(), Capability::VersionValidator),
            (self.dependency_checker.is_some(), Capability::DependencyChecker),
            (self.changelog_parser.is_some(), Capability::ChangelogParser),
            (self.changelog_generator.is_some(), Capability::ChangelogGenerator),
            (self.audit_log.is_some(), Capability::AuditLog),
            (self.release_gate.is_some(), Capability::ReleaseGate),
        ];
        slots
            .into_iter()
            .filter_map(|(present, capability)| present.then_some(capability))
            .collect()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
