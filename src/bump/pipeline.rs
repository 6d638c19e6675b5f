use crate::bump::{BumpKind, BumpOutcome, BumpRequest, Services};
use crate::config::HooksConfig;
use crate::domain::{increment_prerelease, BumpLabel, PreRelease, SemVersion};
use crate::error::{BumpError, Result};
use crate::hooks::{HookContext, HookExecutor};
use crate::plugins::PluginRegistry;
use crate::store;
use crate::ui;
use crate::warning::BumpWarning;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Target version before the build metadata policy is applied
#[derive(Debug, Clone, PartialEq)]
struct Resolution {
    version: SemVersion,
    bump_type: &'static str,
}

/// Runs one bump on one version file, stage by stage
///
/// 1. pre-release hooks
/// 2. bump-type resolution (explicit, inferred or heuristic)
/// 3. preconditions: tag availability, version policy, release gate
/// 4. persist
/// 5. tag creation and push
/// 6. audit log, dependency sync, changelog
/// 7. post-bump hooks
///
/// Stages 1 to 3 abort without touching the file. Stages 5 to 7 only add
/// warnings to the outcome.
pub struct BumpPipeline {
    hooks: HooksConfig,
    registry: Arc<PluginRegistry>,
    services: Services,
    auto_init: bool,
}

impl BumpPipeline {
    pub fn new(hooks: HooksConfig, registry: Arc<PluginRegistry>, services: Services) -> Self {
        BumpPipeline {
            hooks,
            registry,
            services,
            auto_init: true,
        }
    }

    /// Whether a missing version file is initialized before bumping
    pub fn with_auto_init(mut self, auto_init: bool) -> Self {
        self.auto_init = auto_init;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn hook_executor(&self) -> HookExecutor {
        HookExecutor::new(self.services.runner.clone())
    }

    pub fn run(
        &self,
        path: &Path,
        request: &BumpRequest,
        cancel: &CancellationToken,
    ) -> Result<BumpOutcome> {
        if self.auto_init {
            store::initialize_if_missing(path, self.services.tags.as_ref())?;
        }
        let previous = store::read(path)?;
        tracing::debug!(path = %path.display(), version = %previous, kind = %request.kind, "starting bump");

        // Stage 1
        if !request.skip_hooks && !self.hooks.pre_release.is_empty() {
            let context = HookContext::pre_release(path, &previous, request.kind.as_str());
            self.hook_executor()
                .execute_all(&self.hooks.pre_release, &context)?;
        }
        check_cancelled(cancel)?;

        // Stage 2
        let mut commits: Option<Vec<String>> = None;
        let resolution = self.resolve(&previous, request, &mut commits)?;
        let new = apply_build_policy(resolution.version, &previous, request)?;
        tracing::debug!(version = %new, bump_type = resolution.bump_type, "bump resolved");

        // Stage 3
        self.check_preconditions(&new, &previous, resolution.bump_type)?;
        check_cancelled(cancel)?;

        // Stage 4
        store::save(path, &new)?;
        tracing::info!(path = %path.display(), from = %previous, to = %new, "version bumped");

        let mut outcome = BumpOutcome {
            previous,
            new,
            bump_type: resolution.bump_type.to_string(),
            tag: None,
            warnings: Vec::new(),
        };

        // Stages 5 and 6
        self.create_tag(&mut outcome);
        self.record_audit(&mut outcome);
        self.sync_dependencies(&mut outcome);
        self.update_changelog(&mut outcome, &mut commits);

        // Stage 7
        if !request.skip_hooks && !self.hooks.post_bump.is_empty() {
            let context = HookContext::post_bump(
                path,
                &outcome.previous,
                &outcome.new,
                request.kind.as_str(),
                &outcome.bump_type,
            );
            for (hook, e) in self
                .hook_executor()
                .execute_permissive(&self.hooks.post_bump, &context)
            {
                outcome.warnings.push(BumpWarning::PostBumpHookFailed {
                    hook,
                    reason: e.to_string(),
                });
            }
        }

        Ok(outcome)
    }

    fn resolve(
        &self,
        current: &SemVersion,
        request: &BumpRequest,
        commits: &mut Option<Vec<String>>,
    ) -> Result<Resolution> {
        let explicit = |label: BumpLabel| -> Result<Resolution> {
            let mut version = current.bump_by_label(label);
            version.pre_release = String::new();
            if let Some(pre) = &request.pre_release {
                version = version.with_pre_release(pre)?;
            }
            Ok(Resolution {
                version,
                bump_type: label.as_str(),
            })
        };

        match request.kind {
            BumpKind::Patch => explicit(BumpLabel::Patch),
            BumpKind::Minor => explicit(BumpLabel::Minor),
            BumpKind::Major => explicit(BumpLabel::Major),
            BumpKind::Release => Ok(Resolution {
                version: current.promote(),
                bump_type: "release",
            }),
            BumpKind::Pre => {
                let base = match &request.pre_release {
                    Some(base) => base.clone(),
                    None if current.is_pre_release() => PreRelease::split(&current.pre_release).base,
                    None => {
                        return Err(BumpError::config(
                            "a pre-release label is required to start a pre-release",
                        ))
                    }
                };
                let numbers = if current.is_pre_release() {
                    current.clone()
                } else {
                    current.bump_by_label(BumpLabel::Patch)
                };
                let label = increment_prerelease(&current.pre_release, &base);
                Ok(Resolution {
                    version: numbers.with_pre_release(&label)?,
                    bump_type: "pre",
                })
            }
            BumpKind::Auto => {
                if let Some(label) = request.label {
                    return explicit(label);
                }

                if !request.disable_inference {
                    if let Some(label) = self.infer(commits) {
                        if current.is_pre_release() {
                            // An inferred label on a pre-release always promotes
                            ui::display_status(&format!(
                                "Promoting pre-release {} (inferred {})",
                                current, label
                            ));
                            return Ok(Resolution {
                                version: current.promote(),
                                bump_type: "release",
                            });
                        }
                        return explicit(label);
                    }
                }

                let version = current.bump_next();
                let bump_type = if current.is_pre_release() {
                    "release"
                } else if version.minor != current.minor {
                    "minor"
                } else {
                    "patch"
                };
                Ok(Resolution { version, bump_type })
            }
        }
    }

    /// Changelog first, then commits. Every failure is soft.
    fn infer(&self, commits: &mut Option<Vec<String>>) -> Option<BumpLabel> {
        if let Some(parser) = self.registry.changelog_parser() {
            match parser.infer_bump() {
                Ok(Some(label)) => {
                    tracing::debug!(plugin = parser.name(), label = %label, "inferred from changelog");
                    return Some(label);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "changelog inference failed"),
            }
        }

        let parser = self.registry.commit_parser()?;
        let messages = self.commits(commits)?;
        let label = parser.parse(messages);
        tracing::debug!(plugin = parser.name(), commits = messages.len(), label = ?label, "inferred from commits");
        label
    }

    /// Commit messages since the latest tag, fetched at most once per run
    fn commits<'a>(&self, cache: &'a mut Option<Vec<String>>) -> Option<&'a Vec<String>> {
        if cache.is_none() {
            match self.services.commits.commits(None, None) {
                Ok(messages) => *cache = Some(messages),
                Err(e) => {
                    tracing::debug!(error = %e, "commit history unavailable");
                    return None;
                }
            }
        }
        cache.as_ref()
    }

    fn check_preconditions(&self, new: &SemVersion, previous: &SemVersion, bump_type: &str) -> Result<()> {
        if let Some(tags) = self.registry.tag_manager() {
            tags.ensure_available(new)?;
        }
        if let Some(validator) = self.registry.version_validator() {
            validator.validate(new, previous, bump_type)?;
        }
        if let Some(gate) = self.registry.release_gate() {
            gate.check()?;
        }
        Ok(())
    }

    fn warn(outcome: &mut BumpOutcome, warning: BumpWarning) {
        tracing::warn!("{}", warning);
        outcome.warnings.push(warning);
    }

    fn create_tag(&self, outcome: &mut BumpOutcome) {
        let Some(tags) = self.registry.tag_manager() else {
            return;
        };
        if !tags.auto_create() {
            return;
        }

        let tag = match tags.create(&outcome.new) {
            Ok(tag) => tag,
            Err(e) => {
                let tag = tags.tag_name(&outcome.new);
                Self::warn(outcome, BumpWarning::TagCreateFailed { tag, reason: e.to_string() });
                return;
            }
        };
        outcome.tag = Some(tag.clone());

        if tags.push_enabled() {
            if let Err(e) = tags.push(&tag) {
                Self::warn(outcome, BumpWarning::TagPushFailed { tag, reason: e.to_string() });
            }
        }
    }

    fn record_audit(&self, outcome: &mut BumpOutcome) {
        let Some(audit) = self.registry.audit_log() else {
            return;
        };
        if let Err(e) = audit.record(&outcome.previous, &outcome.new, &outcome.bump_type) {
            Self::warn(outcome, BumpWarning::AuditLogFailed { reason: e.to_string() });
        }
    }

    fn sync_dependencies(&self, outcome: &mut BumpOutcome) {
        let Some(checker) = self.registry.dependency_checker() else {
            return;
        };

        if checker.auto_sync() {
            if let Err(e) = checker.sync(&outcome.new) {
                Self::warn(outcome, BumpWarning::DependencySyncFailed { reason: e.to_string() });
            }
            return;
        }

        match checker.check(&outcome.new) {
            Ok(drift) => {
                for d in drift {
                    Self::warn(outcome, BumpWarning::DependencyDrift { path: d.path, found: d.found });
                }
            }
            Err(e) => Self::warn(outcome, BumpWarning::DependencySyncFailed { reason: e.to_string() }),
        }
    }

    fn update_changelog(&self, outcome: &mut BumpOutcome, commits: &mut Option<Vec<String>>) {
        let Some(generator) = self.registry.changelog_generator() else {
            return;
        };

        let messages = match commits.take() {
            Some(messages) => Ok(messages),
            None => self.services.commits.commits(None, None),
        };
        if let Err(e) = messages.and_then(|m| generator.generate(&outcome.new, &m)) {
            Self::warn(outcome, BumpWarning::ChangelogFailed { reason: e.to_string() });
        }
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(BumpError::Cancelled);
    }
    Ok(())
}

/// Explicit metadata wins, then `preserve_meta`, otherwise the build is cleared
fn apply_build_policy(
    version: SemVersion,
    previous: &SemVersion,
    request: &BumpRequest,
) -> Result<SemVersion> {
    match (&request.metadata, request.preserve_meta) {
        (Some(meta), _) => version.with_build(meta),
        (None, true) => Ok(SemVersion {
            build: previous.build.clone(),
            ..version
        }),
        (None, false) => Ok(SemVersion {
            build: String::new(),
            ..version
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HookCommand};
    use crate::git::MockRepository;
    use crate::hooks::CommandRunner;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Fails any command containing "fail"; records environments
    #[derive(Default)]
    struct RecordingRunner {
        envs: Mutex<Vec<HashMap<String, String>>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &str, env: &HashMap<String, String>) -> Result<i32> {
            self.envs.lock().unwrap().push(env.clone());
            Ok(if command.contains("fail") { 1 } else { 0 })
        }
    }

    struct Fixture {
        dir: TempDir,
        repo: Arc<MockRepository>,
        runner: Arc<RecordingRunner>,
    }

    impl Fixture {
        fn new(version: &str, repo: MockRepository) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(".version"), format!("{}\n", version)).unwrap();
            Fixture {
                dir,
                repo: Arc::new(repo),
                runner: Arc::new(RecordingRunner::default()),
            }
        }

        fn path(&self) -> std::path::PathBuf {
            self.dir.path().join(".version")
        }

        fn pipeline(&self, config: &Config) -> BumpPipeline {
            let services = Services::from_repository(self.repo.clone(), self.runner.clone());
            let registry = PluginRegistry::from_config(config, &services);
            BumpPipeline::new(config.hooks.clone(), Arc::new(registry), services)
        }

        fn bump(&self, config: &Config, request: BumpRequest) -> Result<BumpOutcome> {
            self.pipeline(config)
                .run(&self.path(), &request, &CancellationToken::new())
        }

        fn on_disk(&self) -> String {
            fs::read_to_string(self.path()).unwrap()
        }
    }

    fn config(toml: &str) -> Config {
        Config::from_toml(toml).unwrap()
    }

    #[test]
    fn test_patch_bump() {
        let fx = Fixture::new("1.2.3", MockRepository::new());
        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Patch)).unwrap();
        assert_eq!(outcome.new.to_string(), "1.2.4");
        assert_eq!(outcome.bump_type, "patch");
        assert_eq!(fx.on_disk(), "1.2.4\n");
    }

    #[test]
    fn test_patch_clears_pre_release() {
        let fx = Fixture::new("1.2.3-alpha", MockRepository::new());
        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Patch)).unwrap();
        assert_eq!(outcome.new.to_string(), "1.2.4");
    }

    #[test]
    fn test_minor_with_pre_release_label() {
        let fx = Fixture::new("1.2.3", MockRepository::new());
        let request = BumpRequest::new(BumpKind::Minor).with_pre_release("rc.1");
        let outcome = fx.bump(&Config::default(), request).unwrap();
        assert_eq!(outcome.new.to_string(), "1.3.0-rc.1");
    }

    #[test]
    fn test_release_preserving_meta() {
        let fx = Fixture::new("1.3.0-alpha.2+build.99", MockRepository::new());
        let request = BumpRequest::new(BumpKind::Release).preserving_meta();
        let outcome = fx.bump(&Config::default(), request).unwrap();
        assert_eq!(outcome.new.to_string(), "1.3.0+build.99");
        assert_eq!(outcome.bump_type, "release");
    }

    #[test]
    fn test_build_metadata_policy() {
        let fx = Fixture::new("1.0.0+old", MockRepository::new());
        let outcome = fx
            .bump(
                &Config::default(),
                BumpRequest::new(BumpKind::Patch).with_metadata("new").preserving_meta(),
            )
            .unwrap();
        assert_eq!(outcome.new.to_string(), "1.0.1+new");

        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Patch)).unwrap();
        assert_eq!(outcome.new.to_string(), "1.0.2");
    }

    #[test]
    fn test_invalid_metadata_rejected_before_write() {
        let fx = Fixture::new("1.0.0", MockRepository::new());
        let request = BumpRequest::new(BumpKind::Patch).with_metadata("bad meta!");
        assert!(fx.bump(&Config::default(), request).is_err());
        assert_eq!(fx.on_disk(), "1.0.0\n");
    }

    #[test]
    fn test_auto_infers_minor_from_commits() {
        let fx = Fixture::new("1.2.3", MockRepository::new().with_commits(["feat: x"]));
        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Auto)).unwrap();
        assert_eq!(outcome.new.to_string(), "1.3.0");
        assert_eq!(outcome.bump_type, "minor");
    }

    #[test]
    fn test_auto_without_inference_uses_heuristic() {
        let fx = Fixture::new("0.9.0", MockRepository::new().with_commits(["feat!: x"]));
        let request = BumpRequest::new(BumpKind::Auto).without_inference();
        let outcome = fx.bump(&Config::default(), request).unwrap();
        assert_eq!(outcome.new.to_string(), "0.10.0");
        assert_eq!(outcome.bump_type, "minor");
    }

    #[test]
    fn test_auto_unrecognized_commits_fall_through() {
        let fx = Fixture::new("2.0.0", MockRepository::new().with_commits(["docs: readme"]));
        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Auto)).unwrap();
        assert_eq!(outcome.new.to_string(), "2.0.1");
    }

    #[test]
    fn test_auto_history_failure_is_soft() {
        let fx = Fixture::new("2.0.0", MockRepository::new().failing_commits());
        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Auto)).unwrap();
        assert_eq!(outcome.new.to_string(), "2.0.1");
    }

    #[test]
    fn test_auto_explicit_label_skips_inference() {
        let fx = Fixture::new("1.0.0", MockRepository::new().with_commits(["feat!: x"]));
        let request = BumpRequest::new(BumpKind::Auto).with_label(BumpLabel::Patch);
        let outcome = fx.bump(&Config::default(), request).unwrap();
        assert_eq!(outcome.new.to_string(), "1.0.1");
    }

    #[test]
    fn test_auto_major_inference_on_pre_release_promotes() {
        let fx = Fixture::new("1.4.0-beta.3", MockRepository::new().with_commits(["feat!: drop api"]));
        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Auto)).unwrap();
        assert_eq!(outcome.new.to_string(), "1.4.0");
        assert_eq!(outcome.bump_type, "release");
    }

    #[test]
    fn test_auto_changelog_consulted_before_commits() {
        let fx = Fixture::new("1.0.0", MockRepository::new().with_commits(["fix: a"]));
        let changelog = fx.dir.path().join("CHANGELOG.md");
        fs::write(&changelog, "## [Unreleased]\n### Removed\n- old flag\n").unwrap();
        let cfg = config(&format!(
            "[plugins.changelog_parser]\nenabled = true\npath = {:?}\n",
            changelog.display().to_string()
        ));

        let outcome = fx.bump(&cfg, BumpRequest::new(BumpKind::Auto)).unwrap();
        assert_eq!(outcome.new.to_string(), "2.0.0");
    }

    #[test]
    fn test_pre_starts_and_advances_series() {
        let fx = Fixture::new("1.2.3", MockRepository::new());
        let outcome = fx
            .bump(&Config::default(), BumpRequest::new(BumpKind::Pre).with_pre_release("rc"))
            .unwrap();
        assert_eq!(outcome.new.to_string(), "1.2.4-rc.1");

        let outcome = fx.bump(&Config::default(), BumpRequest::new(BumpKind::Pre)).unwrap();
        assert_eq!(outcome.new.to_string(), "1.2.4-rc.2");

        let outcome = fx
            .bump(&Config::default(), BumpRequest::new(BumpKind::Pre).with_pre_release("beta"))
            .unwrap();
        assert_eq!(outcome.new.to_string(), "1.2.4-beta.1");
    }

    #[test]
    fn test_pre_without_label_on_final_version() {
        let fx = Fixture::new("1.2.3", MockRepository::new());
        assert!(matches!(
            fx.bump(&Config::default(), BumpRequest::new(BumpKind::Pre)),
            Err(BumpError::Config(_))
        ));
    }

    #[test]
    fn test_failing_pre_release_hook_leaves_file_untouched() {
        let fx = Fixture::new("1.2.3-alpha.1+b.7", MockRepository::new());
        let mut cfg = Config::default();
        cfg.hooks.pre_release = vec![HookCommand::new("lint", "make lint-fail")];

        let before = fs::read(fx.path()).unwrap();
        let err = fx.bump(&cfg, BumpRequest::new(BumpKind::Major)).unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(fs::read(fx.path()).unwrap(), before);
    }

    #[test]
    fn test_skip_hooks() {
        let fx = Fixture::new("1.0.0", MockRepository::new());
        let mut cfg = Config::default();
        cfg.hooks.pre_release = vec![HookCommand::new("lint", "fail")];
        cfg.hooks.post_bump = vec![HookCommand::new("notify", "fail")];
        let outcome = fx
            .bump(&cfg, BumpRequest::new(BumpKind::Patch).skipping_hooks())
            .unwrap();
        assert_eq!(outcome.new.to_string(), "1.0.1");
        assert!(outcome.warnings.is_empty());
        assert!(fx.runner.envs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_existing_tag_blocks_bump() {
        let fx = Fixture::new("1.2.9", MockRepository::new().with_tags(["v1.3.0"]));
        let cfg = config("[plugins.tag_manager]\nenabled = true\n");
        let err = fx.bump(&cfg, BumpRequest::new(BumpKind::Minor)).unwrap_err();
        assert!(matches!(err, BumpError::TagExists(_)));
        assert_eq!(fx.on_disk(), "1.2.9\n");
    }

    #[test]
    fn test_validator_blocks_bump() {
        let fx = Fixture::new("1.0.0", MockRepository::new());
        let cfg = config(
            "[plugins.version_validator]\nenabled = true\n[[plugins.version_validator.rules]]\ntype = \"major-version-max\"\nvalue = 1\n",
        );
        let err = fx.bump(&cfg, BumpRequest::new(BumpKind::Major)).unwrap_err();
        assert!(matches!(err, BumpError::ValidationFailed(_)));
        assert_eq!(fx.on_disk(), "1.0.0\n");
    }

    #[test]
    fn test_release_gate_blocks_bump() {
        let fx = Fixture::new("1.0.0", MockRepository::new().with_branch("feature/x"));
        let cfg = config("[plugins.release_gate]\nenabled = true\nallowed_branches = [\"main\"]\n");
        let err = fx.bump(&cfg, BumpRequest::new(BumpKind::Patch)).unwrap_err();
        assert!(matches!(err, BumpError::ReleaseGate(_)));
    }

    #[test]
    fn test_tag_created_and_push_failure_is_warning() {
        let fx = Fixture::new("1.0.0", MockRepository::new().failing_push());
        let cfg = config("[plugins.tag_manager]\nenabled = true\npush = true\n");
        let outcome = fx.bump(&cfg, BumpRequest::new(BumpKind::Minor)).unwrap();

        assert_eq!(outcome.tag.as_deref(), Some("v1.1.0"));
        assert_eq!(fx.repo.created_tags()[0].0, "v1.1.0");
        assert!(matches!(outcome.warnings[0], BumpWarning::TagPushFailed { .. }));
        assert_eq!(fx.on_disk(), "1.1.0\n");
    }

    #[test]
    fn test_tag_create_failure_keeps_version() {
        let fx = Fixture::new("1.0.0", MockRepository::new().failing_create());
        let cfg = config("[plugins.tag_manager]\nenabled = true\n");
        let outcome = fx.bump(&cfg, BumpRequest::new(BumpKind::Patch)).unwrap();
        assert!(outcome.tag.is_none());
        assert!(matches!(outcome.warnings[0], BumpWarning::TagCreateFailed { .. }));
        assert_eq!(fx.on_disk(), "1.0.1\n");
    }

    #[test]
    fn test_audit_failure_is_warning() {
        let fx = Fixture::new("1.0.0", MockRepository::new());
        let bad = fx.dir.path().join("missing-dir/history.json");
        let cfg = config(&format!(
            "[plugins.audit_log]\nenabled = true\npath = {:?}\n",
            bad.display().to_string()
        ));
        let outcome = fx.bump(&cfg, BumpRequest::new(BumpKind::Patch)).unwrap();
        assert!(matches!(outcome.warnings[0], BumpWarning::AuditLogFailed { .. }));
        assert_eq!(fx.on_disk(), "1.0.1\n");
    }

    #[test]
    fn test_post_bump_hooks_get_new_version() {
        let fx = Fixture::new("1.0.0", MockRepository::new());
        let mut cfg = Config::default();
        cfg.hooks.post_bump = vec![
            HookCommand::new("notify", "fail-notify"),
            HookCommand::new("publish", "publish"),
        ];

        let outcome = fx.bump(&cfg, BumpRequest::new(BumpKind::Minor)).unwrap();
        assert!(outcome.has_hook_failures());
        assert_eq!(outcome.warnings.len(), 1);

        let envs = fx.runner.envs.lock().unwrap();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[1].get("VERBUMP_NEW_VERSION").map(String::as_str), Some("1.1.0"));
        assert_eq!(envs[1].get("VERBUMP_BUMP_TYPE").map(String::as_str), Some("minor"));
    }

    #[test]
    fn test_cancelled_before_persist() {
        let fx = Fixture::new("1.0.0", MockRepository::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = fx
            .pipeline(&Config::default())
            .run(&fx.path(), &BumpRequest::new(BumpKind::Patch), &cancel)
            .unwrap_err();
        assert!(matches!(err, BumpError::Cancelled));
        assert_eq!(fx.on_disk(), "1.0.0\n");
    }

    #[test]
    fn test_missing_file_initialized_from_tag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".version");
        let repo = Arc::new(MockRepository::new().with_tags(["v0.4.0"]));
        let services = Services::from_repository(repo, Arc::new(RecordingRunner::default()));
        let pipeline = BumpPipeline::new(
            HooksConfig::default(),
            Arc::new(PluginRegistry::new()),
            services,
        );

        let outcome = pipeline
            .run(&path, &BumpRequest::new(BumpKind::Patch), &CancellationToken::new())
            .unwrap();
        assert_eq!(outcome.previous.to_string(), "0.4.0");
        assert_eq!(outcome.new.to_string(), "0.4.1");
    }

    #[test]
    fn test_missing_file_without_auto_init() {
        let dir = TempDir::new().unwrap();
        let services = Services::from_repository(
            Arc::new(MockRepository::new()),
            Arc::new(RecordingRunner::default()),
        );
        let pipeline =
            BumpPipeline::new(HooksConfig::default(), Arc::new(PluginRegistry::new()), services)
                .with_auto_init(false);
        let err = pipeline
            .run(
                &dir.path().join(".version"),
                &BumpRequest::new(BumpKind::Patch),
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, BumpError::Io { .. }));
    }
}
