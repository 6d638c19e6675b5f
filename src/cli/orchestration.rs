//! Main workflow orchestration logic
//!
//! Keeps clap out of the business logic: `main.rs` turns arguments into
//! these structs and the functions here do the work.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::bump::{BumpOutcome, BumpPipeline, BumpRequest, Services};
use crate::config::Config;
use crate::domain::SemVersion;
use crate::plugins::PluginRegistry;
use crate::store;
use crate::ui;
use crate::workspace::{
    self, BumpOperation, ExecutionResult, Executor, ExecutorError, ExecutorOptions,
};

/// Arguments for the bump workflow
///
/// Mirrors the CLI arguments in a form that can be built without clap.
#[derive(Debug, Clone, PartialEq)]
pub struct BumpWorkflowArgs {
    /// Version file for single-module mode
    pub version_path: PathBuf,

    pub request: BumpRequest,

    /// Run over the configured workspace modules
    pub workspace: bool,

    /// Forces parallel execution on top of the config setting
    pub parallel: bool,

    /// Forces fail-fast on top of the config setting
    pub fail_fast: bool,
}

/// Result of a successful bump workflow
#[derive(Debug, Clone)]
pub enum WorkflowResult {
    Single(BumpOutcome),
    Workspace(Vec<ExecutionResult>),
}

impl WorkflowResult {
    /// False when a module failed or a post-bump hook failed
    pub fn is_clean(&self) -> bool {
        match self {
            WorkflowResult::Single(outcome) => !outcome.has_hook_failures(),
            WorkflowResult::Workspace(results) => {
                !workspace::has_errors(results)
                    && !results
                        .iter()
                        .flat_map(|r| &r.warnings)
                        .any(|w| w.is_hook_failure())
            }
        }
    }
}

/// Wire the plugin registry and pipeline described by `config`
pub fn build_pipeline(config: &Config, services: Services) -> BumpPipeline {
    let registry = PluginRegistry::from_config(config, &services);
    tracing::debug!(?registry, "plugins ready");
    BumpPipeline::new(config.hooks.clone(), Arc::new(registry), services)
}

/// Main bump workflow
///
/// 1. Build the pipeline from configuration
/// 2. Single mode: run it on one version file
/// 3. Workspace mode: run it on every configured module through the executor
///
/// Partial workspace results are displayed before an executor error is
/// returned.
pub async fn run_bump_workflow(
    args: BumpWorkflowArgs,
    config: &Config,
    services: Services,
    cancel: &CancellationToken,
) -> Result<WorkflowResult> {
    let pipeline = Arc::new(build_pipeline(config, services));

    if !args.workspace {
        let path = args.version_path.clone();
        let request = args.request.clone();
        let token = cancel.clone();
        let outcome = tokio::task::spawn_blocking(move || pipeline.run(&path, &request, &token))
            .await
            .context("bump task failed")?
            .with_context(|| format!("Failed to bump {}", args.version_path.display()))?;
        return Ok(WorkflowResult::Single(outcome));
    }

    let options = ExecutorOptions {
        parallel: args.parallel || config.workspace.parallel,
        fail_fast: args.fail_fast || config.workspace.fail_fast,
    };
    let modules = workspace::modules_from_config(config);
    let op = Arc::new(BumpOperation::new(pipeline, args.request));

    match Executor::new(options).run(cancel, modules, op).await {
        Ok(results) => Ok(WorkflowResult::Workspace(results)),
        Err(ExecutorError::NoModules) => {
            anyhow::bail!("No workspace modules configured; add [[workspace.modules]] entries")
        }
        Err(e) => {
            ui::display_execution_results(e.results());
            Err(e.into())
        }
    }
}

/// Current version of the file
pub fn show_version(path: &Path) -> Result<SemVersion> {
    store::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Overwrite the version file with an explicit version
pub fn set_version(path: &Path, text: &str) -> Result<SemVersion> {
    let version = SemVersion::parse(text)?;
    store::save(path, &version)?;
    tracing::info!(path = %path.display(), version = %version, "version set");
    Ok(version)
}

/// Create the version file when missing; returns whether it was created
pub fn init_version(path: &Path, services: &Services) -> Result<bool> {
    Ok(store::initialize_if_missing(path, services.tags.as_ref())?)
}
