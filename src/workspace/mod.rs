//! Multi-module execution
//!
//! A workspace is a set of independent version files ("modules"). The
//! [Executor] applies one [Operation] to each of them, sequentially or in
//! parallel, and reports one [ExecutionResult] per module in input order.

pub mod executor;
pub mod operation;

pub use executor::{Executor, ExecutorError, ExecutorOptions};
pub use operation::{BumpOperation, Operation};

use crate::config::Config;
use crate::domain::SemVersion;
use crate::error::BumpError;
use crate::store;
use crate::warning::BumpWarning;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// One version file in the workspace
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    /// Version last read or written; `None` until known
    pub current_version: Option<SemVersion>,
}

impl Module {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Module {
            name: name.into(),
            path: path.into(),
            current_version: None,
        }
    }

    pub fn with_version(mut self, version: SemVersion) -> Self {
        self.current_version = Some(version);
        self
    }

    /// Module with its current version read from disk, when readable
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let mut module = Module::new(name, path);
        match store::read(&module.path) {
            Ok(version) => module.current_version = Some(version),
            Err(e) => tracing::debug!(module = %module.name, error = %e, "version not loaded"),
        }
        module
    }
}

/// Modules declared in `[workspace]`
pub fn modules_from_config(config: &Config) -> Vec<Module> {
    config
        .workspace
        .modules
        .iter()
        .map(|m| Module::load(m.name.as_str(), m.path.clone()))
        .collect()
}

/// What happened to one module
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub module: Module,
    pub old_version: Option<SemVersion>,
    pub new_version: Option<SemVersion>,
    pub success: bool,
    pub error: Option<Arc<BumpError>>,
    pub warnings: Vec<BumpWarning>,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn module_name(&self) -> &str {
        &self.module.name
    }
}

pub fn has_errors(results: &[ExecutionResult]) -> bool {
    results.iter().any(|r| !r.success)
}

pub fn success_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| r.success).count()
}

pub fn error_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| !r.success).count()
}

/// Sum of per-module durations, not wall-clock time
pub fn total_duration(results: &[ExecutionResult]) -> Duration {
    results.iter().map(|r| r.duration).sum()
}
