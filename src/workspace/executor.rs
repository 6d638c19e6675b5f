use crate::error::BumpError;
use crate::workspace::{ExecutionResult, Module, Operation};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Why a run stopped early. Carries whatever results were collected.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("No modules to process")]
    NoModules,

    #[error("Execution cancelled after {} module(s)", .results.len())]
    Cancelled { results: Vec<ExecutionResult> },

    #[error("Module '{module}' failed: {source}")]
    FailFast {
        module: String,
        #[source]
        source: Arc<BumpError>,
        results: Vec<ExecutionResult>,
    },
}

impl ExecutorError {
    /// Results collected before the run stopped
    pub fn results(&self) -> &[ExecutionResult] {
        match self {
            ExecutorError::NoModules => &[],
            ExecutorError::Cancelled { results } | ExecutorError::FailFast { results, .. } => {
                results
            }
        }
    }

    pub fn into_results(self) -> Vec<ExecutionResult> {
        match self {
            ExecutorError::NoModules => Vec::new(),
            ExecutorError::Cancelled { results } | ExecutorError::FailFast { results, .. } => {
                results
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// One task per module instead of one module at a time
    pub parallel: bool,
    /// Stop at the first module failure
    pub fail_fast: bool,
}

/// Applies one operation to many modules
#[derive(Debug, Clone, Default)]
pub struct Executor {
    options: ExecutorOptions,
}

impl Executor {
    pub fn new(options: ExecutorOptions) -> Self {
        Executor { options }
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Run `op` on every module.
    ///
    /// Results come back in input order in both modes. In best-effort mode
    /// module failures are only recorded in their results; the run itself
    /// fails for an empty module list or cancellation.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        modules: Vec<Module>,
        op: Arc<dyn Operation>,
    ) -> Result<Vec<ExecutionResult>, ExecutorError> {
        if modules.is_empty() {
            return Err(ExecutorError::NoModules);
        }

        tracing::debug!(
            operation = %op.name(),
            modules = modules.len(),
            parallel = self.options.parallel,
            fail_fast = self.options.fail_fast,
            "starting workspace run"
        );

        if self.options.parallel {
            self.run_parallel(cancel, modules, op).await
        } else {
            self.run_sequential(cancel, modules, op).await
        }
    }

    async fn run_sequential(
        &self,
        cancel: &CancellationToken,
        modules: Vec<Module>,
        op: Arc<dyn Operation>,
    ) -> Result<Vec<ExecutionResult>, ExecutorError> {
        let mut results = Vec::with_capacity(modules.len());

        for module in modules {
            if cancel.is_cancelled() {
                return Err(ExecutorError::Cancelled { results });
            }

            let result = execute_one(op.as_ref(), cancel, module).await;
            let failure = result
                .error
                .clone()
                .map(|source| (result.module.name.clone(), source));
            results.push(result);

            if let Some((module, source)) = failure {
                if self.options.fail_fast {
                    return Err(ExecutorError::FailFast {
                        module,
                        source,
                        results,
                    });
                }
            }
        }

        Ok(results)
    }

    async fn run_parallel(
        &self,
        cancel: &CancellationToken,
        modules: Vec<Module>,
        op: Arc<dyn Operation>,
    ) -> Result<Vec<ExecutionResult>, ExecutorError> {
        let token = cancel.child_token();
        let slots: Arc<Mutex<Vec<Option<ExecutionResult>>>> =
            Arc::new(Mutex::new(modules.iter().map(|_| None).collect()));
        let originals = modules.clone();

        let mut join_set = JoinSet::new();
        for (index, module) in modules.into_iter().enumerate() {
            let op = op.clone();
            let token = token.clone();
            let slots = slots.clone();

            join_set.spawn(async move {
                let result = if token.is_cancelled() {
                    not_started(module)
                } else {
                    execute_one(op.as_ref(), &token, module).await
                };
                let failure = result
                    .error
                    .clone()
                    .map(|source| (result.module.name.clone(), source));
                slots.lock().await[index] = Some(result);
                failure
            });
        }

        let mut first_failure = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Some(failure)) => {
                    if self.options.fail_fast && first_failure.is_none() {
                        tracing::debug!(module = %failure.0, "fail-fast: cancelling remaining modules");
                        token.cancel();
                        first_failure = Some(failure);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "module task panicked"),
            }
        }

        let results: Vec<ExecutionResult> = slots
            .lock()
            .await
            .iter_mut()
            .zip(originals)
            .map(|(slot, module)| slot.take().unwrap_or_else(|| panicked(module)))
            .collect();

        if cancel.is_cancelled() {
            return Err(ExecutorError::Cancelled { results });
        }
        if let Some((module, source)) = first_failure {
            return Err(ExecutorError::FailFast {
                module,
                source,
                results,
            });
        }
        Ok(results)
    }
}

async fn execute_one(
    op: &dyn Operation,
    cancel: &CancellationToken,
    mut module: Module,
) -> ExecutionResult {
    let old_version = module.current_version.clone();
    let start = Instant::now();
    let outcome = op.execute(cancel, &mut module).await;
    let duration = start.elapsed();
    let new_version = module.current_version.clone();

    match outcome {
        Ok(warnings) => ExecutionResult {
            module,
            old_version,
            new_version,
            success: true,
            error: None,
            warnings,
            duration,
        },
        Err(e) => {
            tracing::warn!(module = %module.name, error = %e, "module failed");
            ExecutionResult {
                module,
                old_version,
                new_version,
                success: false,
                error: Some(Arc::new(e)),
                warnings: Vec::new(),
                duration,
            }
        }
    }
}

fn failed(module: Module, error: BumpError) -> ExecutionResult {
    let version = module.current_version.clone();
    ExecutionResult {
        module,
        old_version: version.clone(),
        new_version: version,
        success: false,
        error: Some(Arc::new(error)),
        warnings: Vec::new(),
        duration: Duration::ZERO,
    }
}

/// Skipped because the run was cancelled first
fn not_started(module: Module) -> ExecutionResult {
    failed(module, BumpError::Cancelled)
}

fn panicked(module: Module) -> ExecutionResult {
    let message = format!("task for module '{}' did not complete", module.name);
    failed(module, BumpError::Task(message))
}
