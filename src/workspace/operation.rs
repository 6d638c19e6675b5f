use crate::bump::{BumpPipeline, BumpRequest};
use crate::error::{BumpError, Result};
use crate::warning::BumpWarning;
use crate::workspace::Module;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Work applied to each module by the [crate::workspace::Executor]
///
/// Implementations update `module.current_version` when they change it and
/// should check `cancel` during long-running steps.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        module: &mut Module,
    ) -> Result<Vec<BumpWarning>>;

    fn name(&self) -> String;
}

/// Runs the bump pipeline on the module's version file
pub struct BumpOperation {
    pipeline: Arc<BumpPipeline>,
    request: BumpRequest,
}

impl BumpOperation {
    pub fn new(pipeline: Arc<BumpPipeline>, request: BumpRequest) -> Self {
        BumpOperation { pipeline, request }
    }
}

#[async_trait]
impl Operation for BumpOperation {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        module: &mut Module,
    ) -> Result<Vec<BumpWarning>> {
        let pipeline = self.pipeline.clone();
        let request = self.request.clone();
        let path = module.path.clone();
        let token = cancel.clone();

        // Hooks, git and file I/O all block
        let outcome = tokio::task::spawn_blocking(move || pipeline.run(&path, &request, &token))
            .await
            .map_err(|e| BumpError::Task(e.to_string()))??;

        tracing::debug!(module = %module.name, version = %outcome.new, "module bumped");
        module.current_version = Some(outcome.new);
        Ok(outcome.warnings)
    }

    fn name(&self) -> String {
        format!("bump {}", self.request.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bump::{BumpKind, Services};
    use crate::config::HooksConfig;
    use crate::domain::SemVersion;
    use crate::git::MockRepository;
    use crate::hooks::ShellRunner;
    use crate::plugins::PluginRegistry;
    use tempfile::TempDir;

    fn operation(kind: BumpKind) -> BumpOperation {
        let services = Services::from_repository(Arc::new(MockRepository::new()), Arc::new(ShellRunner));
        let pipeline = BumpPipeline::new(
            HooksConfig::default(),
            Arc::new(PluginRegistry::new()),
            services,
        );
        BumpOperation::new(Arc::new(pipeline), BumpRequest::new(kind))
    }

    #[tokio::test]
    async fn test_bump_operation_updates_module() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".version");
        std::fs::write(&path, "1.0.0\n").unwrap();

        let mut module = Module::load("core", &path);
        let op = operation(BumpKind::Major);
        let warnings = op.execute(&CancellationToken::new(), &mut module).await.unwrap();

        assert!(warnings.is_empty());
        assert_eq!(module.current_version, Some(SemVersion::new(2, 0, 0)));
        assert_eq!(op.name(), "bump major");
    }

    #[tokio::test]
    async fn test_bump_operation_error_leaves_module() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".version");
        std::fs::write(&path, "garbage\n").unwrap();

        let mut module = Module::new("core", &path);
        let err = operation(BumpKind::Patch)
            .execute(&CancellationToken::new(), &mut module)
            .await
            .unwrap_err();

        assert!(matches!(err, BumpError::InvalidVersionFormat(_)));
        assert_eq!(module.current_version, None);
    }
}
