use crate::config::HookCommand;
use crate::error::{BumpError, Result};
use crate::hooks::HookContext;
use crate::ui;
use std::collections::HashMap;
use std::process::Command;
use std::sync::Arc;

/// Runs a shell command and reports its exit code
pub trait CommandRunner: Send + Sync {
    /// Execute `command` through the system shell with extra environment
    /// variables. Returns the exit code; spawn failures are errors.
    fn run(&self, command: &str, env: &HashMap<String, String>) -> Result<i32>;
}

/// `sh -c` (or `cmd /C` on Windows) with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, env: &HashMap<String, String>) -> Result<i32> {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        };
        cmd.envs(env);

        let status = cmd
            .status()
            .map_err(|e| BumpError::hook(format!("Failed to execute '{}': {}", command, e)))?;

        // Killed by a signal: no exit code.
        Ok(status.code().unwrap_or(-1))
    }
}

/// Executes configured hook commands
pub struct HookExecutor {
    runner: Arc<dyn CommandRunner>,
}

impl HookExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        HookExecutor { runner }
    }

    /// Execute one hook with the given context
    ///
    /// # Returns
    /// * `Ok(())` if the command exits with code 0
    /// * `Err(HookFailed)` on a non-zero exit code, `Err(Hook)` if it cannot run
    pub fn execute(&self, hook: &HookCommand, context: &HookContext) -> Result<()> {
        ui::display_status(&format!(
            "Running {} hook '{}': {}",
            context.hook_type.name(),
            hook.name,
            hook.command
        ));
        tracing::debug!(hook = %hook.name, kind = context.hook_type.name(), "running hook");

        let code = self.runner.run(&hook.command, &context.to_env_vars())?;
        if code != 0 {
            ui::display_error(&format!("Hook '{}' failed with exit code {}", hook.name, code));
            return Err(BumpError::HookFailed {
                name: hook.name.clone(),
                code,
            });
        }

        ui::display_success(&format!("Hook '{}' succeeded", hook.name));
        Ok(())
    }

    /// Run hooks in order, stopping at the first failure
    pub fn execute_all(&self, hooks: &[HookCommand], context: &HookContext) -> Result<()> {
        for hook in hooks {
            self.execute(hook, context)?;
        }
        Ok(())
    }

    /// Run every hook, collecting failures instead of stopping.
    ///
    /// Used for post-bump hooks where the bump has already succeeded and we
    /// don't want a hook failure to retroactively fail the operation.
    pub fn execute_permissive(
        &self,
        hooks: &[HookCommand],
        context: &HookContext,
    ) -> Vec<(String, BumpError)> {
        let mut failures = Vec::new();
        for hook in hooks {
            if let Err(e) = self.execute(hook, context) {
                tracing::warn!(hook = %hook.name, error = %e, "post-bump hook failed");
                failures.push((hook.name.clone(), e));
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemVersion;
    use std::path::Path;
    use std::sync::Mutex;

    /// Exit codes keyed by command; records calls in order
    #[derive(Default)]
    struct ScriptedRunner {
        codes: HashMap<String, i32>,
        calls: Mutex<Vec<String>>,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &str, _env: &HashMap<String, String>) -> Result<i32> {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(*self.codes.get(command).unwrap_or(&0))
        }
    }

    fn context() -> HookContext {
        HookContext::pre_release(Path::new(".version"), &SemVersion::new(1, 0, 0), "patch")
    }

    #[test]
    fn test_execute_all_stops_at_first_failure() {
        let mut runner = ScriptedRunner::default();
        runner.codes.insert("false".to_string(), 1);
        let runner = Arc::new(runner);
        let executor = HookExecutor::new(runner.clone());

        let hooks = vec![
            HookCommand::new("first", "true"),
            HookCommand::new("second", "false"),
            HookCommand::new("third", "echo never"),
        ];

        let err = executor.execute_all(&hooks, &context()).unwrap_err();
        assert!(matches!(err, BumpError::HookFailed { ref name, code: 1 } if name == "second"));
        assert_eq!(*runner.calls.lock().unwrap(), vec!["true", "false"]);
    }

    #[test]
    fn test_execute_permissive_runs_everything() {
        let mut runner = ScriptedRunner::default();
        runner.codes.insert("bad".to_string(), 2);
        let runner = Arc::new(runner);
        let executor = HookExecutor::new(runner.clone());

        let hooks = vec![HookCommand::new("a", "bad"), HookCommand::new("b", "good")];
        let failures = executor.execute_permissive(&hooks, &context());

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "a");
        assert_eq!(runner.calls.lock().unwrap().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_exit_codes() {
        let runner = ShellRunner;
        assert_eq!(runner.run("exit 0", &HashMap::new()).unwrap(), 0);
        assert_eq!(runner.run("exit 3", &HashMap::new()).unwrap(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_passes_env() {
        let runner = ShellRunner;
        let mut env = HashMap::new();
        env.insert("VERBUMP_NEW_VERSION".to_string(), "2.0.0".to_string());
        let code = runner
            .run("test \"$VERBUMP_NEW_VERSION\" = 2.0.0", &env)
            .unwrap();
        assert_eq!(code, 0);
    }
}
