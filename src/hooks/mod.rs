//! User-defined shell hooks
//!
//! Hooks run at two points of a bump:
//! - pre-release: before anything is mutated; a failure aborts the bump
//! - post-bump: after everything else; failures are reported only

pub mod executor;
pub mod lifecycle;

pub use executor::{CommandRunner, HookExecutor, ShellRunner};
pub use lifecycle::{HookContext, HookType};
