//! User interface output.
//!
//! Status lines are printed for people; machine-readable detail goes through
//! `tracing`.

pub mod formatter;

pub use formatter::{
    display_error, display_execution_results, display_outcome, display_status, display_success,
    display_warning,
};
