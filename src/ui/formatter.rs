//! Pure formatting functions for UI output.
//!
//! Informational lines go to stdout, errors and warnings to stderr.

use crate::bump::BumpOutcome;
use crate::warning::BumpWarning;
use crate::workspace::{self, ExecutionResult};
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a bump warning to the user.
pub fn display_warning(warning: &BumpWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One-line summary of a bump, e.g. `1.2.3 → 1.3.0 (minor, tag v1.3.0)`
pub fn format_outcome(outcome: &BumpOutcome) -> String {
    let mut detail = outcome.bump_type.clone();
    if let Some(tag) = &outcome.tag {
        detail.push_str(&format!(", tag {}", tag));
    }
    format!("{} → {} ({})", outcome.previous, outcome.new, detail)
}

/// Display the result of a single-module bump.
///
/// Shows the version change followed by any warnings.
pub fn display_outcome(outcome: &BumpOutcome) {
    println!(
        "{} {}",
        style("✓").green(),
        style(format_outcome(outcome)).bold()
    );
    for warning in &outcome.warnings {
        display_warning(warning);
    }
}

/// One line per module
pub fn format_result_line(result: &ExecutionResult) -> String {
    let old = result
        .old_version
        .as_ref()
        .map_or_else(|| "?".to_string(), ToString::to_string);
    let millis = result.duration.as_millis();

    match &result.error {
        None => {
            let new = result
                .new_version
                .as_ref()
                .map_or_else(|| "?".to_string(), ToString::to_string);
            format!("{}: {} → {} ({} ms)", result.module.name, old, new, millis)
        }
        Some(e) => format!("{}: {} ({} ms)", result.module.name, e, millis),
    }
}

/// Aggregate line, e.g. `2 succeeded, 1 failed in 140 ms`
pub fn format_summary(results: &[ExecutionResult]) -> String {
    format!(
        "{} succeeded, {} failed in {} ms",
        workspace::success_count(results),
        workspace::error_count(results),
        workspace::total_duration(results).as_millis()
    )
}

/// Display per-module results of a workspace run, in input order.
pub fn display_execution_results(results: &[ExecutionResult]) {
    println!("\n{}", style("Workspace results:").bold());
    for result in results {
        if result.success {
            println!("  {} {}", style("✓").green(), format_result_line(result));
        } else {
            eprintln!("  {} {}", style("✗").red(), format_result_line(result));
        }
        for warning in &result.warnings {
            eprintln!("    {} {}", style("⚠").yellow(), warning);
        }
    }
    println!("{}", style(format_summary(results)).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemVersion;
    use crate::error::BumpError;
    use crate::workspace::Module;
    use std::sync::Arc;
    use std::time::Duration;

    fn outcome(tag: Option<&str>) -> BumpOutcome {
        BumpOutcome {
            previous: SemVersion::new(1, 2, 3),
            new: SemVersion::new(1, 3, 0),
            bump_type: "minor".to_string(),
            tag: tag.map(str::to_string),
            warnings: Vec::new(),
        }
    }

    fn result(name: &str, error: Option<BumpError>) -> ExecutionResult {
        ExecutionResult {
            module: Module::new(name, "x/.version"),
            old_version: Some(SemVersion::new(1, 0, 0)),
            new_version: Some(SemVersion::new(1, 1, 0)),
            success: error.is_none(),
            error: error.map(Arc::new),
            warnings: Vec::new(),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_format_outcome() {
        assert_eq!(format_outcome(&outcome(None)), "1.2.3 → 1.3.0 (minor)");
        assert_eq!(
            format_outcome(&outcome(Some("v1.3.0"))),
            "1.2.3 → 1.3.0 (minor, tag v1.3.0)"
        );
    }

    #[test]
    fn test_format_result_lines() {
        assert_eq!(
            format_result_line(&result("api", None)),
            "api: 1.0.0 → 1.1.0 (12 ms)"
        );
        assert_eq!(
            format_result_line(&result("web", Some(BumpError::TagExists("v1.1.0".into())))),
            "web: Tag 'v1.1.0' already exists (12 ms)"
        );
    }

    #[test]
    fn test_format_summary() {
        let results = vec![
            result("a", None),
            result("b", Some(BumpError::Cancelled)),
        ];
        assert_eq!(format_summary(&results), "1 succeeded, 1 failed in 24 ms");
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_outcome(&outcome(Some("v1.3.0")));
        display_execution_results(&[result("a", None)]);
    }
}
