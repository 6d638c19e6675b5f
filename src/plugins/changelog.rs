//! Keep-a-changelog support: bump inference from the `Unreleased` section and
//! generation of release sections from commits

use crate::domain::{BumpLabel, ParsedCommit, SemVersion};
use crate::error::{BumpError, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Infers a bump label from a changelog
pub trait ChangelogParser: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the changelog has no pending entries
    fn infer_bump(&self) -> Result<Option<BumpLabel>>;
}

/// Writes a release section for a new version
pub trait ChangelogGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, version: &SemVersion, commits: &[String]) -> Result<()>;
}

pub struct KeepAChangelogParser {
    path: PathBuf,
}

impl KeepAChangelogParser {
    pub fn new(path: PathBuf) -> Self {
        KeepAChangelogParser { path }
    }
}

fn is_release_heading(line: &str) -> bool {
    line.starts_with("## ")
}

fn is_unreleased_heading(line: &str) -> bool {
    is_release_heading(line) && line.to_lowercase().contains("unreleased")
}

fn label_for_subsection(heading: &str) -> Option<BumpLabel> {
    let heading = heading.trim().to_lowercase();
    if heading.contains("breaking") || heading == "removed" {
        return Some(BumpLabel::Major);
    }
    match heading.as_str() {
        "added" | "changed" | "deprecated" => Some(BumpLabel::Minor),
        "fixed" | "security" => Some(BumpLabel::Patch),
        _ => None,
    }
}

/// Strongest bump called for by the `Unreleased` section of `text`.
///
/// Only subsections with at least one list entry count.
pub fn infer_from_unreleased(text: &str) -> Option<BumpLabel> {
    let mut in_unreleased = false;
    let mut current: Option<BumpLabel> = None;
    let mut strongest: Option<BumpLabel> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if is_release_heading(trimmed) {
            if in_unreleased {
                break;
            }
            in_unreleased = is_unreleased_heading(trimmed);
            continue;
        }
        if !in_unreleased {
            continue;
        }

        if let Some(heading) = trimmed.strip_prefix("### ") {
            current = label_for_subsection(heading);
        } else if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
            strongest = match (strongest, current) {
                (_, None) => strongest,
                (None, found) => found,
                (Some(a), Some(b)) => Some(stronger(a, b)),
            };
        }
    }

    strongest
}

fn rank(label: BumpLabel) -> u8 {
    match label {
        BumpLabel::Patch => 0,
        BumpLabel::Minor => 1,
        BumpLabel::Major => 2,
    }
}

fn stronger(a: BumpLabel, b: BumpLabel) -> BumpLabel {
    if rank(b) > rank(a) {
        b
    } else {
        a
    }
}

impl ChangelogParser for KeepAChangelogParser {
    fn name(&self) -> &str {
        "keep-a-changelog"
    }

    fn infer_bump(&self) -> Result<Option<BumpLabel>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no changelog to infer from");
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).map_err(|e| BumpError::io(&self.path, e))?;
        Ok(infer_from_unreleased(&text))
    }
}

/// Shared across parallel module tasks; `generate` holds `write_lock` while
/// it rewrites the file.
pub struct MarkdownChangelogGenerator {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MarkdownChangelogGenerator {
    pub fn new(path: PathBuf) -> Self {
        MarkdownChangelogGenerator {
            path,
            write_lock: Mutex::new(()),
        }
    }
}

const GROUPS: [(&str, &str); 4] = [
    ("breaking", "Breaking Changes"),
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance"),
];

/// Render the release section for `version`
pub fn render_section(version: &SemVersion, date: NaiveDate, commits: &[String]) -> String {
    let parsed: Vec<ParsedCommit> = commits.iter().map(|m| ParsedCommit::parse(m)).collect();
    let mut out = format!("## [{}] - {}\n", version, date.format("%Y-%m-%d"));

    let mut any = false;
    for (key, title) in GROUPS {
        let entries: Vec<&ParsedCommit> = parsed
            .iter()
            .filter(|c| {
                if key == "breaking" {
                    c.is_breaking_change
                } else {
                    !c.is_breaking_change && c.r#type == key
                }
            })
            .collect();
        if entries.is_empty() {
            continue;
        }

        any = true;
        out.push_str(&format!("\n### {}\n\n", title));
        for commit in entries {
            match &commit.scope {
                Some(scope) => out.push_str(&format!("- **{}**: {}\n", scope, commit.description)),
                None => out.push_str(&format!("- {}\n", commit.description)),
            }
        }
    }

    if !any {
        out.push_str("\nNo notable changes.\n");
    }
    out
}

/// Insert `section` above the newest release, below any `Unreleased` block
pub fn insert_section(existing: &str, section: &str) -> String {
    let lines: Vec<&str> = existing.lines().collect();
    let position = lines
        .iter()
        .position(|l| is_release_heading(l) && !is_unreleased_heading(l));

    match position {
        Some(index) => {
            let mut out = lines[..index].join("\n");
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(section);
            out.push('\n');
            out.push_str(&lines[index..].join("\n"));
            out.push('\n');
            out
        }
        None => {
            let mut out = existing.trim_end().to_string();
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(section);
            out
        }
    }
}

impl ChangelogGenerator for MarkdownChangelogGenerator {
    fn name(&self) -> &str {
        "markdown"
    }

    fn generate(&self, version: &SemVersion, commits: &[String]) -> Result<()> {
        let section = render_section(version, chrono::Local::now().date_naive(), commits);
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BumpError::plugin("changelog lock poisoned"))?;

        let existing = if self.path.exists() {
            fs::read_to_string(&self.path).map_err(|e| BumpError::io(&self.path, e))?
        } else {
            "# Changelog\n".to_string()
        };
        fs::write(&self.path, insert_section(&existing, &section))
            .map_err(|e| BumpError::io(&self.path, e))?;

        tracing::info!(path = %self.path.display(), version = %version, "changelog updated");
        Ok(())
    }
}
