//! Keeps copies of the version in other files in step with the version file

use crate::config::{DependencyCheckConfig, SyncFile, SyncFormat};
use crate::domain::SemVersion;
use crate::error::{BumpError, Result};
use regex::Regex;
use std::fs;
use std::path::PathBuf;

/// A file whose version differs from the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDrift {
    pub path: PathBuf,
    /// `None` when the field is missing
    pub found: Option<String>,
    pub expected: String,
}

pub trait DependencyChecker: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite files after a bump instead of only reporting drift
    fn auto_sync(&self) -> bool;

    /// Files that do not carry `version`
    fn check(&self, version: &SemVersion) -> Result<Vec<VersionDrift>>;

    /// Write `version` into every drifted file, returning the files changed
    fn sync(&self, version: &SemVersion) -> Result<Vec<PathBuf>>;
}

pub struct FileDependencyChecker {
    config: DependencyCheckConfig,
}

impl FileDependencyChecker {
    pub fn new(config: DependencyCheckConfig) -> Self {
        FileDependencyChecker { config }
    }

    fn read(file: &SyncFile) -> Result<String> {
        fs::read_to_string(&file.path).map_err(|e| BumpError::io(&file.path, e))
    }

    /// Returns whether the file was rewritten
    fn sync_file(file: &SyncFile, expected: &str) -> Result<bool> {
        let text = Self::read(file)?;
        if extract(&text, file)?.as_deref() == Some(expected) {
            return Ok(false);
        }
        let updated = replace(&text, file, expected)?;
        fs::write(&file.path, updated).map_err(|e| BumpError::io(&file.path, e))?;
        Ok(true)
    }
}

impl DependencyChecker for FileDependencyChecker {
    fn name(&self) -> &str {
        "files"
    }

    fn auto_sync(&self) -> bool {
        self.config.auto_sync
    }

    fn check(&self, version: &SemVersion) -> Result<Vec<VersionDrift>> {
        let expected = version.to_string();
        let mut drift = Vec::new();

        let mut failures = Vec::new();

        for file in &self.config.files {
            let found = match Self::read(file).and_then(|text| extract(&text, file)) {
                Ok(found) => found,
                Err(e) => {
                    failures.push(e);
                    continue;
                }
            };
            if found.as_deref() != Some(expected.as_str()) {
                drift.push(VersionDrift {
                    path: file.path.clone(),
                    found,
                    expected: expected.clone(),
                });
            }
        }

        combine(failures)?;
        Ok(drift)
    }

    fn sync(&self, version: &SemVersion) -> Result<Vec<PathBuf>> {
        let expected = version.to_string();
        let mut written = Vec::new();

        let mut failures = Vec::new();

        for file in &self.config.files {
            match Self::sync_file(file, &expected) {
                Ok(true) => {
                    tracing::info!(path = %file.path.display(), version = %expected, "synced version");
                    written.push(file.path.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "version sync failed");
                    failures.push(e);
                }
            }
        }

        combine(failures)?;
        Ok(written)
    }
}

/// Every file is attempted; the failures are reported together
fn combine(mut failures: Vec<BumpError>) -> Result<()> {
    if failures.len() > 1 {
        let message = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(BumpError::plugin(message));
    }
    match failures.pop() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn field_of(file: &SyncFile) -> Result<&str> {
    file.field.as_deref().ok_or_else(|| {
        BumpError::config(format!("{} needs a 'field' for its format", file.path.display()))
    })
}

fn pattern_of(file: &SyncFile) -> Result<Regex> {
    let pattern = file
        .pattern
        .as_deref()
        .ok_or_else(|| BumpError::config(format!("{} needs a 'pattern'", file.path.display())))?;
    Regex::new(pattern).map_err(|e| BumpError::config(format!("invalid pattern '{}': {}", pattern, e)))
}

fn parse_error(file: &SyncFile, e: impl std::fmt::Display) -> BumpError {
    BumpError::serialization(format!("{}: {}", file.path.display(), e))
}

/// Current version string held by `text`
pub fn extract(text: &str, file: &SyncFile) -> Result<Option<String>> {
    match file.format {
        SyncFormat::Raw => Ok(Some(text.trim().to_string()).filter(|s| !s.is_empty())),
        SyncFormat::Regex => Ok(pattern_of(file)?
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())),
        SyncFormat::Json => {
            let root: serde_json::Value =
                serde_json::from_str(text).map_err(|e| parse_error(file, e))?;
            Ok(field_of(file)?
                .split('.')
                .try_fold(&root, |v, seg| v.get(seg))
                .and_then(|v| v.as_str())
                .map(str::to_string))
        }
        SyncFormat::Yaml => {
            let root: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| parse_error(file, e))?;
            Ok(field_of(file)?
                .split('.')
                .try_fold(&root, |v, seg| v.get(seg))
                .and_then(|v| v.as_str())
                .map(str::to_string))
        }
        SyncFormat::Toml => {
            let doc: toml_edit::DocumentMut = text.parse().map_err(|e| parse_error(file, e))?;
            Ok(field_of(file)?
                .split('.')
                .try_fold(doc.as_item(), |item, seg| item.get(seg))
                .and_then(|item| item.as_str())
                .map(str::to_string))
        }
    }
}

fn missing_field(file: &SyncFile, field: &str) -> BumpError {
    BumpError::plugin(format!("{}: field '{}' not found", file.path.display(), field))
}

/// `text` with its version replaced by `version`
pub fn replace(text: &str, file: &SyncFile, version: &str) -> Result<String> {
    match file.format {
        SyncFormat::Raw => Ok(format!("{}\n", version)),
        SyncFormat::Regex => {
            let re = pattern_of(file)?;
            let group = re
                .captures(text)
                .and_then(|c| c.get(1))
                .ok_or_else(|| {
                    BumpError::plugin(format!("{}: pattern did not match", file.path.display()))
                })?;
            Ok(format!(
                "{}{}{}",
                &text[..group.start()],
                version,
                &text[group.end()..]
            ))
        }
        SyncFormat::Json => {
            let field = field_of(file)?;
            let mut root: serde_json::Value =
                serde_json::from_str(text).map_err(|e| parse_error(file, e))?;
            let slot = field
                .split('.')
                .try_fold(&mut root, |v, seg| v.get_mut(seg))
                .ok_or_else(|| missing_field(file, field))?;
            *slot = serde_json::Value::String(version.to_string());
            let out = serde_json::to_string_pretty(&root).map_err(|e| parse_error(file, e))?;
            Ok(format!("{}\n", out))
        }
        SyncFormat::Yaml => {
            let field = field_of(file)?;
            let mut root: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| parse_error(file, e))?;
            let slot = field
                .split('.')
                .try_fold(&mut root, |v, seg| v.get_mut(seg))
                .ok_or_else(|| missing_field(file, field))?;
            *slot = serde_yaml::Value::String(version.to_string());
            serde_yaml::to_string(&root).map_err(|e| parse_error(file, e))
        }
        SyncFormat::Toml => {
            let field = field_of(file)?;
            let mut doc: toml_edit::DocumentMut = text.parse().map_err(|e| parse_error(file, e))?;
            let slot = field
                .split('.')
                .try_fold(doc.as_item_mut(), |item, seg| item.get_mut(seg))
                .and_then(|item| item.as_value_mut())
                .ok_or_else(|| missing_field(file, field))?;
            let decor = slot.decor().clone();
            *slot = toml_edit::Value::from(version);
            *slot.decor_mut() = decor;
            Ok(doc.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sync_file(path: PathBuf, format: SyncFormat, field: Option<&str>, pattern: Option<&str>) -> SyncFile {
        SyncFile {
            path,
            format,
            field: field.map(str::to_string),
            pattern: pattern.map(str::to_string),
        }
    }

    #[test]
    fn test_json_keeps_key_order() {
        let file = sync_file(PathBuf::from("package.json"), SyncFormat::Json, Some("version"), None);
        let text = "{\n  \"name\": \"web\",\n  \"version\": \"1.0.0\",\n  \"author\": \"x\"\n}\n";

        assert_eq!(extract(text, &file).unwrap(), Some("1.0.0".to_string()));
        let out = replace(text, &file, "1.1.0").unwrap();
        assert_eq!(
            out,
            "{\n  \"name\": \"web\",\n  \"version\": \"1.1.0\",\n  \"author\": \"x\"\n}\n"
        );
    }

    #[test]
    fn test_yaml_nested_field() {
        let file = sync_file(PathBuf::from("chart.yaml"), SyncFormat::Yaml, Some("app.version"), None);
        let text = "app:\n  name: api\n  version: 0.3.0\n";

        let out = replace(text, &file, "0.4.0").unwrap();
        assert_eq!(extract(&out, &file).unwrap(), Some("0.4.0".to_string()));
        assert!(out.contains("name: api"));
    }

    #[test]
    fn test_toml_preserves_comments() {
        let file = sync_file(PathBuf::from("Cargo.toml"), SyncFormat::Toml, Some("package.version"), None);
        let text = "# crate manifest\n[package]\nname = \"demo\"\nversion = \"0.1.0\" # bumped by ci\n";

        let out = replace(text, &file, "0.2.0").unwrap();
        assert_eq!(
            out,
            "# crate manifest\n[package]\nname = \"demo\"\nversion = \"0.2.0\" # bumped by ci\n"
        );
    }

    #[test]
    fn test_toml_missing_field() {
        let file = sync_file(PathBuf::from("Cargo.toml"), SyncFormat::Toml, Some("package.version"), None);
        assert!(replace("[package]\nname = \"x\"\n", &file, "1.0.0").is_err());
        assert_eq!(extract("[package]\nname = \"x\"\n", &file).unwrap(), None);
    }

    #[test]
    fn test_regex_replaces_first_group_only() {
        let file = sync_file(
            PathBuf::from("version.go"),
            SyncFormat::Regex,
            None,
            Some(r#"Version = "([^"]+)""#),
        );
        let text = "package main\n\nconst Version = \"1.2.3\"\n";

        assert_eq!(extract(text, &file).unwrap(), Some("1.2.3".to_string()));
        assert_eq!(
            replace(text, &file, "1.3.0").unwrap(),
            "package main\n\nconst Version = \"1.3.0\"\n"
        );
    }

    #[test]
    fn test_raw_file() {
        let file = sync_file(PathBuf::from("VERSION"), SyncFormat::Raw, None, None);
        assert_eq!(extract("2.0.0\n", &file).unwrap(), Some("2.0.0".to_string()));
        assert_eq!(replace("2.0.0\n", &file, "2.0.1").unwrap(), "2.0.1\n");
    }

    #[test]
    fn test_check_and_sync_on_disk() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("package.json");
        let raw = dir.path().join("VERSION");
        fs::write(&json, "{\"version\": \"1.0.0\"}").unwrap();
        fs::write(&raw, "1.1.0\n").unwrap();

        let checker = FileDependencyChecker::new(DependencyCheckConfig {
            enabled: true,
            auto_sync: true,
            files: vec![
                sync_file(json.clone(), SyncFormat::Json, Some("version"), None),
                sync_file(raw.clone(), SyncFormat::Raw, None, None),
            ],
        });
        let version = SemVersion::new(1, 1, 0);

        let drift = checker.check(&version).unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].path, json);
        assert_eq!(drift[0].found.as_deref(), Some("1.0.0"));

        let written = checker.sync(&version).unwrap();
        assert_eq!(written, vec![json.clone()]);
        assert!(checker.check(&version).unwrap().is_empty());
    }

    #[test]
    fn test_sync_missing_file_is_io_error() {
        let checker = FileDependencyChecker::new(DependencyCheckConfig {
            enabled: true,
            auto_sync: true,
            files: vec![sync_file(PathBuf::from("/nonexistent/VERSION"), SyncFormat::Raw, None, None)],
        });
        assert!(matches!(
            checker.sync(&SemVersion::new(1, 0, 0)),
            Err(BumpError::Io { .. })
        ));
    }

    #[test]
    fn test_sync_continues_past_failing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let raw = dir.path().join("VERSION");
        let json = dir.path().join("package.json");
        fs::write(&raw, "1.0.0\n").unwrap();
        fs::write(&json, "{\"name\": \"x\"}").unwrap();

        let checker = FileDependencyChecker::new(DependencyCheckConfig {
            enabled: true,
            auto_sync: true,
            files: vec![
                sync_file(missing.clone(), SyncFormat::Raw, None, None),
                sync_file(json.clone(), SyncFormat::Json, Some("version"), None),
                sync_file(raw.clone(), SyncFormat::Raw, None, None),
            ],
        });
        let version = SemVersion::new(2, 0, 0);

        let err = checker.sync(&version).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing"), "{}", message);
        assert!(message.contains("package.json"), "{}", message);
        assert_eq!(fs::read_to_string(&raw).unwrap(), "2.0.0\n");

        assert!(checker.check(&version).is_err());
    }

    #[test]
    fn test_check_continues_past_failing_file() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("VERSION");
        fs::write(&raw, "1.0.0\n").unwrap();

        let checker = FileDependencyChecker::new(DependencyCheckConfig {
            enabled: true,
            auto_sync: false,
            files: vec![
                sync_file(dir.path().join("missing"), SyncFormat::Raw, None, None),
                sync_file(raw, SyncFormat::Raw, None, None),
            ],
        });
        assert!(matches!(
            checker.check(&SemVersion::new(1, 0, 0)),
            Err(BumpError::Io { .. })
        ));
    }
}
