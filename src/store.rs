//! Version file persistence
//!
//! The version file holds a single line, `MAJOR.MINOR.PATCH[-PRE][+BUILD]`,
//! and is written with owner-only permissions.

use crate::domain::SemVersion;
use crate::error::{BumpError, Result};
use crate::git::TagProvider;
use crate::ui;
use std::fs;
use std::path::Path;

/// Version written by [initialize_if_missing] when no tag can be used
pub const INITIAL_VERSION: &str = "0.1.0";

/// Read and parse the version file
pub fn read(path: &Path) -> Result<SemVersion> {
    let text = fs::read_to_string(path).map_err(|e| BumpError::io(path, e))?;
    SemVersion::parse(text.trim())
}

/// Write the version file, creating parent directories as needed
pub fn save(path: &Path, version: &SemVersion) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| BumpError::io(parent, e))?;
        }
    }

    fs::write(path, format!("{}\n", version)).map_err(|e| BumpError::io(path, e))?;
    restrict_permissions(path)?;

    tracing::debug!(path = %path.display(), version = %version, "version file written");
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| BumpError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Create the version file if it does not exist yet.
///
/// The initial value comes from the latest tag when it parses as a version,
/// otherwise [INITIAL_VERSION].
///
/// # Returns
/// * `Ok(true)` - The file was created
/// * `Ok(false)` - The file already existed and was left alone
pub fn initialize_if_missing(path: &Path, tags: &dyn TagProvider) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let version = version_from_latest_tag(tags).unwrap_or_else(|| SemVersion::new(0, 1, 0));
    save(path, &version)?;

    tracing::info!(path = %path.display(), version = %version, "initialized version file");
    ui::display_status(&format!(
        "Initialized {} with version {}",
        path.display(),
        version
    ));
    Ok(true)
}

fn version_from_latest_tag(tags: &dyn TagProvider) -> Option<SemVersion> {
    match tags.describe_latest_tag() {
        Ok(Some(tag)) => match SemVersion::parse(&tag) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::debug!(tag = %tag, error = %e, "latest tag is not a version");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(error = %e, "could not read latest tag");
            None
        }
    }
}
