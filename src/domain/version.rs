use crate::error::{BumpError, Result};
use std::fmt;
use std::str::FromStr;

/// Semantic version value: `major.minor.patch[-pre_release][+build]`
///
/// Immutable by convention: every bump returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SemVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: String,
    pub build: String,
}

/// Numeric bump label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpLabel {
    Patch,
    Minor,
    Major,
}

impl BumpLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpLabel::Patch => "patch",
            BumpLabel::Minor => "minor",
            BumpLabel::Major => "major",
        }
    }
}

impl FromStr for BumpLabel {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(BumpLabel::Patch),
            "minor" => Ok(BumpLabel::Minor),
            "major" => Ok(BumpLabel::Major),
            other => Err(BumpError::InvalidBumpLabel(other.to_string())),
        }
    }
}

impl fmt::Display for BumpLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when `ident` is a valid pre-release or build identifier:
/// non-empty and made only of `[0-9A-Za-z.-]`.
pub fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

impl SemVersion {
    /// Create a final (no pre-release, no build) version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemVersion {
            major,
            minor,
            patch,
            pre_release: String::new(),
            build: String::new(),
        }
    }

    /// Parse a version string, accepting an optional leading `v`.
    ///
    /// The three numeric components may be any run of characters other than
    /// `.`, `-` and `+`, but must then parse as decimal integers.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || BumpError::InvalidVersionFormat(text.to_string());
        let clean = text.strip_prefix('v').unwrap_or(text);

        let (rest, build) = match clean.split_once('+') {
            Some((rest, build)) => {
                if !is_valid_identifier(build) {
                    return Err(invalid());
                }
                (rest, build)
            }
            None => (clean, ""),
        };

        let (core, pre_release) = match rest.split_once('-') {
            Some((core, pre)) => {
                if !is_valid_identifier(pre) {
                    return Err(invalid());
                }
                (core, pre)
            }
            None => (rest, ""),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }

        let number = |part: &str| part.parse::<u64>().map_err(|_| invalid());

        Ok(SemVersion {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
            pre_release: pre_release.to_string(),
            build: build.to_string(),
        })
    }

    pub fn is_pre_release(&self) -> bool {
        !self.pre_release.is_empty()
    }

    /// Return a copy with the given pre-release label (empty clears it)
    pub fn with_pre_release(&self, pre_release: &str) -> Result<Self> {
        if !pre_release.is_empty() && !is_valid_identifier(pre_release) {
            return Err(BumpError::InvalidVersionFormat(format!(
                "invalid pre-release identifier '{}'",
                pre_release
            )));
        }
        Ok(SemVersion {
            pre_release: pre_release.to_string(),
            ..self.clone()
        })
    }

    /// Return a copy with the given build metadata (empty clears it)
    pub fn with_build(&self, build: &str) -> Result<Self> {
        if !build.is_empty() && !is_valid_identifier(build) {
            return Err(BumpError::InvalidVersionFormat(format!(
                "invalid build metadata '{}'",
                build
            )));
        }
        Ok(SemVersion {
            build: build.to_string(),
            ..self.clone()
        })
    }

    /// Bump by a numeric label.
    ///
    /// - **Patch**: patch += 1; pre-release and build are left for the caller
    /// - **Minor**: minor += 1, patch = 0, pre-release and build cleared
    /// - **Major**: major += 1, minor = patch = 0, pre-release and build cleared
    pub fn bump_by_label(&self, label: BumpLabel) -> Self {
        match label {
            BumpLabel::Patch => SemVersion {
                patch: self.patch + 1,
                ..self.clone()
            },
            BumpLabel::Minor => SemVersion::new(self.major, self.minor + 1, 0),
            BumpLabel::Major => SemVersion::new(self.major + 1, 0, 0),
        }
    }

    /// String-label variant of [`SemVersion::bump_by_label`]
    pub fn bump_by_label_str(&self, label: &str) -> Result<Self> {
        Ok(self.bump_by_label(label.parse()?))
    }

    /// Heuristic next version.
    ///
    /// A pre-release is promoted to its final version. `0.9.0` moves to
    /// `0.10.0`. Everything else gets a patch bump.
    pub fn bump_next(&self) -> Self {
        if self.is_pre_release() {
            return self.promote();
        }
        if self.major == 0 && self.minor == 9 && self.patch == 0 {
            return SemVersion {
                minor: 10,
                patch: 0,
                ..self.clone()
            };
        }
        SemVersion {
            patch: self.patch + 1,
            ..self.clone()
        }
    }

    /// Strip the pre-release label, keeping numbers and build metadata
    pub fn promote(&self) -> Self {
        SemVersion {
            pre_release: String::new(),
            ..self.clone()
        }
    }

    /// Convert to a `semver::Version` for precedence comparisons
    pub fn to_semver(&self) -> Result<semver::Version> {
        semver::Version::parse(&self.to_string())
            .map_err(|e| BumpError::InvalidVersionFormat(format!("{}: {}", self, e)))
    }
}

impl FromStr for SemVersion {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        SemVersion::parse(s)
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}
