use crate::domain::version::SemVersion;
use crate::error::Result;

/// Tag naming: `{prefix}{version}`, e.g. prefix `v` gives `v1.2.3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub prefix: String,
}

impl TagPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        TagPattern {
            prefix: prefix.into(),
        }
    }

    /// Format a version according to the pattern
    pub fn format(&self, version: &SemVersion) -> String {
        format!("{}{}", self.prefix, version)
    }

    /// Extract the version from a tag name carrying this prefix
    pub fn parse(&self, tag: &str) -> Option<Result<SemVersion>> {
        tag.strip_prefix(self.prefix.as_str())
            .map(SemVersion::parse)
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new("v")
    }
}
