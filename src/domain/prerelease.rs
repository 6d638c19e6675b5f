//! Pre-release label iteration
//!
//! A pre-release label is a base identifier with an optional numeric
//! iteration, e.g. `alpha`, `beta.1`, `rc.12`.

use std::fmt;

/// Pre-release label split into its base and optional iteration number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub base: String,
    pub iteration: Option<u64>,
}

impl PreRelease {
    pub fn new(base: impl Into<String>, iteration: Option<u64>) -> Self {
        PreRelease {
            base: base.into(),
            iteration,
        }
    }

    /// Split a label at its last `.` when what follows is numeric.
    ///
    /// # Examples
    /// ```ignore
    /// assert_eq!(PreRelease::split("beta.2"), PreRelease::new("beta", Some(2)));
    /// assert_eq!(PreRelease::split("beta"), PreRelease::new("beta", None));
    /// ```
    pub fn split(label: &str) -> Self {
        if let Some((base, tail)) = label.rsplit_once('.') {
            if let Ok(n) = tail.parse::<u64>() {
                return PreRelease::new(base, Some(n));
            }
        }
        PreRelease::new(label, None)
    }

    /// Next iteration: `None` becomes 1, otherwise n + 1
    pub fn increment_iteration(&self) -> Self {
        PreRelease {
            base: self.base.clone(),
            iteration: Some(self.iteration.map_or(1, |n| n + 1)),
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(n) = self.iteration {
            write!(f, ".{}", n)?;
        }
        Ok(())
    }
}

/// Compute the next pre-release label for `base` given the current one.
///
/// `base.N` becomes `base.(N+1)`; anything else (`base` itself, another
/// label, empty) restarts at `base.1`.
pub fn increment_prerelease(current: &str, base: &str) -> String {
    let parsed = PreRelease::split(current);
    if parsed.base == base && parsed.iteration.is_some() {
        return parsed.increment_iteration().to_string();
    }
    PreRelease::new(base, Some(1)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_existing_iteration() {
        assert_eq!(increment_prerelease("alpha.1", "alpha"), "alpha.2");
    }

    #[test]
    fn test_increment_bare_label() {
        assert_eq!(increment_prerelease("alpha", "alpha"), "alpha.1");
    }

    #[test]
    fn test_increment_different_label() {
        assert_eq!(increment_prerelease("beta", "alpha"), "alpha.1");
        assert_eq!(increment_prerelease("beta.4", "alpha"), "alpha.1");
    }

    #[test]
    fn test_increment_empty_current() {
        assert_eq!(increment_prerelease("", "rc"), "rc.1");
    }

    #[test]
    fn test_increment_high_number() {
        assert_eq!(increment_prerelease("rc.99", "rc"), "rc.100");
    }

    #[test]
    fn test_increment_dotted_base() {
        assert_eq!(increment_prerelease("pre.alpha.3", "pre.alpha"), "pre.alpha.4");
    }

    #[test]
    fn test_split_non_numeric_tail() {
        let pr = PreRelease::split("beta.abc");
        assert_eq!(pr.base, "beta.abc");
        assert_eq!(pr.iteration, None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PreRelease::new("rc", Some(2)).to_string(), "rc.2");
        assert_eq!(PreRelease::new("alpha", None).to_string(), "alpha");
    }
}
