use regex::Regex;

/// Branch name pattern with `*` wildcards, e.g. `release/*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPattern {
    pub pattern: String,
}

impl BranchPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        BranchPattern {
            pattern: pattern.into(),
        }
    }

    /// Check whether a branch name matches this pattern
    pub fn matches(&self, branch: &str) -> bool {
        if !self.pattern.contains('*') {
            return self.pattern == branch;
        }

        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped.replace(r"\*", ".*");

        Regex::new(&format!("^{}$", regex_pattern))
            .map(|re| re.is_match(branch))
            .unwrap_or(false)
    }
}

/// True when any of the patterns matches the branch
pub fn matches_any(patterns: &[String], branch: &str) -> bool {
    patterns
        .iter()
        .any(|p| BranchPattern::new(p.as_str()).matches(branch))
}
