use crate::config::CommitParserConfig;
use crate::domain::{BumpLabel, ParsedCommit};

/// Infers a bump label from commit messages
pub trait CommitParser: Send + Sync {
    fn name(&self) -> &str;

    /// The strongest bump the commits call for, or `None` when none of them
    /// is relevant
    fn parse(&self, commits: &[String]) -> Option<BumpLabel>;
}

/// Conventional-commit analysis
pub struct ConventionalCommitParser {
    config: CommitParserConfig,
}

impl ConventionalCommitParser {
    pub fn new(config: CommitParserConfig) -> Self {
        ConventionalCommitParser { config }
    }

    fn is_breaking(&self, message: &str, parsed: &ParsedCommit) -> bool {
        if parsed.is_breaking_change {
            return true;
        }
        let lower = message.to_lowercase();
        self.config
            .breaking_change_indicators
            .iter()
            .any(|indicator| lower.contains(&indicator.to_lowercase()))
    }

    /// Classify a single message
    pub fn classify(&self, message: &str) -> Option<BumpLabel> {
        let parsed = ParsedCommit::parse(message);

        if self.is_breaking(message, &parsed) {
            return Some(BumpLabel::Major);
        }

        match parsed.r#type.as_str() {
            "feat" | "feature" => Some(BumpLabel::Minor),
            "fix" | "perf" => Some(BumpLabel::Patch),
            _ => None,
        }
    }
}

impl CommitParser for ConventionalCommitParser {
    fn name(&self) -> &str {
        "conventional-commits"
    }

    fn parse(&self, commits: &[String]) -> Option<BumpLabel> {
        let mut strongest: Option<BumpLabel> = None;

        for message in commits {
            match self.classify(message) {
                // Nothing outranks a breaking change
                Some(BumpLabel::Major) => return Some(BumpLabel::Major),
                Some(BumpLabel::Minor) => strongest = Some(BumpLabel::Minor),
                Some(BumpLabel::Patch) if strongest.is_none() => {
                    strongest = Some(BumpLabel::Patch)
                }
                _ => {}
            }
        }

        strongest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parser() -> ConventionalCommitParser {
        ConventionalCommitParser::new(CommitParserConfig::default())
    }

    fn msgs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("feat!: drop v1 api", Some(BumpLabel::Major))]
    #[case("refactor(core)!: rename", Some(BumpLabel::Major))]
    #[case("chore: bump\n\nBREAKING CHANGE: config moved", Some(BumpLabel::Major))]
    #[case("feat: add export", Some(BumpLabel::Minor))]
    #[case("Feat(ui): dark mode", Some(BumpLabel::Minor))]
    #[case("fix: off by one", Some(BumpLabel::Patch))]
    #[case("perf: faster walk", Some(BumpLabel::Patch))]
    #[case("docs: readme", None)]
    #[case("random text", None)]
    fn test_classify(#[case] message: &str, #[case] expected: Option<BumpLabel>) {
        assert_eq!(parser().classify(message), expected);
    }

    #[test]
    fn test_strongest_label_wins() {
        let p = parser();
        assert_eq!(
            p.parse(&msgs(&["fix: a", "feat: b", "docs: c"])),
            Some(BumpLabel::Minor)
        );
        assert_eq!(
            p.parse(&msgs(&["fix: a", "feat!: b", "feat: c"])),
            Some(BumpLabel::Major)
        );
        assert_eq!(p.parse(&msgs(&["fix: a", "chore: b"])), Some(BumpLabel::Patch));
    }

    #[test]
    fn test_no_relevant_commits() {
        assert_eq!(parser().parse(&msgs(&["docs: x", "chore: y"])), None);
        assert_eq!(parser().parse(&[]), None);
    }

    #[test]
    fn test_custom_breaking_indicator_case_insensitive() {
        let p = ConventionalCommitParser::new(CommitParserConfig {
            enabled: true,
            breaking_change_indicators: vec!["[breaking]".to_string()],
        });
        assert_eq!(p.classify("fix: tweak [BREAKING]"), Some(BumpLabel::Major));
        assert_eq!(p.classify("fix: tweak"), Some(BumpLabel::Patch));
    }
}
