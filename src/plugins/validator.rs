use crate::config::ValidationRule;
use crate::domain::{BranchPattern, SemVersion};
use crate::error::{BumpError, Result};
use crate::git::RepositoryInfo;
use regex::Regex;
use std::sync::Arc;

/// Version policy checked before the version file is written
pub trait VersionValidator: Send + Sync {
    fn name(&self) -> &str;

    /// Check `new` against the policy.
    ///
    /// `bump_type` is the resolved bump (`patch`, `minor`, `major`,
    /// `release` or `pre`).
    fn validate(&self, new: &SemVersion, previous: &SemVersion, bump_type: &str) -> Result<()>;
}

/// Validates against a list of configured rules; the first violation wins
pub struct RuleValidator {
    rules: Vec<ValidationRule>,
    repo: Arc<dyn RepositoryInfo>,
}

impl RuleValidator {
    pub fn new(rules: Vec<ValidationRule>, repo: Arc<dyn RepositoryInfo>) -> Self {
        RuleValidator { rules, repo }
    }

    fn check_rule(
        &self,
        rule: &ValidationRule,
        new: &SemVersion,
        previous: &SemVersion,
        bump_type: &str,
    ) -> Result<()> {
        match rule {
            ValidationRule::MajorVersionMax { value } if new.major > *value => Err(
                BumpError::validation(format!("major version {} exceeds maximum {}", new.major, value)),
            ),
            ValidationRule::MinorVersionMax { value } if new.minor > *value => Err(
                BumpError::validation(format!("minor version {} exceeds maximum {}", new.minor, value)),
            ),
            ValidationRule::PatchVersionMax { value } if new.patch > *value => Err(
                BumpError::validation(format!("patch version {} exceeds maximum {}", new.patch, value)),
            ),
            ValidationRule::PreReleaseFormat { pattern } => {
                if !new.is_pre_release() {
                    return Ok(());
                }
                let re = Regex::new(pattern).map_err(|e| {
                    BumpError::config(format!("invalid pre-release pattern '{}': {}", pattern, e))
                })?;
                if re.is_match(&new.pre_release) {
                    Ok(())
                } else {
                    Err(BumpError::validation(format!(
                        "pre-release '{}' does not match '{}'",
                        new.pre_release, pattern
                    )))
                }
            }
            ValidationRule::RequirePreReleaseFor0x if new.major == 0 && !new.is_pre_release() => {
                Err(BumpError::validation(format!(
                    "{} is a 0.x version without a pre-release label",
                    new
                )))
            }
            ValidationRule::NoDowngrade => {
                let mut next = new.to_semver()?;
                let mut prev = previous.to_semver()?;
                // Build metadata has no precedence
                next.build = semver::BuildMetadata::EMPTY;
                prev.build = semver::BuildMetadata::EMPTY;
                if next < prev {
                    Err(BumpError::validation(format!(
                        "{} would downgrade from {}",
                        new, previous
                    )))
                } else {
                    Ok(())
                }
            }
            ValidationRule::BranchConstraint { branch, allowed } => {
                let Some(current) = self.repo.current_branch()? else {
                    return Ok(());
                };
                if BranchPattern::new(branch.as_str()).matches(&current)
                    && !allowed.iter().any(|a| a == bump_type)
                {
                    return Err(BumpError::validation(format!(
                        "{} bumps are not allowed on branch '{}' (allowed: {})",
                        bump_type,
                        current,
                        allowed.join(", ")
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl VersionValidator for RuleValidator {
    fn name(&self) -> &str {
        "rules"
    }

    fn validate(&self, new: &SemVersion, previous: &SemVersion, bump_type: &str) -> Result<()> {
        for rule in &self.rules {
            self.check_rule(rule, new, previous, bump_type)?;
        }
        tracing::debug!(version = %new, rules = self.rules.len(), "version validated");
        Ok(())
    }
}
