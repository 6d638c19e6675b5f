//! Domain logic - pure version rules independent of files and git

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::BranchPattern;
pub use commit::ParsedCommit;
pub use prerelease::{increment_prerelease, PreRelease};
pub use tag::TagPattern;
pub use version::{BumpLabel, SemVersion};
