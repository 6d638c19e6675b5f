use crate::error::{BumpError, Result};
use crate::git::{CommitHistoryProvider, RepositoryInfo, TagProvider, FALLBACK_COMMIT_WINDOW};
use git2::{Oid, Repository as Git2Repo};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// `git2` backed implementation of the provider traits
///
/// `git2::Repository` is `Send` but not `Sync`, so the handle sits behind a
/// mutex; every call holds the lock for its whole duration.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    remote: String,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
            remote: "origin".to_string(),
        }
    }

    /// Remote used by [TagProvider::push_tag]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| BumpError::Git(git2::Error::from_str("repository lock poisoned")))
    }

    fn head_oid(repo: &Git2Repo) -> Result<Oid> {
        Ok(repo.head()?.peel_to_commit()?.id())
    }

    fn resolve_commit(repo: &Git2Repo, rev: &str) -> Result<Oid> {
        Ok(repo.revparse_single(rev)?.peel_to_commit()?.id())
    }

    /// Walk back from HEAD and return the first tag pointing at a visited
    /// commit. Handles lightweight and annotated tags.
    fn latest_tag(repo: &Git2Repo) -> Result<Option<String>> {
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let head_oid = head.peel_to_commit()?.id();

        let mut tag_oids: HashMap<Oid, String> = HashMap::new();
        let tags = repo.tag_names(None)?;
        for tag_name in tags.iter().flatten() {
            if let Ok(tag_ref) = repo.find_reference(&format!("refs/tags/{}", tag_name)) {
                if let Ok(commit) = tag_ref.peel(git2::ObjectType::Commit) {
                    tag_oids.insert(commit.id(), tag_name.to_string());
                }
            }
        }
        if tag_oids.is_empty() {
            return Ok(None);
        }

        let mut revwalk = repo.revwalk()?;
        revwalk.push(head_oid)?;
        for oid in revwalk {
            let oid = oid?;
            if let Some(tag_name) = tag_oids.get(&oid) {
                return Ok(Some(tag_name.clone()));
            }
        }

        Ok(None)
    }
}

impl CommitHistoryProvider for Git2Repository {
    fn commits(&self, since: Option<&str>, until: Option<&str>) -> Result<Vec<String>> {
        let repo = self.lock()?;

        let until_oid = match until {
            Some(rev) => Self::resolve_commit(&repo, rev)?,
            None => Self::head_oid(&repo)?,
        };

        let since = match since {
            Some(rev) => Some(rev.to_string()),
            None => Self::latest_tag(&repo)?,
        };

        let mut revwalk = repo.revwalk()?;
        revwalk.push(until_oid)?;

        let limit = match since {
            Some(rev) => {
                revwalk.hide(Self::resolve_commit(&repo, &rev)?)?;
                usize::MAX
            }
            None => FALLBACK_COMMIT_WINDOW,
        };

        let mut messages = Vec::new();
        for oid in revwalk.take(limit) {
            let commit = repo.find_commit(oid?)?;
            messages.push(commit.message().unwrap_or_default().to_string());
        }

        Ok(messages)
    }
}

impl TagProvider for Git2Repository {
    fn describe_latest_tag(&self) -> Result<Option<String>> {
        let repo = self.lock()?;
        Self::latest_tag(&repo)
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let repo = self.lock()?;
        let head = repo.head()?.peel_to_commit()?;

        if message.is_empty() {
            repo.tag_lightweight(name, head.as_object(), false)?;
        } else {
            let signature = repo.signature()?;
            repo.tag(name, head.as_object(), &signature, message, false)?;
        }

        Ok(())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        let repo = self.lock()?;
        let found = match repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        found
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        let repo = self.lock()?;
        let mut remote = repo.find_remote(&self.remote).map_err(|_| {
            BumpError::Git(git2::Error::from_str(&format!(
                "No remote named '{}' found",
                self.remote
            )))
        })?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }
            git2::Cred::default()
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Push rejected for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        remote.push(&[refspec.as_str()], Some(&mut push_options))?;

        tracing::info!(tag = %name, remote = %self.remote, "pushed tag");
        Ok(())
    }
}

impl RepositoryInfo for Git2Repository {
    fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.lock()?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }

    fn head_commit_sha(&self) -> Result<Option<String>> {
        let repo = self.lock()?;
        let sha = match repo.head() {
            Ok(head) => Ok(head.target().map(|oid| oid.to_string())),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e.into()),
        };
        sha
    }

    fn author_name(&self) -> Result<Option<String>> {
        let repo = self.lock()?;
        let config = repo.config()?;
        match config.get_string("user.name") {
            Ok(name) => Ok(Some(name)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
