use crate::error::{VersionGateError, Result};
use git2::{Commit, Repository as Git2Repo};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Working directory of the repository, if it is not bare
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn resolve_commit(&self, reference: &str) -> Result<Commit<'_>> {
        let object = self.repo.revparse_single(reference).map_err(|e| {
            VersionGateError::history(format!("Cannot resolve '{}': {}", reference, e))
        })?;

        object.peel_to_commit().map_err(|e| {
            VersionGateError::history(format!("'{}' does not point at a commit: {}", reference, e))
        })
    }

    fn credentials_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
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
        callbacks
    }
}

impl super::Repository for Git2Repository {
    fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        let mut remote_handle = self.repo.find_remote(remote).map_err(|e| {
            VersionGateError::history(format!("Cannot find remote '{}': {}", remote, e))
        })?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(Self::credentials_callbacks());

        let refspec_branch = format!("+refs/heads/{}:refs/remotes/{}/{}", branch, remote, branch);
        let refspecs = [refspec_branch.as_str(), "+refs/tags/*:refs/tags/*"];

        debug!(remote, branch, "fetching branch and tags");
        remote_handle
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| {
                VersionGateError::history(format!(
                    "Fetch of '{}' from '{}' failed: {}",
                    branch, remote, e
                ))
            })?;

        Ok(())
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(Some(pattern))?;

        let mut names: Vec<String> = tags.iter().flatten().map(|s| s.to_string()).collect();
        names.sort();
        Ok(names)
    }

    fn tags_reachable_from(&self, reference: &str) -> Result<Vec<String>> {
        let head = self.resolve_commit(reference)?.id();
        let tags = self.repo.tag_names(None)?;

        let mut reachable = Vec::new();
        for name in tags.iter().flatten() {
            // Tags on trees or blobs can never be on a branch.
            let target = match self
                .repo
                .find_reference(&format!("refs/tags/{}", name))
                .and_then(|r| r.peel_to_commit())
            {
                Ok(commit) => commit.id(),
                Err(_) => continue,
            };

            if target == head || self.repo.graph_descendant_of(head, target)? {
                reachable.push(name.to_string());
            }
        }

        reachable.sort();
        Ok(reachable)
    }

    fn read_file_at(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let commit = self.resolve_commit(reference)?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let object = entry.to_object(&self.repo)?;
        Ok(object.as_blob().map(|blob| blob.content().to_vec()))
    }
}
