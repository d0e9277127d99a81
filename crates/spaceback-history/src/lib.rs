//! Local git history for archive directories.
//!
//! Each export run becomes one commit in a repository rooted at the archive
//! directory, so earlier states of the space stay recoverable.
//!
//! ```no_run
//! # fn main() -> Result<(), spaceback_history::HistoryError> {
//! use std::path::Path;
//! use spaceback_history::ArchiveHistory;
//!
//! let history = ArchiveHistory::open_or_init(Path::new("ConfluenceBackup_OPS"))?;
//! if let Some(id) = history.commit_all("space backup of 2024-01-01 12:00:00")? {
//!     println!("committed {id}");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use git2::{Commit, ErrorCode, IndexAddOption, Repository, Signature};
use tracing::{debug, info};

/// Author used when the repository has no configured identity.
const FALLBACK_NAME: &str = "spaceback";
const FALLBACK_EMAIL: &str = "spaceback@localhost";

/// Error from the history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// Git repository holding the history of one archive directory.
pub struct ArchiveHistory {
    repo: Repository,
}

impl ArchiveHistory {
    /// Open the repository rooted at `dir`, creating it on first use.
    ///
    /// Parent directories are not searched: an archive inside another
    /// working tree still gets its own repository.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Git`] if `dir` cannot be opened or initialized.
    pub fn open_or_init(dir: &Path) -> Result<Self, HistoryError> {
        let repo = match Repository::open(dir) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => {
                info!("Initializing history repository in {}", dir.display());
                Repository::init(dir)?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { repo })
    }

    /// Stage every added, modified and deleted file and commit.
    ///
    /// Returns the new commit ID, or `None` when the working tree matches
    /// `HEAD` and there is nothing to commit.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Git`] if staging or committing fails.
    pub fn commit_all(&self, message: &str) -> Result<Option<String>, HistoryError> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = self.head_commit()?;
        if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            debug!("Archive unchanged since last commit");
            return Ok(None);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        info!("Committed archive as {}", oid);
        Ok(Some(oid.to_string()))
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, HistoryError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn signature(&self) -> Result<Signature<'static>, HistoryError> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }
}
