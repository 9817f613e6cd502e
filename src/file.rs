use derive_more::{Display, From, Into};

use crate::{change::{Change, ChangeIdx, ChangeType}, commit::CommitIdx, repository::Repository};

/// Position of a [`File`] in its repository.
///
/// File positions are never reused, even after the file they named has
/// been folded into another one.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd)]
#[display("file #{_0}")]
pub struct FileIdx(usize);

/// One logical file across its whole history.
///
/// A file is identified by its lineage rather than its path, so it keeps
/// its identity through renames.
#[derive(Clone, Debug)]
pub struct File {
    pub idx: FileIdx,

    /// Binary files carry no blame. A text file becomes binary if one
    /// of its changes cannot be applied to its annotated lines.
    pub binary: bool,

    /// Every change that touched this file, ordered by committer date.
    pub changes: Vec<ChangeIdx>
}

impl File {
    pub fn new(idx: FileIdx, binary: bool) -> File {
        File {
            idx,
            binary,
            changes: vec![]
        }
    }

    /// Find the most recent change to this file as seen from `commit`.
    ///
    /// With no commit, this is simply the latest change. Otherwise the
    /// first-parent history of `commit` is walked back until a commit that
    /// touched this file is found.
    pub fn last_change<'r>(&self, repository: &'r Repository, commit: Option<CommitIdx>) -> Option<&'r Change> {
        let Some(commit) = commit else {
            return self.changes
                .last()
                .map(|&idx| &repository[idx]);
        };

        repository
            .first_parents(commit)
            .find_map(|idx| {
                repository[idx].changes
                    .iter()
                    .map(|&change| &repository[change])
                    .find(|change| change.file == self.idx)
            })
    }

    /// Whether the file exists at `commit` (or at the end of the log).
    pub fn is_alive(&self, repository: &Repository, commit: Option<CommitIdx>) -> bool {
        self.last_change(repository, commit)
            .is_some_and(|change| change.kind != ChangeType::Delete)
    }

    /// The path of the file at `commit`, if it exists there.
    pub fn path<'r>(&self, repository: &'r Repository, commit: Option<CommitIdx>) -> Option<&'r str> {
        self.last_change(repository, commit)
            .and_then(Change::path)
    }

    /// Blame for the file as it stands at `commit`.
    pub fn annotated_lines<'r>(&self, repository: &'r Repository, commit: Option<CommitIdx>) -> &'r [CommitIdx] {
        self.last_change(repository, commit)
            .filter(|change| change.kind != ChangeType::Delete)
            .map(|change| change.annotated_lines.as_slice())
            .unwrap_or_default()
    }
}
