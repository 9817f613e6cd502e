use std::{collections::{BTreeMap, HashMap}, io::BufRead, ops::Index, path::Path};

use derive_more::Display;
use eyre::Result;

use crate::{
    account::{Account, AccountIdx, Accounts},
    change::{Change, ChangeIdx},
    commit::{Commit, CommitIdx},
    config::TransformConfig,
    file::{File, FileIdx},
    reader::LogReader,
    transform::Transformer,
    utils::name_from_path
};

/// Counts describing a finished transformation.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[display("{commits} commits, {files} files, {accounts} accounts ({dropped_changes} changes dropped, {binary_files} binary files)")]
pub struct TransformSummary {
    pub commits: usize,
    pub files: usize,
    pub accounts: usize,
    pub dropped_changes: usize,
    pub binary_files: usize
}

/// The history of a repository, rebuilt from an iglog.
///
/// Commits, changes, files and accounts live in tables owned by the
/// repository and refer to each other by index. Use the [`Index`]
/// implementations (`repository[idx]`) to follow a reference.
#[derive(Debug, Default)]
pub struct Repository {
    pub name: String,

    pub(crate) version: Option<String>,
    pub(crate) commits: Vec<Commit>,
    pub(crate) commit_ids: HashMap<String, CommitIdx>,
    pub(crate) changes: Vec<Change>,
    pub(crate) files: BTreeMap<FileIdx, File>,
    pub(crate) accounts: Accounts,
    pub(crate) next_file: usize,
    pub(crate) dropped_changes: usize
}

impl Repository {
    /// Create an empty [`Repository`].
    pub fn new(name: impl Into<String>) -> Repository {
        Repository {
            name: name.into(),
            ..Repository::default()
        }
    }

    /// Read and transform an iglog stream.
    pub fn from_reader(name: impl Into<String>, reader: impl BufRead, config: &TransformConfig) -> Result<Repository> {
        let log = LogReader::new(reader)?;

        Transformer::new(name, config.clone()).transform(log)
    }

    /// Read and transform an iglog file, naming the repository after the file.
    pub fn from_path(path: impl AsRef<Path>, config: &TransformConfig) -> Result<Repository> {
        let name = name_from_path(&path)?;

        let log = LogReader::from_path(path)?;

        Transformer::new(name, config.clone()).transform(log)
    }

    /// The version line of the log this repository was read from.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Commits in log order, oldest first.
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn commit_by_id(&self, id: &str) -> Option<&Commit> {
        self.commit_ids
            .get(id)
            .map(|&idx| &self[idx])
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Every file still in the registry.
    ///
    /// Files that were folded into another file during a merge are not
    /// included.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn file(&self, idx: FileIdx) -> Option<&File> {
        self.files.get(&idx)
    }

    /// The file a change currently belongs to.
    pub fn file_of(&self, change: ChangeIdx) -> &File {
        &self[self[change].file]
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn summary(&self) -> TransformSummary {
        TransformSummary {
            commits: self.commits.len(),
            files: self.files.len(),
            accounts: self.accounts.len(),
            dropped_changes: self.dropped_changes,
            binary_files: self.files().filter(|file| file.binary).count()
        }
    }

    pub(crate) fn allocate_file(&mut self, binary: bool) -> FileIdx {
        let idx = FileIdx::from(self.next_file);

        self.next_file += 1;

        self.files.insert(idx, File::new(idx, binary));

        idx
    }

    pub(crate) fn file_mut(&mut self, idx: FileIdx) -> Option<&mut File> {
        self.files.get_mut(&idx)
    }
}

impl Index<CommitIdx> for Repository {
    type Output = Commit;

    fn index(&self, idx: CommitIdx) -> &Commit {
        &self.commits[usize::from(idx)]
    }
}

impl Index<ChangeIdx> for Repository {
    type Output = Change;

    fn index(&self, idx: ChangeIdx) -> &Change {
        &self.changes[usize::from(idx)]
    }
}

impl Index<FileIdx> for Repository {
    type Output = File;

    fn index(&self, idx: FileIdx) -> &File {
        &self.files[&idx]
    }
}

impl Index<AccountIdx> for Repository {
    type Output = Account;

    fn index(&self, idx: AccountIdx) -> &Account {
        match self.accounts.get(idx) {
            Some(account) => account,
            None => panic!("{idx} does not exist in repository {:?}", self.name)
        }
    }
}
