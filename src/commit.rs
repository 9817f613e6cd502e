use chrono::{DateTime, FixedOffset};
use derive_more::{Display, From, Into};

use crate::{account::AccountIdx, change::ChangeIdx};

/// Position of a [`Commit`] in its repository, which is also its
/// position in the log.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd)]
#[display("commit #{_0}")]
pub struct CommitIdx(usize);

/// A commit read from the log.
///
/// `parents` and `children` mirror each other: a commit appears in each
/// of its parents' `children`. Because commits are read oldest first, every
/// parent exists before its children are created.
#[derive(Clone, Debug)]
pub struct Commit {
    pub idx: CommitIdx,
    pub id: String,
    pub message: String,
    pub author_date: DateTime<FixedOffset>,
    pub committer_date: DateTime<FixedOffset>,
    pub author: AccountIdx,
    pub committer: AccountIdx,
    pub parents: Vec<CommitIdx>,
    pub children: Vec<CommitIdx>,
    pub changes: Vec<ChangeIdx>
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn first_parent(&self) -> Option<CommitIdx> {
        self.parents.first().copied()
    }

    /// The first line of the commit message.
    pub fn summary(&self) -> &str {
        self.message
            .lines()
            .next()
            .unwrap_or_default()
    }
}
