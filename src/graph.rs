//! Walking the commit DAG.
//!
//! Commits hold their parents and children as indices into the
//! repository's commit table, so traversals here never need to own
//! or clone a commit.

use std::collections::{HashSet, VecDeque};

use crate::{commit::CommitIdx, repository::Repository};

/// Iterator over a commit and its first-parent ancestors, newest first.
pub struct FirstParents<'r> {
    repository: &'r Repository,
    next: Option<CommitIdx>
}

impl Iterator for FirstParents<'_> {
    type Item = CommitIdx;

    fn next(&mut self) -> Option<CommitIdx> {
        let current = self.next?;

        self.next = self.repository[current].first_parent();

        Some(current)
    }
}

impl Repository {
    /// Walk from `start` (inclusive) along first parents to a root.
    pub fn first_parents(&self, start: CommitIdx) -> FirstParents<'_> {
        FirstParents {
            repository: self,
            next: Some(start)
        }
    }

    /// Check if `a` is a descendant of `b`.
    ///
    /// A commit counts as its own descendant.
    pub fn is_descendant(&self, a: CommitIdx, b: CommitIdx) -> bool {
        let mut queue = VecDeque::from([a]);
        let mut seen = HashSet::new();

        while let Some(next) = queue.pop_front() {
            if next == b {
                return true;
            }

            if !seen.insert(next) {
                continue;
            }

            queue.extend(self[next].parents.iter().copied());
        }

        false
    }

    /// Commits with no parents.
    pub fn roots(&self) -> impl Iterator<Item = CommitIdx> {
        self.commits
            .iter()
            .filter(|commit| commit.is_root())
            .map(|commit| commit.idx)
    }

    /// Commits with no children, i.e. branch tips.
    pub fn heads(&self) -> impl Iterator<Item = CommitIdx> {
        self.commits
            .iter()
            .filter(|commit| commit.children.is_empty())
            .map(|commit| commit.idx)
    }
}
