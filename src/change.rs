use derive_more::{Display, From, Into};

use crate::{commit::CommitIdx, file::FileIdx, record::HunkRecord};

/// Position of a [`Change`] in its repository.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd)]
#[display("change #{_0}")]
pub struct ChangeIdx(usize);

/// What a change did to its file.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ChangeType {
    #[display("add")]
    Add,
    #[display("delete")]
    Delete,
    #[display("modify")]
    Modify,
    #[display("rename")]
    Rename
}

impl ChangeType {
    /// Interpret the type code of a change line.
    ///
    /// Anything other than `A`, `D` or `R` is treated as a modification.
    pub fn from_code(code: char) -> ChangeType {
        match code {
            'A' => ChangeType::Add,
            'D' => ChangeType::Delete,
            'R' => ChangeType::Rename,
            _ => ChangeType::Modify
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum LineOperation {
    #[display("+")]
    Add,
    #[display("-")]
    Delete
}

/// A single added or deleted line.
///
/// `number` is 1-based: a position in the new content for additions and
/// in the old content for deletions. `commit` is the commit that made the
/// edit, which is also what blame attributes an added line to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineChange {
    pub operation: LineOperation,
    pub number: usize,
    pub commit: CommitIdx
}

/// One contiguous unit of a diff.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hunk {
    line_changes: Vec<LineChange>
}

impl Hunk {
    pub fn new(line_changes: Vec<LineChange>) -> Hunk {
        Hunk { line_changes }
    }

    /// Build a [`Hunk`] from its record, attributing every edit to `commit`.
    pub fn from_record(record: &HunkRecord, commit: CommitIdx) -> Hunk {
        let added = record.added.iter().map(|&number| LineChange {
            operation: LineOperation::Add,
            number,
            commit
        });

        let deleted = record.deleted.iter().map(|&number| LineChange {
            operation: LineOperation::Delete,
            number,
            commit
        });

        Hunk::new(added.chain(deleted).collect())
    }

    pub fn line_changes(&self) -> &[LineChange] {
        &self.line_changes
    }

    pub fn added_lines(&self) -> impl Iterator<Item = &LineChange> {
        self.line_changes
            .iter()
            .filter(|line| line.operation == LineOperation::Add)
    }

    pub fn deleted_lines(&self) -> impl Iterator<Item = &LineChange> {
        self.line_changes
            .iter()
            .filter(|line| line.operation == LineOperation::Delete)
    }
}

/// One file touched by one commit.
///
/// `file` is the lineage this change belongs to. It can be repointed once
/// if a merge commit reveals that two lineages are the same file.
#[derive(Clone, Debug)]
pub struct Change {
    pub idx: ChangeIdx,
    pub commit: CommitIdx,
    pub kind: ChangeType,
    pub old_file_name: String,
    pub new_file_name: String,
    pub file: FileIdx,

    /// The parent commit this change is relative to.
    pub parent_commit: Option<CommitIdx>,

    /// The change on `parent_commit`'s history that this one builds on.
    pub parent_change: Option<ChangeIdx>,
    pub hunks: Vec<Hunk>,

    /// For every line of the file after this change, the commit that
    /// last wrote it. Always empty for binary files.
    pub annotated_lines: Vec<CommitIdx>
}

impl Change {
    pub fn added_lines(&self) -> impl Iterator<Item = &LineChange> {
        self.hunks.iter().flat_map(Hunk::added_lines)
    }

    pub fn deleted_lines(&self) -> impl Iterator<Item = &LineChange> {
        self.hunks.iter().flat_map(Hunk::deleted_lines)
    }

    /// How many lines the file gained (or lost, if negative) with this change.
    pub fn line_count_delta(&self) -> isize {
        self.added_lines().count() as isize - self.deleted_lines().count() as isize
    }

    /// The name of the file after this change, or `None` if it was deleted.
    pub fn path(&self) -> Option<&str> {
        match self.kind {
            ChangeType::Delete => None,
            _ => Some(self.new_file_name.as_str())
        }
    }
}
