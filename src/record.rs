//! Plain records produced by the iglog reader.
//!
//! Nothing here is resolved against anything else: ids are strings,
//! dates are unparsed text and file names are exactly as they appear
//! in the log.

use crate::change::ChangeType;

/// Marks the missing side of an added or deleted file.
pub const DEV_NULL: &str = "/dev/null";

/// A fully read iglog document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GitLog {
    pub version: Option<String>,
    pub commits: Vec<CommitRecord>
}

/// The date, email and name of an author or committer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignatureRecord {
    pub date: String,
    pub email: String,
    pub name: String
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommitRecord {
    pub id: String,
    pub parent_ids: Vec<String>,
    pub author: SignatureRecord,

    /// `None` when the log omits the committer block, in which case
    /// the author doubles as the committer.
    pub committer: Option<SignatureRecord>,
    pub message: String,
    pub changes: Vec<ChangeRecord>
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    pub kind: ChangeType,
    pub binary: bool,
    pub parent_commit_id: Option<String>,
    pub old_file_name: String,
    pub new_file_name: String,
    pub hunks: Vec<HunkRecord>
}

impl ChangeRecord {
    /// The name that identifies this change's file inside a merge commit.
    ///
    /// Deletes are keyed on the name they remove, everything else
    /// on the name it produces.
    pub fn group_key(&self) -> &str {
        if self.kind == ChangeType::Delete {
            &self.old_file_name
        }
        else {
            &self.new_file_name
        }
    }
}

/// Line numbers touched by a single hunk.
///
/// `added` are 1-based positions in the new content,
/// `deleted` are 1-based positions in the old content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HunkRecord {
    pub added: Vec<usize>,
    pub deleted: Vec<usize>
}
