//! Incremental line attribution.
//!
//! Blame for a change is derived from its parent change's blame by
//! replaying the change's own line edits. Nothing is diffed and no history
//! is re-read, so each change costs `O(edits)` on top of copying the
//! parent's lines.

use crate::{change::Hunk, commit::CommitIdx, error::BlameError};

/// Apply `hunks` to the parent's annotated lines.
///
/// Deletions are applied first, highest line number first, so that
/// removing a line never shifts one that is still waiting to be removed.
/// Insertions follow in ascending order, each tagged with the commit that
/// made it.
pub fn annotate(parent: &[CommitIdx], hunks: &[Hunk]) -> Result<Vec<CommitIdx>, BlameError> {
    let mut lines = parent.to_vec();

    let mut deletes: Vec<usize> = hunks
        .iter()
        .flat_map(Hunk::deleted_lines)
        .map(|line| line.number)
        .collect();

    deletes.sort_unstable_by(|a, b| b.cmp(a));

    for number in deletes {
        if number == 0 || number > lines.len() {
            return Err(BlameError::DeleteOutOfRange {
                line: number,
                len: lines.len()
            });
        }

        lines.remove(number - 1);
    }

    let mut adds: Vec<_> = hunks
        .iter()
        .flat_map(Hunk::added_lines)
        .collect();

    adds.sort_by_key(|line| line.number);

    for line in adds {
        if line.number == 0 || line.number > lines.len() + 1 {
            return Err(BlameError::InsertOutOfRange {
                line: line.number,
                len: lines.len()
            });
        }

        lines.insert(line.number - 1, line.commit);
    }

    Ok(lines)
}
