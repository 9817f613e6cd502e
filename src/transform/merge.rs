//! Reconciling the parents of a merge commit.
//!
//! A merge commit may record several changes for one file, each relative
//! to a different parent. Those changes are handled as a group: they must
//! end up on the same [`File`](crate::file::File), and they must agree on
//! blame. A parent with no change for the file saw it unchanged, and its
//! version of the file (the "missing change") takes part in both.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    change::{ChangeIdx, ChangeType},
    commit::CommitIdx,
    file::FileIdx,
    record::ChangeRecord
};

use super::Transformer;

impl Transformer {
    pub(super) fn merge_changes(&mut self, commit: CommitIdx, records: &[ChangeRecord]) -> Vec<ChangeIdx> {
        let mut resolved = vec![];

        for group in group_by_file(records) {
            let changes: Vec<ChangeIdx> = group
                .into_iter()
                .filter_map(|record| self.resolve_change(commit, record))
                .collect();

            if changes.is_empty() {
                continue;
            }

            let missing = self.missing_change(commit, &changes);

            if self.config.compute_annotated_lines {
                self.reconcile_annotations(commit, &changes, missing);
            }

            self.unify_files(&changes, missing, &resolved);

            // Reconciled lines may have come from a lineage that is binary now.
            if self.repository.file_of(changes[0]).binary {
                for &idx in &changes {
                    self.repository.changes[usize::from(idx)].annotated_lines.clear();
                }
            }

            resolved.extend(changes);
        }

        resolved
    }

    /// Find the file's state on a parent that did not change it.
    fn missing_change(&self, commit: CommitIdx, changes: &[ChangeIdx]) -> Option<ChangeIdx> {
        let parents = &self.repository[commit].parents;

        if changes.len() >= parents.len() {
            return None;
        }

        let group: Vec<_> = changes
            .iter()
            .map(|&idx| &self.repository[idx])
            .collect();

        let file_name = group
            .iter()
            .find(|change| change.kind != ChangeType::Delete)
            .map(|change| change.new_file_name.as_str())?;

        let clean_parent = parents
            .iter()
            .copied()
            .find(|&parent| group.iter().all(|change| change.parent_commit != Some(parent)))?;

        match self.find_last_change(Some(clean_parent), file_name) {
            Ok(change) => Some(change),
            Err(missing) => {
                debug!(
                    commit = %self.repository[commit].id,
                    parent = %self.repository[clean_parent].id,
                    "no missing change: {missing}"
                );

                None
            }
        }
    }

    /// Make every change in the group carry the same blame.
    ///
    /// The missing change's lines, if any, replace the first change's.
    /// Any line the first change attributes to the merge commit itself is
    /// handed to the first other change that attributes it elsewhere.
    fn reconcile_annotations(&mut self, commit: CommitIdx, changes: &[ChangeIdx], missing: Option<ChangeIdx>) {
        let seed = missing.unwrap_or(changes[0]);

        let mut lines = self.repository[seed].annotated_lines.clone();

        for (i, line) in lines.iter_mut().enumerate() {
            if *line != commit {
                continue;
            }

            let earlier = changes[1..]
                .iter()
                .filter_map(|&idx| self.repository[idx].annotated_lines.get(i).copied())
                .find(|&other| other != commit);

            if let Some(earlier) = earlier {
                *line = earlier;
            }
        }

        for &idx in changes {
            self.repository.changes[usize::from(idx)].annotated_lines = lines.clone();
        }
    }

    /// Fold every file the group touches into one.
    ///
    /// The first file seen survives and receives all the others' changes,
    /// sorted by committer date. `pending` are changes of the current commit
    /// that were resolved earlier and are not yet attached to a file.
    fn unify_files(&mut self, changes: &[ChangeIdx], missing: Option<ChangeIdx>, pending: &[ChangeIdx]) {
        let mut files: Vec<FileIdx> = vec![];

        for idx in changes.iter().copied().chain(missing) {
            let file = self.repository[idx].file;

            if !files.contains(&file) {
                files.push(file);
            }
        }

        let Some((&survivor, discarded)) = files.split_first() else {
            return;
        };

        if discarded.is_empty() {
            return;
        }

        let mut moved: Vec<ChangeIdx> = vec![];
        let mut binary = false;

        for idx in &files {
            if let Some(file) = self.repository.file(*idx) {
                binary |= file.binary;

                moved.extend(file.changes.iter().copied());
            }
        }

        moved.sort_by_key(|&idx| {
            let change = &self.repository[idx];

            self.repository[change.commit].committer_date
        });

        for &idx in moved.iter().chain(changes).chain(pending) {
            let change = &mut self.repository.changes[usize::from(idx)];

            if discarded.contains(&change.file) {
                change.file = survivor;
            }
        }

        for idx in discarded {
            self.repository.files.remove(idx);
        }

        debug!(
            survivor = %survivor,
            merged = discarded.len(),
            "unified {} changes into one file",
            moved.len()
        );

        if let Some(file) = self.repository.file_mut(survivor) {
            file.binary = binary;
            file.changes = moved;
        }
    }
}

/// Group change records by the file they touch, keeping the order in
/// which each file first appears.
fn group_by_file(records: &[ChangeRecord]) -> Vec<Vec<&ChangeRecord>> {
    let mut groups: Vec<Vec<&ChangeRecord>> = vec![];
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match positions.get(record.group_key()) {
            Some(&position) => groups[position].push(record),
            None => {
                positions.insert(record.group_key(), groups.len());

                groups.push(vec![record]);
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DEV_NULL;

    fn record(kind: ChangeType, old: &str, new: &str) -> ChangeRecord {
        ChangeRecord {
            kind,
            binary: false,
            parent_commit_id: None,
            old_file_name: old.to_string(),
            new_file_name: new.to_string(),
            hunks: vec![]
        }
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let records = [
            record(ChangeType::Modify, "b.txt", "b.txt"),
            record(ChangeType::Delete, "a.txt", DEV_NULL),
            record(ChangeType::Rename, "old.txt", "b.txt"),
            record(ChangeType::Delete, "a.txt", DEV_NULL)
        ];

        let groups = group_by_file(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][1].kind, ChangeType::Rename);
        assert_eq!(groups[1].len(), 2);
        assert!(groups[1].iter().all(|record| record.kind == ChangeType::Delete));
    }
}
