//! Turning parsed iglog records into a [`Repository`].
//!
//! Commits are processed in log order, which is always parents before
//! children. For each commit the parents are linked up, the author and
//! committer resolved, and every change attached to the file lineage it
//! continues. Merge commits get extra treatment in [`merge`].

mod merge;

use std::io::BufRead;

use eyre::{Context, Result};
use tracing::{debug, info, trace, warn};

use crate::{
    account::AccountKey,
    blame,
    change::{Change, ChangeIdx, ChangeType, Hunk},
    commit::{Commit, CommitIdx},
    config::TransformConfig,
    error::{MissingChange, ParseError},
    reader::LogReader,
    record::{ChangeRecord, CommitRecord, GitLog},
    repository::Repository,
    utils::parse_date
};

/// State for a single transformation run.
///
/// The commit, account and file registries all live in the repository
/// being built, so separate runs share nothing.
pub struct Transformer {
    config: TransformConfig,
    repository: Repository
}

impl Transformer {
    pub fn new(name: impl Into<String>, config: TransformConfig) -> Transformer {
        Transformer {
            config,
            repository: Repository::new(name)
        }
    }

    /// Consume a streaming reader, transforming each commit as it is read.
    ///
    /// A structural error anywhere in the log rejects the whole log.
    pub fn transform<R: BufRead>(mut self, log: LogReader<R>) -> Result<Repository> {
        self.repository.version = log.version().map(String::from);

        self.run(log)
    }

    /// Transform a log that has already been read into memory.
    pub fn transform_log(mut self, log: GitLog) -> Result<Repository> {
        self.repository.version = log.version;

        self.run(log.commits.into_iter().map(Ok))
    }

    fn run(mut self, records: impl IntoIterator<Item = Result<CommitRecord, ParseError>>) -> Result<Repository> {
        info!(
            repository = %self.repository.name,
            blame = self.config.compute_annotated_lines,
            "transforming iglog"
        );

        for (index, record) in records.into_iter().enumerate() {
            let record = record.wrap_err_with(|| format!(
                "failed to read repository {:?}",
                self.repository.name
            ))?;

            debug!(commit = %record.id, "creating commit {}", index + 1);

            self.add_commit(record)?;
        }

        info!(
            repository = %self.repository.name,
            "finished transformation: {}",
            self.repository.summary()
        );

        Ok(self.repository)
    }

    fn add_commit(&mut self, record: CommitRecord) -> Result<()> {
        if self.repository.commit_ids.contains_key(&record.id) {
            debug!(commit = %record.id, "skipping duplicate commit");

            return Ok(());
        }

        let format = &self.config.date_format;

        let author_date = parse_date(&record.author.date, format)
            .wrap_err_with(|| format!("invalid author date on commit {}", record.id))?;

        let committer = record.committer.as_ref().unwrap_or(&record.author);

        let committer_date = if committer.date.trim().is_empty() {
            author_date
        }
        else {
            parse_date(&committer.date, format)
                .wrap_err_with(|| format!("invalid committer date on commit {}", record.id))?
        };

        let parents: Vec<CommitIdx> = record.parent_ids
            .iter()
            .filter_map(|id| {
                let parent = self.repository.commit_ids.get(id).copied();

                if parent.is_none() {
                    trace!(commit = %record.id, parent = %id, "parent is not in the log");
                }

                parent
            })
            .collect();

        let author = self.repository.accounts.get_or_create(AccountKey::new(
            &record.author.name,
            &record.author.email
        ));

        let committer = if committer.name.is_empty() {
            author
        }
        else {
            self.repository.accounts.get_or_create(AccountKey::new(&committer.name, &committer.email))
        };

        let idx = CommitIdx::from(self.repository.commits.len());

        for &parent in &parents {
            self.repository.commits[usize::from(parent)].children.push(idx);
        }

        self.repository.commits.push(Commit {
            idx,
            id: record.id.clone(),
            message: record.message,
            author_date,
            committer_date,
            author,
            committer,
            parents,
            children: vec![],
            changes: vec![]
        });

        self.repository.commit_ids.insert(record.id, idx);

        for account in [author, committer] {
            if let Some(account) = self.repository.accounts.get_mut(account) {
                if account.commits.last() != Some(&idx) {
                    account.commits.push(idx);
                }
            }
        }

        let changes = if self.repository[idx].is_merge() {
            self.merge_changes(idx, &record.changes)
        }
        else {
            record.changes
                .iter()
                .filter_map(|change| self.resolve_change(idx, change))
                .collect()
        };

        for &change in &changes {
            let file = self.repository[change].file;

            if let Some(file) = self.repository.file_mut(file) {
                file.changes.push(change);
            }
        }

        self.repository.commits[usize::from(idx)].changes = changes;

        Ok(())
    }

    /// Create the [`Change`] described by `record`, or `None` if the file
    /// it continues cannot be found.
    ///
    /// The change is not yet attached to its file or commit.
    fn resolve_change(&mut self, commit: CommitIdx, record: &ChangeRecord) -> Option<ChangeIdx> {
        let parent_commit = record.parent_commit_id
            .as_deref()
            .and_then(|id| {
                self.repository[commit].parents
                    .iter()
                    .copied()
                    .find(|&parent| self.repository[parent].id == id)
            });

        let parent_change = match record.kind {
            ChangeType::Add => None,

            _ => match self.find_last_change(parent_commit, &record.old_file_name) {
                Ok(change) => Some(change),
                Err(missing) => {
                    warn!(commit = %self.repository[commit].id, "{missing}, dropping {} change", record.kind);

                    self.repository.dropped_changes += 1;

                    return None;
                }
            }
        };

        let file = match parent_change {
            Some(parent) => self.repository[parent].file,
            None => self.repository.allocate_file(record.binary)
        };

        let binary = self.repository[file].binary;

        let hunks: Vec<Hunk> = if binary {
            vec![]
        }
        else {
            record.hunks
                .iter()
                .map(|hunk| Hunk::from_record(hunk, commit))
                .collect()
        };

        let annotated_lines = if binary || !self.config.compute_annotated_lines {
            vec![]
        }
        else {
            let parent_lines = parent_change
                .map(|parent| self.repository[parent].annotated_lines.as_slice())
                .unwrap_or_default();

            match blame::annotate(parent_lines, &hunks) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(
                        commit = %self.repository[commit].id,
                        file = %record.new_file_name,
                        "applying change failed ({e}), the file will be considered binary"
                    );

                    if let Some(file) = self.repository.file_mut(file) {
                        file.binary = true;
                    }

                    vec![]
                }
            }
        };

        let idx = ChangeIdx::from(self.repository.changes.len());

        self.repository.changes.push(Change {
            idx,
            commit,
            kind: record.kind,
            old_file_name: record.old_file_name.clone(),
            new_file_name: record.new_file_name.clone(),
            file,
            parent_commit,
            parent_change,
            hunks,
            annotated_lines
        });

        Some(idx)
    }

    /// Find the latest change producing `file_name`, starting at `start`
    /// and following first parents only.
    ///
    /// A file changed only on a later parent of a merge also shows up as a
    /// change on the merge commit itself, so first parents are enough.
    fn find_last_change(&self, start: Option<CommitIdx>, file_name: &str) -> Result<ChangeIdx, MissingChange> {
        let missing = || MissingChange {
            file_name: file_name.to_string()
        };

        let start = start.ok_or_else(missing)?;

        self.repository
            .first_parents(start)
            .find_map(|commit| {
                self.repository[commit].changes
                    .iter()
                    .copied()
                    .find(|&change| self.repository[change].new_file_name == file_name)
            })
            .ok_or_else(missing)
    }
}
