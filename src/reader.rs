//! A single-pass reader for the iglog format.
//!
//! An iglog document is a version line followed by commit blocks.
//! Each block is introduced by `ig#<id>`, carries a fixed header, an
//! optional committer signature, `$`-prefixed message lines and any
//! number of `#`-prefixed change blocks with `@=` hunk lines.
//!
//! ```text
//! iglog v1
//! ig#c2
//! c1
//! Mon Jan 3 10:00:00 2022 +0200
//! ana@example.com
//! Ana
//! $Append a line
//! #M
//! c1
//! notes.txt
//! @=2|0
//! ```

use std::{collections::VecDeque, fs::File, io::{BufRead, BufReader, Lines}, path::Path};

use eyre::Result;
use tracing::debug;

use crate::{
    change::ChangeType,
    error::ParseError,
    open_file,
    record::{ChangeRecord, CommitRecord, DEV_NULL, GitLog, HunkRecord, SignatureRecord}
};

pub const COMMIT_PREFIX: &str = "ig#";
pub const MESSAGE_PREFIX: &str = "$";
pub const CHANGE_PREFIX: &str = "#";
pub const HUNK_PREFIX: &str = "@=";

type NumberedLine = (usize, String);

/// Streams [`CommitRecord`]s out of an iglog document.
///
/// The version line is consumed on construction. After that, each call to
/// [`Iterator::next`] reads exactly one commit block, peeking a single line
/// ahead to find where the block ends. Once an error has been yielded the
/// reader is exhausted.
pub struct LogReader<R> {
    lines: Lines<R>,
    line_no: usize,
    lookahead: Option<NumberedLine>,
    version: Option<String>,
    failed: bool
}

impl<R: BufRead> LogReader<R> {
    /// Create a [`LogReader`], reading the version line from `reader`.
    pub fn new(reader: R) -> Result<LogReader<R>, ParseError> {
        let mut log = LogReader {
            lines: reader.lines(),
            line_no: 0,
            lookahead: None,
            version: None,
            failed: false
        };

        log.version = log.next_line()?.map(|(_, line)| line);

        Ok(log)
    }

    /// The version line at the top of the document, exactly as written.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn next_line(&mut self) -> Result<Option<NumberedLine>, ParseError> {
        if let Some(line) = self.lookahead.take() {
            return Ok(Some(line));
        }

        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;

                Ok(Some((self.line_no, line?)))
            }

            None => Ok(None)
        }
    }

    fn peek_line(&mut self) -> Result<Option<&str>, ParseError> {
        if self.lookahead.is_none() {
            self.lookahead = self.next_line()?;
        }

        Ok(self.lookahead.as_ref().map(|(_, line)| line.as_str()))
    }

    /// Read every line belonging to the next commit block.
    fn read_block(&mut self) -> Result<Option<VecDeque<NumberedLine>>, ParseError> {
        let header = loop {
            match self.next_line()? {
                None => return Ok(None),
                Some((_, line)) if line.trim().is_empty() => continue,
                Some(header) => break header
            }
        };

        if !header.1.starts_with(COMMIT_PREFIX) {
            return Err(ParseError::ExpectedCommitHeader {
                line: header.0,
                found: header.1
            });
        }

        let mut block = VecDeque::from([header]);

        loop {
            match self.peek_line()? {
                Some(line) if !line.starts_with(COMMIT_PREFIX) => {}
                _ => break
            }

            block.extend(self.lookahead.take());
        }

        // Blank lines between blocks belong to neither.
        while block.back().is_some_and(|(_, line)| line.trim().is_empty()) {
            block.pop_back();
        }

        Ok(Some(block))
    }
}

impl LogReader<BufReader<File>> {
    /// Open an iglog file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<LogReader<BufReader<File>>> {
        let fp = open_file(path)?;

        Ok(LogReader::new(BufReader::new(fp))?)
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<CommitRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = match self.read_block() {
            Ok(Some(lines)) => parse_commit(lines),
            Ok(None) => return None,
            Err(e) => Err(e)
        };

        self.failed = result.is_err();

        Some(result)
    }
}

/// Read a whole iglog document into memory.
pub fn read_log(reader: impl BufRead) -> Result<GitLog, ParseError> {
    let mut log = LogReader::new(reader)?;

    let commits = log.by_ref().collect::<Result<Vec<_>, _>>()?;

    Ok(GitLog {
        version: log.version,
        commits
    })
}

/// The lines of one commit block, consumed front to back.
struct Block {
    lines: VecDeque<NumberedLine>,
    last_line: usize
}

impl Block {
    fn take(&mut self) -> Option<NumberedLine> {
        let line = self.lines.pop_front();

        if let Some((no, _)) = &line {
            self.last_line = *no;
        }

        line
    }

    fn peek(&self) -> Option<&str> {
        self.lines
            .front()
            .map(|(_, line)| line.as_str())
    }

    fn require(&mut self, commit: &str, field: &'static str) -> Result<String, ParseError> {
        match self.take() {
            Some((_, line)) => Ok(line),
            None => Err(ParseError::MissingField {
                line: self.last_line,
                commit: commit.to_string(),
                field
            })
        }
    }
}

fn parse_commit(lines: VecDeque<NumberedLine>) -> Result<CommitRecord, ParseError> {
    let mut block = Block { lines, last_line: 0 };

    let header = block.require("", "commit id")?;

    let id = header
        .strip_prefix(COMMIT_PREFIX)
        .unwrap_or(&header)
        .to_string();

    let parent_ids = block
        .require(&id, "parent ids")?
        .split_whitespace()
        .map(String::from)
        .collect();

    let author = SignatureRecord {
        date: block.require(&id, "author date")?,
        email: block.require(&id, "author email")?,
        name: block.require(&id, "author name")?
    };

    let has_committer = block
        .peek()
        .is_some_and(|line| !line.starts_with(MESSAGE_PREFIX) && !line.starts_with(CHANGE_PREFIX));

    let committer = if has_committer {
        Some(SignatureRecord {
            date: block.require(&id, "committer date")?,
            email: block.require(&id, "committer email")?,
            name: block.require(&id, "committer name")?
        })
    }
    else {
        None
    };

    let message = read_message(&mut block);

    let mut changes = vec![];

    while let Some((line_no, line)) = block.take() {
        if let Some(code) = line.strip_prefix(CHANGE_PREFIX) {
            changes.push(read_change(&mut block, &id, line_no, code)?);
        }
        else if !line.trim().is_empty() {
            debug!(line = line_no, commit = %id, "ignoring unexpected line {line:?}");
        }
    }

    Ok(CommitRecord {
        id,
        parent_ids,
        author,
        committer,
        message,
        changes
    })
}

fn read_message(block: &mut Block) -> String {
    let mut lines = vec![];

    while block.peek().is_some_and(|line| line.starts_with(MESSAGE_PREFIX)) {
        if let Some((_, line)) = block.take() {
            lines.push(line[MESSAGE_PREFIX.len()..].to_string());
        }
    }

    lines.join("\n").trim_end().to_string()
}

fn read_change(block: &mut Block, commit: &str, line_no: usize, code: &str) -> Result<ChangeRecord, ParseError> {
    let mut chars = code.chars();

    let kind = chars
        .next()
        .map(ChangeType::from_code)
        .ok_or(ParseError::MissingChangeType { line: line_no })?;

    // Any second character on the type line marks the change as binary.
    let binary = chars.next().is_some();

    let parent = block.require(commit, "change parent")?;

    let parent_commit_id = Some(parent.trim())
        .filter(|id| !id.is_empty())
        .map(String::from);

    let file_name = block.require(commit, "file name")?.trim().to_string();

    let (old_file_name, new_file_name) = match kind {
        ChangeType::Add => (DEV_NULL.to_string(), file_name),
        ChangeType::Delete => (file_name, DEV_NULL.to_string()),
        ChangeType::Rename => {
            let new_name = block.require(commit, "new file name")?;

            (file_name, new_name.trim().to_string())
        }
        ChangeType::Modify => (file_name.clone(), file_name)
    };

    let mut hunks = vec![];

    while let Some(line) = block.peek() {
        if line.starts_with(CHANGE_PREFIX) {
            break;
        }

        let Some((hunk_line, content)) = block.take() else { break };

        if binary {
            continue;
        }

        if let Some(ranges) = content.strip_prefix(HUNK_PREFIX) {
            hunks.push(parse_hunk(hunk_line, ranges)?);
        }
    }

    Ok(ChangeRecord {
        kind,
        binary,
        parent_commit_id,
        old_file_name,
        new_file_name,
        hunks
    })
}

fn parse_hunk(line: usize, content: &str) -> Result<HunkRecord, ParseError> {
    let Some((added, deleted)) = content.split_once('|') else {
        return Err(ParseError::MalformedHunk {
            line,
            content: content.to_string()
        });
    };

    Ok(HunkRecord {
        added: parse_ranges(line, added)?,
        deleted: parse_ranges(line, deleted)?
    })
}

/// Expand `N` and `S:E` tokens into individual line numbers.
///
/// A lone `0` stands for no lines at all.
fn parse_ranges(line: usize, text: &str) -> Result<Vec<usize>, ParseError> {
    let mut numbers = vec![];

    for token in text.split(' ').filter(|token| !token.is_empty()) {
        let invalid = || ParseError::InvalidRange {
            line,
            token: token.to_string()
        };

        match token.split_once(':') {
            None => {
                let number: usize = token.parse().map_err(|_| invalid())?;

                if number != 0 {
                    numbers.push(number);
                }
            }

            Some((start, end)) => {
                let start: usize = start.parse().map_err(|_| invalid())?;
                let end: usize = end.parse().map_err(|_| invalid())?;

                if end < start {
                    return Err(invalid());
                }

                numbers.extend(start ..= end);
            }
        }
    }

    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "\
iglog v1.2
ig#c1

Mon Jan 3 10:00:00 2022 +0200
ana@example.com
Ana
$Initial commit
$
#A

notes.txt
@=1:2|0
ig#c2
c1
Tue Jan 4 10:00:00 2022 +0200
bob@example.com
Bob
Wed Jan 5 09:30:00 2022 +0200
ana@example.com
Ana
$Rename and tweak
$  with a second line
#R
c1
notes.txt
docs/notes.md
@=2|2
#MB
c1
logo.png
@=1|1
";

    fn read(text: &str) -> Result<GitLog, ParseError> {
        read_log(text.as_bytes())
    }

    #[test]
    fn reads_version_and_commits() {
        let log = read(SAMPLE).unwrap();

        assert_eq!(log.version.as_deref(), Some("iglog v1.2"));
        assert_eq!(log.commits.len(), 2);

        let root = &log.commits[0];

        assert_eq!(root.id, "c1");
        assert!(root.parent_ids.is_empty());
        assert_eq!(root.author.name, "Ana");
        assert_eq!(root.author.email, "ana@example.com");
        assert!(root.committer.is_none());
        assert_eq!(root.message, "Initial commit");

        let added = &root.changes[0];

        assert_eq!(added.kind, ChangeType::Add);
        assert_eq!(added.parent_commit_id, None);
        assert_eq!(added.old_file_name, DEV_NULL);
        assert_eq!(added.new_file_name, "notes.txt");
        assert_eq!(added.hunks, vec![HunkRecord { added: vec![1, 2], deleted: vec![] }]);
    }

    #[test]
    fn reads_committer_rename_and_binary_changes() {
        let log = read(SAMPLE).unwrap();
        let second = &log.commits[1];

        assert_eq!(second.parent_ids, vec!["c1".to_string()]);

        let committer = second.committer.as_ref().unwrap();

        assert_eq!(committer.name, "Ana");
        assert_eq!(committer.date, "Wed Jan 5 09:30:00 2022 +0200");
        assert_eq!(second.message, "Rename and tweak\n  with a second line");

        let rename = &second.changes[0];

        assert_eq!(rename.kind, ChangeType::Rename);
        assert_eq!(rename.parent_commit_id.as_deref(), Some("c1"));
        assert_eq!(rename.old_file_name, "notes.txt");
        assert_eq!(rename.new_file_name, "docs/notes.md");
        assert_eq!(rename.hunks.len(), 1);

        let binary = &second.changes[1];

        assert_eq!(binary.kind, ChangeType::Modify);
        assert!(binary.binary);
        assert_eq!(binary.old_file_name, binary.new_file_name);
        assert!(binary.hunks.is_empty());
    }

    #[test]
    fn streams_one_commit_at_a_time() {
        let mut reader = LogReader::new(SAMPLE.as_bytes()).unwrap();

        assert_eq!(reader.version(), Some("iglog v1.2"));
        assert_eq!(reader.next().unwrap().unwrap().id, "c1");
        assert_eq!(reader.next().unwrap().unwrap().id, "c2");
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_message_and_no_changes_are_fine() {
        let log = read("v\nig#a\n\nMon Jan 3 10:00:00 2022 +0200\ne@x\nE\n").unwrap();

        assert_eq!(log.commits[0].message, "");
        assert!(log.commits[0].committer.is_none());
        assert!(log.commits[0].changes.is_empty());
    }

    #[test]
    fn empty_input_has_no_version() {
        let log = read("").unwrap();

        assert_eq!(log.version, None);
        assert!(log.commits.is_empty());
    }

    #[test]
    fn unknown_type_code_is_a_modify() {
        let log = read("v\nig#a\n\nd\ne\nn\n$m\n#X\n\nf.txt\n").unwrap();
        let change = &log.commits[0].changes[0];

        assert_eq!(change.kind, ChangeType::Modify);
        assert!(!change.binary);
    }

    #[test]
    fn truncated_header_is_rejected() {
        let err = read("v\nig#abc\n\nMon Jan 3 10:00:00 2022 +0200\n").unwrap_err();

        match err {
            ParseError::MissingField { commit, field, line } => {
                assert_eq!(commit, "abc");
                assert_eq!(field, "author email");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {other}")
        }
    }

    #[test]
    fn content_before_first_commit_is_rejected() {
        let err = read("v\nhello\n").unwrap_err();

        assert!(matches!(err, ParseError::ExpectedCommitHeader { line: 2, .. }));
    }

    #[test]
    fn hunk_without_separator_is_rejected() {
        let err = read("v\nig#a\n\nd\ne\nn\n$m\n#M\n\nf\n@=1 2\n").unwrap_err();

        assert!(matches!(err, ParseError::MalformedHunk { line: 11, .. }));
    }

    #[test]
    fn reader_stops_after_an_error() {
        let mut reader = LogReader::new("v\nig#a\n\nd\ne\nn\n$m\n#M\n\nf\n@=x|0\nig#b\n\nd\ne\nn\n".as_bytes()).unwrap();

        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn blank_line_after_a_bare_commit_is_not_a_committer() {
        let text = "\
v
ig#a

Mon Jan 3 10:00:00 2022 +0000
e@x
E

ig#b
a
Mon Jan 3 11:00:00 2022 +0000
e@x
E
$second
";

        let log = read(text).unwrap();

        assert_eq!(log.commits.len(), 2);
        assert!(log.commits[0].committer.is_none());
        assert!(log.commits[0].message.is_empty());
        assert!(log.commits[0].changes.is_empty());
        assert_eq!(log.commits[1].parent_ids, vec!["a".to_string()]);
    }

    #[rstest]
    #[case("0", vec![])]
    #[case("3", vec![3])]
    #[case("1 4", vec![1, 4])]
    #[case("2:5", vec![2, 3, 4, 5])]
    #[case("1 3:4 9", vec![1, 3, 4, 9])]
    #[case("7:7", vec![7])]
    #[case("", vec![])]
    fn expands_ranges(#[case] text: &str, #[case] expected: Vec<usize>) {
        assert_eq!(parse_ranges(1, text).unwrap(), expected);
    }

    #[rstest]
    #[case("a")]
    #[case("5:3")]
    #[case("1:")]
    #[case("-2")]
    fn rejects_bad_ranges(#[case] text: &str) {
        assert!(matches!(parse_ranges(1, text), Err(ParseError::InvalidRange { .. })));
    }
}
