use thiserror::Error;

/// A structural failure while reading an iglog document.
///
/// Any of these rejects the whole input. Line numbers are 1-based and count
/// the version line.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read iglog input: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected a commit header starting with \"ig#\", found {found:?}")]
    ExpectedCommitHeader {
        line: usize,
        found: String
    },

    #[error("line {line}: commit {commit:?} ended before its {field} line")]
    MissingField {
        line: usize,
        commit: String,
        field: &'static str
    },

    #[error("line {line}: change has no type code")]
    MissingChangeType {
        line: usize
    },

    #[error("line {line}: hunk {content:?} has no '|' separating added and deleted ranges")]
    MalformedHunk {
        line: usize,
        content: String
    },

    #[error("line {line}: invalid line range {token:?}")]
    InvalidRange {
        line: usize,
        token: String
    }
}

/// A line edit that does not fit the annotation it is applied to.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum BlameError {
    #[error("cannot delete line {line} from {len} annotated lines")]
    DeleteOutOfRange {
        line: usize,
        len: usize
    },

    #[error("cannot insert line {line} into {len} annotated lines")]
    InsertOutOfRange {
        line: usize,
        len: usize
    }
}

/// No earlier change touches `file_name` along the first-parent history.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("could not find a previous change for file {file_name:?}")]
pub struct MissingChange {
    pub file_name: String
}
