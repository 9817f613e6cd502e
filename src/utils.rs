use std::{fs::{self, File}, path::Path};

use chrono::{DateTime, FixedOffset};
use eyre::{Context, Result};

use crate::unwrap;

/// Open a file on disk.
///
/// This wraps [`File::open`] to also include the path that was opened
/// in the case of an error.
pub fn open_file(path: impl AsRef<Path>) -> Result<File> {
    File::open(&path)
        .wrap_err_with(|| format!(
            "failed to open path {}",
            path.as_ref().display()
        )
    )
}

/// Read a whole file on disk into a string.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&path)
        .wrap_err_with(|| format!(
            "failed to read path {}",
            path.as_ref().display()
        )
    )
}

/// The name of a file without its directory or extension.
///
/// `logs/kafka.iglog` becomes `kafka`.
pub fn name_from_path(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    let stem = unwrap!(path.file_stem(), "path {} has no file name", path.display());

    let name = unwrap!(stem.to_str(), "invalid utf8 in path: {}", path.display());

    Ok(name.to_string())
}

/// Parse a commit date using `format`, falling back to RFC 3339 and
/// RFC 2822.
pub fn parse_date(text: &str, format: &str) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(date) = DateTime::parse_from_str(text, format) {
        return Ok(date);
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date);
    }

    DateTime::parse_from_rfc2822(text)
        .wrap_err_with(|| format!("could not parse date {text:?} with format {format:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const GIT_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

    #[test]
    fn parses_git_dates() {
        let date = parse_date("Mon Jan 3 10:05:09 2022 +0200", GIT_FORMAT).unwrap();

        assert_eq!((date.year(), date.month(), date.day()), (2022, 1, 3));
        assert_eq!((date.hour(), date.minute(), date.second()), (10, 5, 9));
        assert_eq!(date.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn parses_two_digit_days() {
        let date = parse_date("Thu Dec 22 23:59:59 2022 -0500", GIT_FORMAT).unwrap();

        assert_eq!(date.day(), 22);
        assert_eq!(date.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn falls_back_to_rfc3339() {
        let date = parse_date("2022-01-03T10:00:00+02:00", GIT_FORMAT).unwrap();

        assert_eq!(date.day(), 3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("yesterday", GIT_FORMAT).is_err());
    }

    #[test]
    fn names_from_paths() {
        assert_eq!(name_from_path("logs/kafka.iglog").unwrap(), "kafka");
        assert_eq!(name_from_path("honeydew").unwrap(), "honeydew");
    }

    #[test]
    fn empty_path_has_no_name() {
        let err = name_from_path("").unwrap_err();

        assert!(err.to_string().contains("has no file name"));
    }
}
