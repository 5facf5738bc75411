//! Recognition of harvester read-error lines in the beat's log output.
//!
//! Log format contract: a line starts with its timestamp, followed by a tab
//! and the rest of the record, e.g.
//! `2024-01-01T00:00:01.000Z\tERROR\tlog/harvester.go:281\tRead line error: ...`.

use once_cell::sync::Lazy;
use regex::Regex;

static HARVESTER_READ_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(ERROR).*?(harvester).*?(Read line error)").expect("harvester error regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    NotAnError,
    /// A read error carrying its leading timestamp token.
    Error { token: &'a str },
    /// A read error whose leading token could not be extracted.
    UnparseableError,
}

pub fn is_harvester_error(line: &str) -> bool {
    HARVESTER_READ_ERROR.is_match(line)
}

/// Text before the first tab, if the line has one and it is not blank.
pub fn leading_token(line: &str) -> Option<&str> {
    let (token, _) = line.split_once('\t')?;
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub fn classify(line: &str) -> LineClass<'_> {
    if !is_harvester_error(line) {
        return LineClass::NotAnError;
    }
    match leading_token(line) {
        Some(token) => LineClass::Error { token },
        None => LineClass::UnparseableError,
    }
}
