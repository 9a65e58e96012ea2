//! Removing retired IDs from free-text descriptions.
//!
//! Only whole-token occurrences are removed, so `TASK-001` never matches
//! inside `TASK-0012`. Lines without a retired ID are returned untouched,
//! and every kept line keeps its own terminator (`\n` or `\r\n`).
//! On a touched line, list separators left dangling are tidied, an emptied
//! bullet disappears and an emptied `Dependencies:` line reads
//! `Dependencies: none`.

use crate::task::{EMBEDDED_ID_REGEX, TaskId};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Two or more separators in a row, e.g. `A, , B`.
static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[,;](?:\s*[,;])+\s*").expect("Invalid separator run regex")
});

/// A separator right after a label colon or bullet: `Dependencies: , B`.
static LEADING_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:[-*]\s*)?(?:[^,;:]*:\**)?)\s*[,;]\s*")
        .expect("Invalid leading separator regex")
});

static TRAILING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,;]\s*$").expect("Invalid trailing separator regex"));

/// A dependencies label with nothing after it.
static EMPTY_DEPENDENCIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*(?:[-*]\s*)?\**dependencies\**\s*:\**)\s*$")
        .expect("Invalid dependencies label regex")
});

static EMPTY_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s*$").expect("Invalid bullet regex"));

static INNER_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S) {2,}").expect("Invalid spacing regex"));

/// Remove every occurrence of a `retired` ID from `description`.
pub fn strip_ids(description: &str, retired: &BTreeSet<TaskId>) -> String {
    let mut out = String::with_capacity(description.len());
    let mut dropped_last = false;

    for piece in description.split_inclusive('\n') {
        let line = piece.trim_end_matches(['\r', '\n']);
        let terminator = &piece[line.len()..];

        let mentions_retired = EMBEDDED_ID_REGEX
            .find_iter(line)
            .any(|m| retired.iter().any(|id| id.as_str() == m.as_str()));
        if !mentions_retired {
            out.push_str(piece);
            dropped_last = false;
            continue;
        }

        let stripped = EMBEDDED_ID_REGEX.replace_all(line, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            if retired.iter().any(|id| id.as_str() == token) {
                String::new()
            } else {
                token.to_string()
            }
        });

        match tidy_line(&stripped) {
            Some(line) => {
                out.push_str(&line);
                out.push_str(terminator);
                dropped_last = false;
            }
            None => dropped_last = true,
        }
    }

    // A dropped final line must not leave the previous terminator dangling.
    if dropped_last && !description.ends_with('\n') {
        let trimmed = out.trim_end_matches(['\r', '\n']).len();
        out.truncate(trimmed);
    }
    out
}

/// Clean up a line after removal. `None` drops the line.
fn tidy_line(line: &str) -> Option<String> {
    let line = SEPARATOR_RUN.replace_all(line, ", ");
    let line = LEADING_SEPARATOR.replace(&line, "${1} ");
    let line = TRAILING_SEPARATOR.replace(&line, "");
    let line = INNER_SPACES.replace_all(&line, "${1} ");
    let line = line.trim_end();

    if let Some(caps) = EMPTY_DEPENDENCIES.captures(line) {
        return Some(format!("{} none", &caps[1]));
    }
    if line.trim().is_empty() || EMPTY_BULLET.is_match(line) {
        return None;
    }
    Some(line.to_string())
}
