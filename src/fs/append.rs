//! Append-only writes for the markdown logs.

use crate::error::{RalphError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Append `content` to `path`, creating the file (and its parent
/// directories) first when missing.
///
/// When the file is created, `header` is written before `content`.
/// Existing content is never rewritten.
pub fn append_with_header<P: AsRef<Path>>(path: P, header: &str, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            RalphError::UserError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let is_new = !path.exists();

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            RalphError::UserError(format!(
                "failed to open log file '{}': {}",
                path.display(),
                e
            ))
        })?;

    let mut buffer = String::new();
    if is_new {
        buffer.push_str(header);
    }
    buffer.push_str(content);

    file.write_all(buffer.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| {
            RalphError::UserError(format!(
                "failed to append to log file '{}': {}",
                path.display(),
                e
            ))
        })
}
