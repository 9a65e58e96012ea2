//! Filesystem utilities for ralph.
//!
//! Atomic writes for the archive store and append-only writes for the
//! markdown logs.

mod append;
pub mod atomic;

pub use append::append_with_header;
pub use atomic::atomic_write_file;
