//! Coding-agent CLI invocation.
//!
//! - [`template`]: `{variable}` substitution for prompts and command lines.
//! - [`runner`]: spawning the agent with captured output and a timeout.

pub mod runner;
pub mod template;

pub use runner::{render_command, run_agent};
pub use template::{render_template, vars};
