//! Coding-agent subprocess execution.
//!
//! Runs an agent CLI with captured output and a wall-clock timeout. Every
//! failure (spawn, timeout, non-zero exit) is an `AgentError`; callers decide
//! whether that aborts anything.

use super::template::{TemplateError, render_template};
use crate::error::{RalphError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lines of stderr quoted in a failure message.
const STDERR_TAIL_LINES: usize = 10;

/// Captured output of a successful agent run.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Split a command template into words, then render each word.
///
/// Splitting first keeps a substituted value (a multi-line prompt full of
/// quotes, say) inside a single argument.
pub fn render_command(template: &str, variables: &HashMap<String, String>) -> Result<Vec<String>> {
    let words = shell_words::split(template).map_err(|e| {
        RalphError::UserError(format!(
            "failed to parse agent command '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            template, e
        ))
    })?;

    if words.is_empty() {
        return Err(RalphError::UserError(format!(
            "agent command is empty after parsing: '{}'",
            template
        )));
    }

    words
        .iter()
        .map(|word| {
            render_template(word, variables).map_err(|e| template_error(template, variables, e))
        })
        .collect()
}

/// Run `argv` in `cwd`, killing it after `timeout`.
pub fn run_agent(argv: &[String], cwd: &Path, timeout: Duration) -> Result<AgentOutput> {
    let Some((program, args)) = argv.split_first() else {
        return Err(RalphError::UserError("agent command is empty".to_string()));
    };

    let start = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            RalphError::AgentError(format!(
                "failed to execute '{}': {}\n\
                 Fix: ensure the command is installed and in PATH.",
                program, e
            ))
        })?;

    // Drain both pipes concurrently so a chatty agent cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    // On timeout the drain threads are left detached: a grandchild may still
    // hold the pipes open.
    let Some(status) = wait_with_timeout(&mut child, timeout)? else {
        return Err(RalphError::AgentError(format!(
            "'{}' timed out after {:?}",
            program, timeout
        )));
    };
    let stdout = join_drain(stdout);
    let stderr = join_drain(stderr);
    let duration = start.elapsed();

    if !status.success() {
        return Err(RalphError::AgentError(format!(
            "'{}' exited with {}{}",
            program,
            status
                .code()
                .map(|c| format!("code {}", c))
                .unwrap_or_else(|| "a signal".to_string()),
            stderr_tail(&stderr)
        )));
    }

    tracing::debug!(
        program = %program,
        elapsed_ms = duration.as_millis() as u64,
        "agent finished"
    );

    Ok(AgentOutput {
        stdout,
        stderr,
        duration,
    })
}

/// Poll until the child exits or `timeout` elapses. `None` means it was killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(RalphError::AgentError(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_drain(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    format!(": {}", lines[start..].join("\n"))
}

fn template_error(
    template: &str,
    variables: &HashMap<String, String>,
    err: TemplateError,
) -> RalphError {
    match err {
        TemplateError::UndefinedVariable { name, .. } => {
            let mut keys: Vec<&str> = variables.keys().map(String::as_str).collect();
            keys.sort_unstable();
            RalphError::UserError(format!(
                "agent command template references undefined variable '{}'\n\
                 Command: {}\n\
                 Available variables: {}",
                name,
                template,
                keys.join(", ")
            ))
        }
        other => RalphError::UserError(format!("agent command template: {}", other)),
    }
}
