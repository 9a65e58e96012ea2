//! MCP client for vibe-kanban over stdio.
//!
//! The server is spawned from `tracker.command`. A reader thread forwards
//! its stdout line by line; every request waits at most the configured
//! timeout for its response. Any transport or protocol failure is a
//! `TrackerError`, which aborts the pass.

use super::protocol::{
    self, Incoming, Notification, Project, Request, decode_tool_result, parse_incoming,
};
use super::{TaskTracker, WorkspaceRequest};
use crate::config::TrackerConfig;
use crate::error::{RalphError, Result};
use crate::task::{Task, TaskStatus, TaskUpdate};
use serde::Serialize;
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Page size requested from `list_tasks`; the tracker's default is small.
const LIST_LIMIT: u64 = 1000;

pub struct McpTracker {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    next_id: u64,
    timeout: Duration,
    project_id: Option<String>,
}

impl McpTracker {
    /// Spawn the MCP server and complete the initialization handshake.
    pub fn connect(config: &TrackerConfig, cwd: &Path) -> Result<Self> {
        let argv = shell_words::split(&config.command).map_err(|e| {
            RalphError::UserError(format!(
                "failed to parse tracker command '{}': {}",
                config.command, e
            ))
        })?;
        let Some((program, args)) = argv.split_first() else {
            return Err(RalphError::UserError("tracker command is empty".to_string()));
        };

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                RalphError::TrackerError(format!(
                    "failed to start MCP server '{}': {}",
                    config.command, e
                ))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(RalphError::TrackerError(
                "MCP server stdio was not captured".to_string(),
            ));
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut tracker = Self {
            child,
            stdin,
            lines: rx,
            next_id: 1,
            timeout: config.timeout(),
            project_id: None,
        };
        tracker.initialize()?;
        tracing::debug!(command = %config.command, "connected to MCP server");
        Ok(tracker)
    }

    /// Select the project every task operation targets.
    ///
    /// An explicit ID wins; otherwise the name must match exactly one
    /// project returned by `list_projects`.
    pub fn select_project(&mut self, project_id: Option<&str>, project_name: Option<&str>) -> Result<String> {
        let id = match (project_id, project_name) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => {
                let projects = self.list_projects()?;
                find_project(&projects, name)?.id.clone()
            }
            (None, None) => {
                return Err(RalphError::UserError(
                    "no project configured: set project_name in config/ralph.yaml or pass --project-name"
                        .to_string(),
                ));
            }
        };
        tracing::debug!(project = %id, "selected tracker project");
        self.project_id = Some(id.clone());
        Ok(id)
    }

    pub fn list_projects(&mut self) -> Result<Vec<Project>> {
        let payload = self.call_tool("list_projects", json!({}))?;
        protocol::parse_projects(payload)
    }

    fn project_id(&self) -> Result<&str> {
        self.project_id.as_deref().ok_or_else(|| {
            RalphError::UserError("no tracker project selected".to_string())
        })
    }

    fn initialize(&mut self) -> Result<()> {
        let result = self.request("initialize", protocol::initialize_params())?;
        if let Some(version) = result.get("protocolVersion").and_then(Value::as_str)
            && version != protocol::PROTOCOL_VERSION
        {
            tracing::debug!(server = %version, "MCP server negotiated a different protocol version");
        }
        self.send(&Notification::new("notifications/initialized"))
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> Result<Value> {
        tracing::trace!(tool = %name, "calling tracker tool");
        let result = self.request(
            "tools/call",
            json!({"name": name, "arguments": arguments}),
        )?;
        decode_tool_result(name, result)
    }

    fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&Request::new(id, method, params))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let line = match self.lines.recv_timeout(remaining) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(RalphError::TrackerError(format!(
                        "no response to '{}' within {}s",
                        method,
                        self.timeout.as_secs()
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(RalphError::TrackerError(format!(
                        "MCP server closed the connection during '{}'",
                        method
                    )));
                }
            };

            match parse_incoming(&line) {
                Some(Incoming::Response {
                    id: response_id,
                    outcome,
                }) if response_id == id => {
                    return outcome.map_err(|e| {
                        RalphError::TrackerError(format!(
                            "'{}' failed ({}): {}",
                            method, e.code, e.message
                        ))
                    });
                }
                Some(Incoming::ServerRequest { id, method }) => {
                    self.send(&protocol::reply_to_server_request(&id, &method))?;
                }
                Some(_) => {}
                None => tracing::trace!(line = %line, "ignoring non-JSON output from MCP server"),
            }
        }
    }

    fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let mut line = serde_json::to_string(message).map_err(|e| {
            RalphError::TrackerError(format!("failed to encode MCP message: {}", e))
        })?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .and_then(|()| self.stdin.flush())
            .map_err(|e| RalphError::TrackerError(format!("failed to write to MCP server: {}", e)))
    }
}

impl TaskTracker for McpTracker {
    fn list_tasks(&mut self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut args = json!({"project_id": self.project_id()?, "limit": LIST_LIMIT});
        if let Some(status) = status {
            args["status"] = Value::from(status.as_str());
        }

        let payload = self.call_tool("list_tasks", args)?;
        let summaries = protocol::parse_task_list(payload)?;

        // Listings may omit descriptions; fetch those tasks individually.
        let mut tasks = Vec::with_capacity(summaries.len());
        for summary in summaries {
            if summary.contains_key("description") {
                tasks.push(protocol::parse_task(Value::Object(summary))?);
            } else {
                let id = summary
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        RalphError::TrackerError("list_tasks entry without an id".to_string())
                    })?
                    .to_string();
                tasks.push(self.get_task(&id)?);
            }
        }
        Ok(tasks)
    }

    fn get_task(&mut self, tracker_id: &str) -> Result<Task> {
        let payload = self.call_tool("get_task", json!({"task_id": tracker_id}))?;
        protocol::parse_task(payload)
    }

    fn update_task(&mut self, tracker_id: &str, update: &TaskUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.call_tool("update_task", protocol::update_arguments(tracker_id, update))?;
        Ok(())
    }

    fn delete_task(&mut self, tracker_id: &str) -> Result<()> {
        self.call_tool("delete_task", json!({"task_id": tracker_id}))?;
        Ok(())
    }

    fn start_workspace_session(
        &mut self,
        tracker_id: &str,
        request: &WorkspaceRequest,
    ) -> Result<String> {
        let payload = self.call_tool(
            "start_workspace_session",
            session_arguments(tracker_id, request),
        )?;
        protocol::parse_session_id(&payload)
    }
}

impl Drop for McpTracker {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn find_project<'a>(projects: &'a [Project], name: &str) -> Result<&'a Project> {
    let matches: Vec<&Project> = projects.iter().filter(|p| p.name == name).collect();
    match matches.as_slice() {
        [project] => Ok(project),
        [] => {
            let known: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
            Err(RalphError::UserError(format!(
                "project '{}' not found in tracker (known projects: {})",
                name,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            )))
        }
        _ => Err(RalphError::UserError(format!(
            "project name '{}' is ambiguous ({} matches); set project_id instead",
            name,
            matches.len()
        ))),
    }
}

fn session_arguments(tracker_id: &str, request: &WorkspaceRequest) -> Value {
    let mut args = json!({"task_id": tracker_id, "executor": request.executor});
    if let Some(variant) = &request.variant {
        args["variant"] = Value::from(variant.as_str());
    }
    if let Some(repo_id) = &request.repo.repo_id {
        args["repos"] = json!([{
            "repo_id": repo_id,
            "base_branch": request.repo.base_branch.as_deref().unwrap_or("main"),
        }]);
    }
    args
}
