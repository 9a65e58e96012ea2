//! JSON-RPC 2.0 framing and MCP tool-result decoding.
//!
//! Messages are exchanged one JSON object per line. Tool results carry
//! their payload as text content that itself holds JSON; this module
//! unwraps that and normalizes the shapes vibe-kanban returns.

use crate::error::{RalphError, Result};
use crate::task::{Task, TaskUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// MCP protocol revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// An outgoing request.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

impl<'a> Request<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// An outgoing notification (no response expected).
#[derive(Debug, Serialize)]
pub struct Notification<'a> {
    jsonrpc: &'static str,
    method: &'a str,
}

impl<'a> Notification<'a> {
    pub fn new(method: &'a str) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
        }
    }
}

/// Error object of a failed JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// A line received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Answer to one of our requests.
    Response {
        id: u64,
        outcome: std::result::Result<Value, RpcError>,
    },
    /// The server asking us something; it expects an answer.
    ServerRequest { id: Value, method: String },
    /// Notifications and anything else we do not act on.
    Ignored,
}

/// Classify one line. `None` when it is not JSON at all (log noise).
pub fn parse_incoming(line: &str) -> Option<Incoming> {
    let raw: RawMessage = serde_json::from_str(line.trim()).ok()?;

    let incoming = match (raw.id, raw.method) {
        (Some(id), Some(method)) => Incoming::ServerRequest { id, method },
        (Some(id), None) => match id.as_u64() {
            Some(id) => Incoming::Response {
                id,
                outcome: match raw.error {
                    Some(err) => Err(err),
                    None => Ok(raw.result.unwrap_or(Value::Null)),
                },
            },
            None => Incoming::Ignored,
        },
        _ => Incoming::Ignored,
    };
    Some(incoming)
}

/// Reply to a server-initiated request: `ping` succeeds, the rest are
/// declined as unsupported.
pub fn reply_to_server_request(id: &Value, method: &str) -> Value {
    if method == "ping" {
        json!({"jsonrpc": "2.0", "id": id, "result": {}})
    } else {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": format!("method '{}' not supported", method)}
        })
    }
}

/// Parameters of the `initialize` request.
pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallResult {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    structured_content: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Unwrap a `tools/call` result into its JSON payload.
///
/// Text content that is not JSON comes back as a JSON string.
pub fn decode_tool_result(tool: &str, result: Value) -> Result<Value> {
    let result: ToolCallResult = serde_json::from_value(result).map_err(|e| {
        RalphError::TrackerError(format!("malformed result from tool '{}': {}", tool, e))
    })?;

    let text = result
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error {
        return Err(RalphError::TrackerError(format!(
            "tool '{}' failed: {}",
            tool,
            if text.is_empty() { "no details" } else { &text }
        )));
    }

    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }

    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// A tracker project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// `payload[key]` when present, else the payload itself.
fn unwrap_key(payload: Value, key: &str) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

pub fn parse_projects(payload: Value) -> Result<Vec<Project>> {
    serde_json::from_value(unwrap_key(payload, "projects"))
        .map_err(|e| RalphError::TrackerError(format!("unexpected list_projects payload: {}", e)))
}

/// Raw task objects from a `list_tasks` payload.
pub fn parse_task_list(payload: Value) -> Result<Vec<Map<String, Value>>> {
    match unwrap_key(payload, "tasks") {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(RalphError::TrackerError(format!(
                    "unexpected task entry in list_tasks payload: {}",
                    other
                ))),
            })
            .collect(),
        other => Err(RalphError::TrackerError(format!(
            "unexpected list_tasks payload: {}",
            other
        ))),
    }
}

pub fn parse_task(payload: Value) -> Result<Task> {
    serde_json::from_value(unwrap_key(payload, "task"))
        .map_err(|e| RalphError::TrackerError(format!("unexpected task payload: {}", e)))
}

/// Session identifier from a `start_workspace_session` payload.
pub fn parse_session_id(payload: &Value) -> Result<String> {
    const KEYS: [&str; 4] = ["workspace_id", "session_id", "attempt_id", "id"];

    if let Value::String(id) = payload
        && !id.trim().is_empty()
    {
        return Ok(id.trim().to_string());
    }

    KEYS.iter()
        .find_map(|key| payload.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| {
            RalphError::TrackerError(format!(
                "start_workspace_session returned no session ID: {}",
                payload
            ))
        })
}

/// Arguments of an `update_task` call. Only set fields are sent.
pub fn update_arguments(tracker_id: &str, update: &TaskUpdate) -> Value {
    let mut args = Map::new();
    args.insert("task_id".into(), Value::from(tracker_id));
    if let Some(status) = update.status {
        args.insert("status".into(), Value::from(status.as_str()));
    }
    if let Some(description) = &update.description {
        args.insert("description".into(), Value::from(description.as_str()));
    }
    if let Some(dependencies) = &update.dependencies {
        args.insert("dependencies".into(), json!(dependencies));
    }
    Value::Object(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn text_result(text: &str) -> Value {
        json!({"content": [{"type": "text", "text": text}]})
    }

    #[test]
    fn test_request_serialization() {
        let line = serde_json::to_string(&Request::new(7, "tools/call", json!({"name": "x"})))
            .unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["method"], "tools/call");
        assert_eq!(value["params"]["name"], "x");

        let note = serde_json::to_string(&Notification::new("notifications/initialized")).unwrap();
        assert!(!note.contains("\"id\""));
    }

    #[test]
    fn test_parse_incoming_response() {
        let incoming = parse_incoming(r#"{"jsonrpc":"2.0","id":3,"result":{"ok":true}}"#).unwrap();
        assert_eq!(
            incoming,
            Incoming::Response {
                id: 3,
                outcome: Ok(json!({"ok": true}))
            }
        );
    }

    #[test]
    fn test_parse_incoming_error() {
        let incoming = parse_incoming(
            r#"{"jsonrpc":"2.0","id":4,"error":{"code":-32602,"message":"bad params"}}"#,
        )
        .unwrap();
        let Incoming::Response { id, outcome } = incoming else {
            panic!("expected response");
        };
        assert_eq!(id, 4);
        assert_eq!(outcome.unwrap_err().message, "bad params");
    }

    #[test]
    fn test_parse_incoming_other_messages() {
        assert_eq!(
            parse_incoming(r#"{"jsonrpc":"2.0","method":"notifications/message","params":{}}"#),
            Some(Incoming::Ignored)
        );
        assert_eq!(
            parse_incoming(r#"{"jsonrpc":"2.0","id":"srv-1","method":"ping"}"#),
            Some(Incoming::ServerRequest {
                id: json!("srv-1"),
                method: "ping".to_string()
            })
        );
        assert_eq!(parse_incoming("Starting MCP server..."), None);
    }

    #[test]
    fn test_reply_to_server_request() {
        let pong = reply_to_server_request(&json!(1), "ping");
        assert_eq!(pong["result"], json!({}));
        let declined = reply_to_server_request(&json!(2), "sampling/createMessage");
        assert_eq!(declined["error"]["code"], -32601);
    }

    #[test]
    fn test_decode_tool_result_json_text() {
        let payload = decode_tool_result("list_projects", text_result(r#"{"projects":[]}"#)).unwrap();
        assert_eq!(payload, json!({"projects": []}));
    }

    #[test]
    fn test_decode_tool_result_plain_text() {
        let payload = decode_tool_result("delete_task", text_result("Task deleted")).unwrap();
        assert_eq!(payload, json!("Task deleted"));
    }

    #[test]
    fn test_decode_tool_result_prefers_structured_content() {
        let result = json!({
            "content": [{"type": "text", "text": "ignored"}],
            "structuredContent": {"task_id": "t"}
        });
        assert_eq!(
            decode_tool_result("get_task", result).unwrap(),
            json!({"task_id": "t"})
        );
    }

    #[test]
    fn test_decode_tool_result_is_error() {
        let result = json!({"content": [{"type": "text", "text": "Task not found"}], "isError": true});
        let err = decode_tool_result("get_task", result).unwrap_err();
        assert!(matches!(err, RalphError::TrackerError(_)));
        assert!(err.to_string().contains("tool 'get_task' failed: Task not found"));
    }

    #[test]
    fn test_decode_tool_result_skips_non_text_blocks() {
        let result = json!({"content": [{"type": "image", "data": "..."}, {"type": "text", "text": "[1]"}]});
        assert_eq!(decode_tool_result("x", result).unwrap(), json!([1]));
    }

    #[test]
    fn test_parse_projects_wrapped_and_bare() {
        let wrapped = json!({"projects": [{"id": "p1", "name": "shop", "git_repo_path": "/x"}], "count": 1});
        assert_eq!(
            parse_projects(wrapped).unwrap(),
            vec![Project {
                id: "p1".to_string(),
                name: "shop".to_string()
            }]
        );
        let bare = json!([{"id": "p2", "name": "blog"}]);
        assert_eq!(parse_projects(bare).unwrap()[0].name, "blog");
        assert!(parse_projects(json!("nope")).is_err());
    }

    #[test]
    fn test_parse_task_list() {
        let payload = json!({"tasks": [{"id": "a", "title": "TASK-001: A", "status": "todo"}], "count": 1});
        let tasks = parse_task_list(payload).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["id"], "a");

        assert!(parse_task_list(json!({"tasks": [1]})).is_err());
        assert!(parse_task_list(json!({"count": 0})).is_err());
    }

    #[test]
    fn test_parse_task() {
        let payload = json!({"task": {"id": "a", "title": "TASK-001: A", "status": "done", "description": "d"}});
        let task = parse_task(payload).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.description, "d");
    }

    #[test]
    fn test_parse_session_id() {
        assert_eq!(
            parse_session_id(&json!({"task_id": "t", "workspace_id": "w-1"})).unwrap(),
            "w-1"
        );
        assert_eq!(parse_session_id(&json!({"attempt_id": "a-1"})).unwrap(), "a-1");
        assert_eq!(parse_session_id(&json!(" s-9 ")).unwrap(), "s-9");
        assert!(parse_session_id(&json!({"ok": true})).is_err());
    }

    #[test]
    fn test_update_arguments_only_sends_set_fields() {
        let args = update_arguments("t-1", &TaskUpdate::status(TaskStatus::InProgress));
        assert_eq!(args, json!({"task_id": "t-1", "status": "inprogress"}));

        let update = TaskUpdate {
            description: Some("Dependencies: none".to_string()),
            dependencies: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            update_arguments("t-2", &update),
            json!({"task_id": "t-2", "description": "Dependencies: none", "dependencies": []})
        );
    }
}
