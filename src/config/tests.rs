//! Tests for config functionality.

use crate::config::types::DEFAULT_REVIEW_PROMPT;
use crate::config::{Config, RepoConfig};
use crate::graph::DependencySource;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.project_name, None);
    assert_eq!(config.project_id, None);
    assert_eq!(config.max_parallel, 3);
    assert_eq!(config.executor, "CLAUDE_CODE");
    assert_eq!(config.variant, None);
    assert_eq!(config.repo_config, RepoConfig::default());
    assert_eq!(config.dependency_source, DependencySource::Text);
    assert_eq!(config.tracker.command, "npx -y vibe-kanban@latest --mcp");
    assert_eq!(config.tracker.timeout(), Duration::from_secs(60));
    assert_eq!(
        config.reviewer.command,
        "copilot --model {model} --no-color -p {prompt}"
    );
    assert_eq!(config.reviewer.model, "claude-haiku-4.5");
    assert_eq!(config.reviewer.timeout(), Duration::from_secs(300));
    assert_eq!(config.reviewer.prompt_template, DEFAULT_REVIEW_PROMPT);
    assert_eq!(config.paths.implementation_log, "docs/implementation-log.md");
    assert_eq!(config.paths.cleanup_log, "docs/cleanup-log.md");
    assert_eq!(config.paths.archive_dir, "plans/done");
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
project_name: shop
max_parallel: 5
reviewer:
  model: gpt-5
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.project_name.as_deref(), Some("shop"));
    assert_eq!(config.max_parallel, 5);
    assert_eq!(config.reviewer.model, "gpt-5");

    // Unspecified values inside a section keep their defaults
    assert_eq!(config.reviewer.timeout_seconds, 300);
    assert_eq!(config.tracker.timeout_seconds, 60);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
project_name: shop
project_id: 7d1c
max_parallel: 2
executor: CODEX
variant: plan
repo_config:
  repo_id: r-1
  base_branch: develop
dependency_source: structured
tracker:
  command: "vibe-kanban --mcp"
  timeout_seconds: 10
reviewer:
  command: "claude -p {prompt}"
  model: opus
  timeout_seconds: 30
  prompt_template: "Summarize {task_id}"
paths:
  implementation_log: log/impl.md
  cleanup_log: log/cleanup.md
  archive_dir: archive
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.project_id.as_deref(), Some("7d1c"));
    assert_eq!(config.max_parallel, 2);
    assert_eq!(config.executor, "CODEX");
    assert_eq!(config.variant.as_deref(), Some("plan"));
    assert_eq!(config.repo_config.repo_id.as_deref(), Some("r-1"));
    assert_eq!(config.repo_config.base_branch.as_deref(), Some("develop"));
    assert_eq!(config.dependency_source, DependencySource::Structured);
    assert_eq!(config.tracker.command, "vibe-kanban --mcp");
    assert_eq!(config.tracker.timeout(), Duration::from_secs(10));
    assert_eq!(config.reviewer.command, "claude -p {prompt}");
    assert_eq!(config.reviewer.model, "opus");
    assert_eq!(config.reviewer.prompt_template, "Summarize {task_id}");
    assert_eq!(config.paths.implementation_log, "log/impl.md");
    assert_eq!(config.paths.cleanup_log, "log/cleanup.md");
    assert_eq!(config.paths.archive_dir, "archive");
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
max_parallel: 4
skills:
  task_review:
    model: claude-haiku-4.5
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.max_parallel, 4);
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("max_parallel: [").unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_invalid_dependency_source() {
    assert!(Config::from_yaml("dependency_source: yaml").is_err());
}

#[test]
fn test_validate_rejects_zero_max_parallel() {
    let err = Config::from_yaml("max_parallel: 0").unwrap_err();
    assert!(err.to_string().contains("max_parallel"));
}

#[test]
fn test_validate_rejects_zero_timeouts() {
    let err = Config::from_yaml("tracker:\n  timeout_seconds: 0").unwrap_err();
    assert!(err.to_string().contains("tracker.timeout_seconds"));

    let err = Config::from_yaml("reviewer:\n  timeout_seconds: 0").unwrap_err();
    assert!(err.to_string().contains("reviewer.timeout_seconds"));
}

#[test]
fn test_validate_rejects_empty_commands() {
    let err = Config::from_yaml("tracker:\n  command: '  '").unwrap_err();
    assert!(err.to_string().contains("tracker.command"));

    let err = Config::from_yaml("reviewer:\n  command: ''").unwrap_err();
    assert!(err.to_string().contains("reviewer.command"));

    let err = Config::from_yaml("executor: ''").unwrap_err();
    assert!(err.to_string().contains("executor"));
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = TempDir::new().unwrap();
    let config = Config::load_or_default(temp.path().join("missing.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ralph.yaml");
    std::fs::write(&path, "project_name: shop\n").unwrap();

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.project_name.as_deref(), Some("shop"));
}

#[test]
fn test_load_missing_file_is_error() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_legacy_json_nested_layout() {
    let json = r#"{
        "vibe_kanban": {
            "project_name": "shop",
            "executor": "CODEX",
            "variant": null,
            "repo_config": { "repo_id": "repo-1", "base_branch": "develop" }
        },
        "unrelated": { "keep": true }
    }"#;

    let config = Config::from_legacy_json(json).unwrap();
    assert_eq!(config.project_name.as_deref(), Some("shop"));
    assert_eq!(config.executor, "CODEX");
    assert_eq!(config.variant, None);
    assert_eq!(config.repo_config.repo_id.as_deref(), Some("repo-1"));
    assert_eq!(config.repo_config.base_branch.as_deref(), Some("develop"));
    assert_eq!(config.max_parallel, Config::default().max_parallel);
}

#[test]
fn test_legacy_json_without_section_uses_defaults() {
    let config = Config::from_legacy_json("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_dispatches_json_to_legacy_layout() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ralph.json");
    std::fs::write(&path, r#"{"vibe_kanban": {"project_name": "shop"}}"#).unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.project_name.as_deref(), Some("shop"));
}

#[test]
fn test_legacy_json_parse_error() {
    let err = Config::from_legacy_json("{ not json").unwrap_err();
    assert!(err.to_string().contains("failed to parse legacy config JSON"));
}
