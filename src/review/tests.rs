use super::log::{IMPLEMENTATION_LOG_HEADER, format_record, parse_reviewed_ids};
use super::*;
use crate::config::ReviewerConfig;
use crate::error::RalphError;
use crate::test_support::{id, task};
use chrono::TimeZone;
use tempfile::TempDir;

fn done(title: &str) -> Task {
    let mut t = task(title, TaskStatus::Done, "Build it");
    t.updated_at = Some(Utc.with_ymd_and_hms(2026, 1, 13, 10, 0, 0).unwrap());
    t
}

#[test]
fn test_review_records_new_done_tasks_in_order() {
    let tasks = [done("TASK-003: C"), done("TASK-001: A")];
    let refs: Vec<&Task> = tasks.iter().collect();

    let report = review(&refs, &BTreeSet::new(), |id, _| Ok(format!("did {}", id)));

    let ids: Vec<&str> = report.records.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["TASK-001", "TASK-003"]);
    assert_eq!(report.records[0].title, "A");
    assert_eq!(report.records[0].summary, "did TASK-001");
    assert_eq!(
        report.records[0].completed_at,
        Utc.with_ymd_and_hms(2026, 1, 13, 10, 0, 0).unwrap()
    );
}

#[test]
fn test_review_is_idempotent() {
    let tasks = [done("TASK-001: A"), done("TASK-002: B")];
    let refs: Vec<&Task> = tasks.iter().collect();
    let reviewed: BTreeSet<TaskId> = [id("TASK-001")].into_iter().collect();
    let mut calls = Vec::new();

    let report = review(&refs, &reviewed, |id, _| {
        calls.push(id.clone());
        Ok("ok".to_string())
    });

    assert_eq!(calls, vec![id("TASK-002")]);
    assert_eq!(report.already_reviewed, vec![id("TASK-001")]);
    assert_eq!(report.records.len(), 1);
}

#[test]
fn test_review_skips_foreign_and_unfinished() {
    let tasks = [
        done("Write docs"),
        task("TASK-002: B", TaskStatus::InReview, ""),
        done("TASK-003: C"),
    ];
    let refs: Vec<&Task> = tasks.iter().collect();

    let report = review(&refs, &BTreeSet::new(), |_, _| Ok("ok".to_string()));

    assert_eq!(report.skipped_not_ralph, 1);
    assert_eq!(report.skipped_not_done, 1);
    assert_eq!(report.records.len(), 1);
}

#[test]
fn test_review_dedupes_within_batch() {
    let tasks = [done("TASK-001: A"), done("TASK-001: A again")];
    let refs: Vec<&Task> = tasks.iter().collect();
    let mut calls = 0;

    let report = review(&refs, &BTreeSet::new(), |_, _| {
        calls += 1;
        Ok("ok".to_string())
    });

    assert_eq!(calls, 1);
    assert_eq!(report.records.len(), 1);
}

#[test]
fn test_review_failure_leaves_task_unreviewed() {
    let tasks = [done("TASK-001: A"), done("TASK-002: B")];
    let refs: Vec<&Task> = tasks.iter().collect();

    let report = review(&refs, &BTreeSet::new(), |id, _| {
        if id.as_str() == "TASK-001" {
            Err(RalphError::AgentError("timed out".to_string()))
        } else {
            Ok("ok".to_string())
        }
    });

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, id("TASK-001"));
    assert!(report.failed[0].1.contains("timed out"));
    assert_eq!(report.records[0].task_id, id("TASK-002"));
}

#[test]
fn test_format_record() {
    let record = ReviewRecord {
        task_id: id("TASK-001"),
        title: "Set up database".to_string(),
        completed_at: Utc.with_ymd_and_hms(2026, 1, 13, 10, 0, 0).unwrap(),
        summary: "  Added the schema.\n".to_string(),
    };

    let text = format_record(&record, "alice@devbox");

    assert_eq!(
        text,
        "## TASK-001: Set up database\n\n\
         **Completed:** 2026-01-13T10:00:00+00:00\n\
         **Reviewed by:** alice@devbox\n\n\
         Added the schema.\n\n---\n\n"
    );
}

#[test]
fn test_parse_reviewed_ids_reads_record_headings_only() {
    let content = "# Implementation Log\n\n\
                   ## TASK-001: A\n\n**Completed:** 2026-01-13T10:00:00+00:00\n\n\
                   Depends on TASK-009.\n\n---\n\n\
                   ### TASK-004: Deeper heading\n\n**Completed:** x\n\n\
                   ## TASK-006: No completion line\n\nJust prose.\n\n\
                   TASK-005: not a heading\n";

    let ids = parse_reviewed_ids(content);

    assert_eq!(ids, [id("TASK-001")].into_iter().collect());
}

#[test]
fn test_headings_in_summary_do_not_mark_other_tasks_reviewed() {
    let record = ReviewRecord {
        task_id: id("TASK-001"),
        title: "Schema".to_string(),
        completed_at: Utc.with_ymd_and_hms(2026, 1, 13, 10, 0, 0).unwrap(),
        summary: "Added tables.\n\n## TASK-002: Follow-up needed\n\n\
                  **Completed:** not yet\n  # Notes"
            .to_string(),
    };

    let text = format_record(&record, "alice@devbox");

    assert!(text.contains("\n#### TASK-002: Follow-up needed\n"));
    assert!(text.contains("\n  ### Notes"));
    assert_eq!(
        parse_reviewed_ids(&text),
        [id("TASK-001")].into_iter().collect()
    );
}

#[test]
fn test_log_append_then_read_back() {
    let temp_dir = TempDir::new().unwrap();
    let log = ImplementationLog::new(temp_dir.path().join("docs/implementation-log.md"));
    assert!(log.reviewed_ids().unwrap().is_empty());

    let record = |n: &str| ReviewRecord {
        task_id: id(n),
        title: "T".to_string(),
        completed_at: Utc::now(),
        summary: "ok".to_string(),
    };
    log.append(&[record("TASK-001")], "bob@host").unwrap();
    log.append(&[record("TASK-002")], "bob@host").unwrap();

    let content = std::fs::read_to_string(log.path()).unwrap();
    assert!(content.starts_with(IMPLEMENTATION_LOG_HEADER));
    assert_eq!(content.matches("# Implementation Log").count(), 1);
    assert!(content.find("TASK-001").unwrap() < content.find("TASK-002").unwrap());
    assert_eq!(
        log.reviewed_ids().unwrap(),
        [id("TASK-001"), id("TASK-002")].into_iter().collect()
    );
}

#[test]
fn test_log_append_nothing_creates_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let log = ImplementationLog::new(temp_dir.path().join("log.md"));
    log.append(&[], "bob@host").unwrap();
    assert!(!log.path().exists());
}

fn reviewer(command: &str) -> ReviewerConfig {
    ReviewerConfig {
        command: command.to_string(),
        model: "haiku".to_string(),
        timeout_seconds: 10,
        prompt_template: "Summarize {task_id} ({title}): {description}".to_string(),
    }
}

#[test]
fn test_agent_summarizer_command() {
    let summarizer = AgentSummarizer::new(reviewer("agent --model {model} -p {prompt}"), ".");
    let t = task("TASK-002: Login", TaskStatus::Done, "Add a form");

    let argv = summarizer.command_for(&id("TASK-002"), &t).unwrap();

    assert_eq!(
        argv,
        vec![
            "agent",
            "--model",
            "haiku",
            "-p",
            "Summarize TASK-002 (Login): Add a form"
        ]
    );
}

#[test]
fn test_agent_summarizer_bad_template() {
    let mut config = reviewer("agent {prompt}");
    config.prompt_template = "Summarize {nope}".to_string();
    let summarizer = AgentSummarizer::new(config, ".");
    let t = task("TASK-002: Login", TaskStatus::Done, "");

    let err = summarizer.prompt_for(&id("TASK-002"), &t).unwrap_err();
    assert!(matches!(err, RalphError::UserError(_)));
}

#[cfg(unix)]
#[test]
fn test_agent_summarizer_runs_command() {
    let temp_dir = TempDir::new().unwrap();
    // The rendered prompt is the script body.
    let mut config = reviewer("sh -c {prompt}");
    config.prompt_template = "echo 'Summary for {task_id}'".to_string();
    let mut summarizer = AgentSummarizer::new(config, temp_dir.path());
    let t = task("TASK-001: A", TaskStatus::Done, "");

    let summary = summarizer.summarize(&id("TASK-001"), &t).unwrap();
    assert_eq!(summary, "Summary for TASK-001");
}

#[cfg(unix)]
#[test]
fn test_agent_summarizer_empty_output_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = reviewer("sh -c {prompt}");
    config.prompt_template = "true".to_string();
    let mut summarizer = AgentSummarizer::new(config, temp_dir.path());
    let t = task("TASK-001: A", TaskStatus::Done, "");

    let err = summarizer.summarize(&id("TASK-001"), &t).unwrap_err();
    assert!(matches!(err, RalphError::AgentError(_)));
}
