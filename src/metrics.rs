use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::query::Context;

/// One answered question, written to `.parlbot/metrics.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEvent {
    /// RFC3339 timestamp
    pub timestamp: String,
    /// Where the question came in: "cli" or "http"
    pub source: String,
    /// Intent kind: "member", "party", "metric" or "unknown"
    pub intent: String,
    pub rows: usize,
    pub truncated: bool,
    /// Whether the answering model was called
    pub called_model: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// Build an event for a question with the current timestamp.
pub fn event(
    source: &str,
    context: &Context,
    called_model: bool,
    duration_ms: u64,
) -> QuestionEvent {
    QuestionEvent {
        timestamp: chrono::Utc::now().to_rfc3339(),
        source: source.to_string(),
        intent: context.intent.kind().to_string(),
        rows: context.data.row_count(),
        truncated: context.truncated,
        called_model,
        duration_ms,
        fault: context.fault().map(String::from),
    }
}

/// Append an event to `.parlbot/metrics.jsonl`.
///
/// Best-effort: silently ignores I/O errors.
pub fn emit(root: &Path, event: &QuestionEvent) {
    let path = Config::metrics_path(root);

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let Ok(line) = serde_json::to_string(event) else {
        return;
    };

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = writeln!(file, "{}", line);
}

/// Read all events, skipping lines that don't parse.
pub fn read_all(root: &Path) -> Vec<QuestionEvent> {
    let path = Config::metrics_path(root);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{assemble, ResolvedRows};
    use crate::types::Intent;
    use tempfile::TempDir;

    fn unknown_context() -> Context {
        assemble("안녕", Intent::Unknown, ResolvedRows::default(), 20)
    }

    #[test]
    fn test_emit_and_read() {
        let dir = TempDir::new().unwrap();
        emit(dir.path(), &event("cli", &unknown_context(), false, 42));

        let events = read_all(dir.path());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, "cli");
        assert_eq!(events[0].intent, "unknown");
        assert_eq!(events[0].rows, 0);
        assert!(!events[0].called_model);
        assert_eq!(events[0].duration_ms, 42);
    }

    #[test]
    fn test_fault_is_recorded() {
        let dir = TempDir::new().unwrap();
        let ctx = assemble(
            "국힘",
            Intent::Party {
                party: "국민의힘".into(),
            },
            ResolvedRows::failed(&anyhow::anyhow!("database is locked")),
            20,
        );
        emit(dir.path(), &event("http", &ctx, false, 1));
        let events = read_all(dir.path());
        assert_eq!(events[0].fault.as_deref(), Some("database is locked"));
    }

    #[test]
    fn test_read_skips_garbage_lines() {
        let dir = TempDir::new().unwrap();
        emit(dir.path(), &event("cli", &unknown_context(), false, 1));
        let path = Config::metrics_path(dir.path());
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        emit(dir.path(), &event("http", &unknown_context(), false, 2));

        assert_eq!(read_all(dir.path()).len(), 2);
    }

    #[test]
    fn test_read_nonexistent() {
        let dir = TempDir::new().unwrap();
        assert!(read_all(dir.path()).is_empty());
    }

    #[test]
    fn test_no_fault_not_serialized() {
        let ev = event("cli", &unknown_context(), false, 0);
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("fault"));
    }
}
