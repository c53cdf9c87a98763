//! Usage events handed to an external sink, and the JSONL log they end up in.

use assistant_core::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    pub top_k: usize,
}

impl AnalyticsEvent {
    pub fn chat(question: impl Into<String>, top_k: usize) -> Self {
        Self {
            kind: "chat".to_string(),
            question: question.into(),
            top_k,
        }
    }
}

/// Receives events. Implementations must not block for long.
pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: &AnalyticsEvent);
}

/// Emits each event as a structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn track(&self, event: &AnalyticsEvent) {
        tracing::info!(
            target: "assistant::analytics",
            event_type = %event.kind,
            question = %event.question,
            top_k = event.top_k,
            "analytics event"
        );
    }
}

/// Appends each event as one JSON line to a file.
///
/// The parent directory is created on first write. Write failures are logged
/// and dropped; answering a question never fails because of analytics.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &AnalyticsEvent) -> AppResult<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl AnalyticsSink for JsonlSink {
    fn track(&self, event: &AnalyticsEvent) {
        TracingSink.track(event);
        if let Err(e) = self.append(event) {
            tracing::warn!(path = %self.path.display(), "Failed to record analytics event: {}", e);
        }
    }
}

/// How often a question was asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCount {
    pub question: String,
    pub count: usize,
}

/// The `limit` most frequent questions in an analytics log.
///
/// Sorted by count, highest first; equal counts keep the order in which the
/// questions first appeared. Lines that are not chat events are skipped. A
/// missing file means nothing has been asked yet.
pub fn top_queries(path: &Path, limit: usize) -> AppResult<Vec<QueryCount>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(fs::File::open(path)?);
    let mut counts: Vec<QueryCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<AnalyticsEvent>(&line) {
            Ok(event) if event.kind == "chat" => event,
            Ok(_) => continue,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        match positions.get(&event.question) {
            Some(&i) => counts[i].count += 1,
            None => {
                positions.insert(event.question.clone(), counts.len());
                counts.push(QueryCount {
                    question: event.question,
                    count: 1,
                });
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(path = %path.display(), skipped, "Skipped malformed analytics lines");
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_chat_event_shape() {
        let event = AnalyticsEvent::chat("How many leave days?", 4);
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "chat", "question": "How many leave days?", "top_k": 4})
        );
    }

    #[test]
    fn test_tracing_sink_accepts_events() {
        TracingSink.track(&AnalyticsEvent::chat("q", 1));
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("analytics.jsonl");
        let sink = JsonlSink::new(&path);

        sink.track(&AnalyticsEvent::chat("first", 4));
        sink.track(&AnalyticsEvent::chat("second", 2));

        let content = fs::read_to_string(&path).unwrap();
        let events: Vec<AnalyticsEvent> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            events,
            vec![AnalyticsEvent::chat("first", 4), AnalyticsEvent::chat("second", 2)]
        );
    }

    #[test]
    fn test_jsonl_sink_write_failure_is_swallowed() {
        let temp = TempDir::new().unwrap();
        // A directory where the file should be makes every append fail.
        let path = temp.path().join("analytics.jsonl");
        fs::create_dir(&path).unwrap();

        JsonlSink::new(&path).track(&AnalyticsEvent::chat("q", 1));
        assert!(path.is_dir());
    }

    #[test]
    fn test_top_queries_orders_by_count() {
        let temp = TempDir::new().unwrap();
        let sink = JsonlSink::new(temp.path().join("analytics.jsonl"));
        for question in ["leave", "badge", "leave", "parking", "badge", "leave"] {
            sink.track(&AnalyticsEvent::chat(question, 4));
        }

        let top = top_queries(sink.path(), 10).unwrap();
        let pairs: Vec<(&str, usize)> = top.iter().map(|q| (q.question.as_str(), q.count)).collect();
        assert_eq!(pairs, vec![("leave", 3), ("badge", 2), ("parking", 1)]);

        let top = top_queries(sink.path(), 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].question, "badge");
    }

    #[test]
    fn test_top_queries_ties_keep_first_seen_order() {
        let temp = TempDir::new().unwrap();
        let sink = JsonlSink::new(temp.path().join("analytics.jsonl"));
        for question in ["zeta", "alpha", "alpha", "zeta", "mid"] {
            sink.track(&AnalyticsEvent::chat(question, 4));
        }

        let top = top_queries(sink.path(), 10).unwrap();
        let questions: Vec<&str> = top.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_top_queries_skips_malformed_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("analytics.jsonl");
        let content = [
            r#"{"type":"chat","question":"leave","top_k":4}"#,
            "not json at all",
            r#"{"type":"chat","question":"leave""#,
            "",
            r#"{"type":"feedback","question":"leave","top_k":4}"#,
            r#"{"question":"missing type"}"#,
            r#"{"type":"chat","question":"badge","top_k":2}"#,
            r#"{"type":"chat","question":"leave","top_k":4}"#,
        ]
        .join("\n");
        fs::write(&path, content).unwrap();

        let top = top_queries(&path, 5).unwrap();
        assert_eq!(
            top,
            vec![
                QueryCount { question: "leave".to_string(), count: 2 },
                QueryCount { question: "badge".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_top_queries_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let top = top_queries(&temp.path().join("absent.jsonl"), 5).unwrap();
        assert!(top.is_empty());
    }
}
