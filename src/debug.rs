use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSONL event sink. Cloning shares the same file and counters, so one
/// logger can follow a generator across several renders.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    pub fn log(&self, event: Value) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{event}");
        }
    }

    /// Logs `{"type": kind, ...fields}` and bumps the counter for `kind`.
    pub fn event(&self, kind: &str, fields: Value) {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(kind.to_string()));
        if let Value::Object(extra) = fields {
            object.extend(extra);
        }
        self.increment(kind, 1);
        self.log(Value::Object(object));
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let counts: Map<String, Value> = counters
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect();
            let summary = json!({
                "type": "debug.summary",
                "context": context,
                "counts": counts,
            });
            let _ = writeln!(state.writer, "{summary}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "complyreport_{name}_{}_{nanos}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn events_are_jsonl_and_summary_counts_them() {
        let path = temp_path("debug");
        let logger = DebugLogger::new(&path).unwrap();
        logger.event("report.page_break", json!({ "from_page": 1, "to_page": 2 }));
        logger.event("report.page_break", json!({ "from_page": 2, "to_page": 3 }));
        logger.event("report.finalize", json!({ "pages": 3 }));
        logger.emit_summary("test");
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["type"], "report.page_break");
        assert_eq!(lines[1]["to_page"], 3);
        assert_eq!(lines[3]["type"], "debug.summary");
        assert_eq!(lines[3]["counts"]["report.page_break"], 2);
        assert_eq!(lines[3]["counts"]["report.finalize"], 1);
        let _ = std::fs::remove_file(&path);
    }
}
