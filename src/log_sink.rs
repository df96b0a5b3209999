// SYNOID Voiceline - Append-only Server Log
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Persistent request journal, separate from the tracing console output.
// Each entry is one line: `<RFC3339 UTC timestamp> - <message>`.

use std::fs::OpenOptions;
use std::io::{LineWriter, Write};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::warn;

pub trait LogSink: Send + Sync {
    fn append(&self, message: &str);

    /// Flush buffered lines. Called once at shutdown.
    fn close(&self) {}
}

fn stamp(message: &str) -> String {
    format!(
        "{} - {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

/// Appends to a file opened once at startup.
///
/// Lines are queued to a dedicated writer thread, so `append` never touches
/// the disk on an async worker. The channel keeps lines whole and in order.
pub struct FileLog {
    sender: Mutex<Option<Sender<String>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl FileLog {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;

        let (sender, receiver) = mpsc::channel::<String>();
        let writer = thread::Builder::new()
            .name("server-log".to_string())
            .spawn(move || {
                let mut out = LineWriter::new(file);
                for line in receiver {
                    if let Err(e) = writeln!(out, "{}", line) {
                        warn!("[LOG] Failed to append to server log: {}", e);
                    }
                }
                if let Err(e) = out.flush() {
                    warn!("[LOG] Failed to flush server log: {}", e);
                }
            })
            .context("Failed to start log writer thread")?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            writer: Mutex::new(Some(writer)),
        })
    }
}

impl LogSink for FileLog {
    fn append(&self, message: &str) {
        let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        match sender.as_ref() {
            Some(tx) => {
                if tx.send(stamp(message)).is_err() {
                    warn!("[LOG] Log writer has stopped, dropping: {}", message);
                }
            }
            None => warn!("[LOG] Append after close, dropping: {}", message),
        }
    }

    /// Drains queued lines and waits for the writer to finish.
    fn close(&self) {
        // Dropping the sender ends the writer's receive loop.
        drop(self.sender.lock().unwrap_or_else(|e| e.into_inner()).take());
        let handle = self.writer.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("[LOG] Log writer thread panicked");
            }
        }
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Keeps lines in memory for inspection.
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl LogSink for MemoryLog {
    fn append(&self, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(stamp(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_log_appends_timestamped_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.log");

        let log = FileLog::open(&path).unwrap();
        log.append("Server is running on port 3000");
        log.append("GET / - Served index.html");
        log.close();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - Server is running on port 3000"));
        let (timestamp, _) = lines[1].split_once(" - ").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_file_log_keeps_existing_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.log");
        std::fs::write(&path, "old line\n").unwrap();

        let log = FileLog::open(&path).unwrap();
        log.append("new line");
        log.close();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("old line\n"));
        assert!(content.trim_end().ends_with("new line"));
    }

    #[test]
    fn test_concurrent_appends_never_interleave() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.log");
        let log = std::sync::Arc::new(FileLog::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.append(&format!("thread {} entry {}", t, i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        log.close();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 400);
        assert!(content.lines().all(|l| l.contains(" - thread ")));
    }

    #[test]
    fn test_append_after_close_is_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.log");

        let log = FileLog::open(&path).unwrap();
        log.append("before close");
        log.close();
        log.append("after close");
        log.close();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("before close"));
    }

    #[tokio::test]
    async fn test_append_from_async_task_lands_on_close() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.log");
        let log = std::sync::Arc::new(FileLog::open(&path).unwrap());

        let task_log = log.clone();
        tokio::spawn(async move {
            for i in 0..20 {
                task_log.append(&format!("request {}", i));
            }
        })
        .await
        .unwrap();
        log.close();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 20);
        assert!(lines[0].ends_with(" - request 0"));
        assert!(lines[19].ends_with(" - request 19"));
    }

    #[test]
    fn test_memory_log_records() {
        let log = MemoryLog::new();
        log.append("stage generating");
        assert!(log.contains("stage generating"));
        assert_eq!(log.lines().len(), 1);
    }
}
