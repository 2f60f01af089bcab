//! Asynchronous CSV audit logging.
//!
//! # Responsibilities
//! - Record one row per completed request without touching request latency
//! - Serialize appends through a single dedicated writer task
//! - Write the header exactly once, when the file is empty
//! - Swallow write failures (warn only); they never reach the request path
//!
//! Submission is a channel send, so handlers fire-and-forget. The router and
//! a backend log different columns, expressed as [`AuditRow`] impls.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

/// One loggable row. Implementors supply the header and the field values;
/// the writer prepends the timestamp column.
pub trait AuditRow: Send + 'static {
    fn header() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

/// Router-side record: which backend got the work.
#[derive(Debug, Clone)]
pub struct RoutedRow {
    pub work_id: u64,
    pub backend: String,
    pub result: String,
}

impl AuditRow for RoutedRow {
    fn header() -> &'static [&'static str] {
        &["timestamp", "work_id", "backend", "result"]
    }

    fn fields(&self) -> Vec<String> {
        vec![self.work_id.to_string(), self.backend.clone(), self.result.clone()]
    }
}

/// Backend-side record: what was processed and how loaded the backend was
/// on completion.
#[derive(Debug, Clone)]
pub struct HandledRow {
    pub work_id: u64,
    pub result: String,
    pub active_load: u64,
}

impl AuditRow for HandledRow {
    fn header() -> &'static [&'static str] {
        &["timestamp", "work_id", "result", "active_load"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.work_id.to_string(),
            self.result.clone(),
            self.active_load.to_string(),
        ]
    }
}

/// Cheap-to-clone handle for submitting audit rows.
#[derive(Debug, Clone)]
pub struct AuditLog<R: AuditRow> {
    tx: mpsc::UnboundedSender<R>,
}

impl<R: AuditRow> AuditLog<R> {
    /// Spawn the writer task for `path` and return the submission handle.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(path, rx));
        Self { tx }
    }

    /// Queue one row. Never blocks and never fails the caller.
    pub fn record(&self, row: R) {
        if self.tx.send(row).is_err() {
            tracing::warn!("audit writer is gone, dropping record");
        }
    }
}

async fn writer_task<R: AuditRow>(path: PathBuf, mut rx: mpsc::UnboundedReceiver<R>) {
    while let Some(row) = rx.recv().await {
        // File I/O is blocking; keep it off the runtime workers.
        let row_path = path.clone();
        let outcome = tokio::task::spawn_blocking(move || append_row(&row_path, &row)).await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!(path = %path.display(), %error, "audit write failed");
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "audit write task failed");
            }
        }
    }
    tracing::debug!(path = %path.display(), "audit writer stopped");
}

fn append_row<R: AuditRow>(path: &Path, row: &R) -> Result<(), csv::Error> {
    let file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::Writer::from_writer(file);
    if is_empty {
        writer.write_record(R::header())?;
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut record = vec![timestamp];
    record.extend(row.fields());
    writer.write_record(&record)?;
    writer.flush()?;
    Ok(())
}
