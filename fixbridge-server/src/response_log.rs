/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Command/response audit log.
//!
//! [`ResponseLog`] is a cheap cloneable handle. Recording pushes onto a
//! bounded channel with `try_send`, so a slow disk never stalls a command;
//! entries that do not fit are counted and dropped. A background task owns
//! the file and appends one line per entry:
//!
//! ```text
//! [2026-10-17T09:30:00Z] PING -> OK PONG
//! ```

use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Line count at which the file is trimmed on startup.
pub const ROTATE_THRESHOLD: usize = 1000;

/// Number of newest lines kept after trimming.
pub const ROTATE_KEEP: usize = 500;

/// Entries buffered between the handle and the writer task.
pub const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Entry {
    at: DateTime<Utc>,
    command: String,
    response: String,
}

/// Handle used by the command server to record each exchange.
#[derive(Debug, Clone, Default)]
pub struct ResponseLog {
    tx: Option<mpsc::Sender<Entry>>,
    dropped: Arc<AtomicU64>,
}

impl ResponseLog {
    /// A handle that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Rotates `path`, opens it for appending and spawns the writer task.
    ///
    /// The task ends once every clone of the returned handle is dropped.
    ///
    /// # Errors
    /// Returns an I/O error if the directory cannot be created or the file
    /// cannot be rotated or opened.
    pub async fn spawn(path: impl Into<PathBuf>) -> io::Result<(Self, JoinHandle<()>)> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        rotate(&path, ROTATE_THRESHOLD, ROTATE_KEEP).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        info!(path = %path.display(), "response log opened");

        let (tx, mut rx) = mpsc::channel::<Entry>(CHANNEL_CAPACITY);
        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let line = format_entry(&entry.at, &entry.command, &entry.response);
                if let Err(e) = write_line(&mut file, &line).await {
                    warn!(error = %e, "response log write failed");
                }
            }
            debug!("response log writer stopped");
        });

        Ok((
            Self {
                tx: Some(tx),
                dropped: Arc::new(AtomicU64::new(0)),
            },
            handle,
        ))
    }

    /// Returns true if entries are written somewhere.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queues one exchange without waiting.
    pub fn record(&self, command: &str, response: &str) {
        let Some(tx) = &self.tx else {
            return;
        };
        let entry = Entry {
            at: Utc::now(),
            command: command.to_string(),
            response: response.to_string(),
        };
        if tx.try_send(entry).is_err() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(dropped, "response log entry dropped");
        }
    }

    /// Entries discarded because the writer fell behind or stopped.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

async fn write_line(file: &mut fs::File, line: &str) -> io::Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await
}

/// Formats one log line, without the trailing newline.
#[must_use]
pub fn format_entry(at: &DateTime<Utc>, command: &str, response: &str) -> String {
    format!(
        "[{}] {} -> {}",
        at.format("%Y-%m-%dT%H:%M:%SZ"),
        command,
        response
    )
}

/// Trims `path` to its newest `keep` lines when it holds at least
/// `threshold` lines. Returns true if the file was rewritten.
///
/// A missing file is not an error.
///
/// # Errors
/// Returns an I/O error if the file exists but cannot be read or rewritten.
pub async fn rotate(path: &Path, threshold: usize, keep: usize) -> io::Result<bool> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < threshold {
        return Ok(false);
    }

    let start = lines.len().saturating_sub(keep);
    let mut kept = lines[start..].join("\n");
    kept.push('\n');
    fs::write(path, kept).await?;
    info!(
        path = %path.display(),
        before = lines.len(),
        after = lines.len() - start,
        "response log rotated"
    );
    Ok(true)
}
