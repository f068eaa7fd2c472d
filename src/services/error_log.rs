//! Append-only file of failed pushes.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::utils::timestamp;

const MARKER_RULE: &str = "========================================";

/// One failed push as written to the error log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub timestamp: String,
    pub channel: String,
    pub diagnostic: String,
    pub msg: String,
    pub title: String,
}

impl ErrorRecord {
    /// `[ts] channel - diagnostic | 请求参数: msg=... title=...`
    ///
    /// Embedded line breaks are escaped so a record never spans lines.
    pub fn to_line(&self) -> String {
        format!(
            "[{}] {} - {} | 请求参数: msg={} title={}",
            self.timestamp,
            single_line(&self.channel),
            single_line(&self.diagnostic),
            single_line(&self.msg),
            single_line(&self.title)
        )
    }
}

fn single_line(value: &str) -> String {
    value.replace('\r', "\\r").replace('\n', "\\n")
}

/// Serializes appends from concurrent requests.
///
/// The file is opened, appended and closed under the lock on every write, so
/// external rotation of the file is picked up without a restart.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &ErrorRecord) -> io::Result<()> {
        self.write(&format!("{}\n", record.to_line())).await
    }

    /// Mark a process start so records of different runs are easy to tell apart
    pub async fn write_startup_marker(&self) -> io::Result<()> {
        self.write(&format!(
            "\n{MARKER_RULE}\n本次启动时间: {}\n{MARKER_RULE}\n",
            timestamp()
        ))
        .await
    }

    async fn write(&self, text: &str) -> io::Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }
}
