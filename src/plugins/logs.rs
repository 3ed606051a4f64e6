//! Log file access shared by every plugin whose resources run as instances.

use crate::client::DroveClient;
use crate::constants;
use crate::error::Error;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// The instance whose log files are addressed.
#[derive(Debug, Clone, Copy)]
pub struct LogTarget<'a> {
    /// Resource kind as used in the logfiles API, e.g. `applications`.
    pub kind: &'a str,
    pub app_id: &'a str,
    pub instance_id: &'a str,
}

impl<'a> LogTarget<'a> {
    #[must_use]
    pub const fn new(kind: &'a str, app_id: &'a str, instance_id: &'a str) -> Self {
        Self {
            kind,
            app_id,
            instance_id,
        }
    }

    fn base_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            constants::PATH_LOGFILES,
            self.kind,
            self.app_id,
            self.instance_id
        )
    }

    #[must_use]
    pub fn list_path(&self) -> String {
        format!("{}/list", self.base_path())
    }

    /// `offset = None` asks the server for the current file size.
    #[must_use]
    pub fn read_path(&self, file: &str, offset: Option<u64>, length: u64) -> String {
        let offset = offset.map_or_else(|| "-1".to_string(), |o| o.to_string());
        format!(
            "{}/read/{file}?offset={offset}&length={length}",
            self.base_path()
        )
    }

    #[must_use]
    pub fn download_path(&self, file: &str) -> String {
        format!("{}/download/{file}", self.base_path())
    }
}

/// File names from a log listing body; a body without `files` lists nothing.
#[must_use]
pub fn log_file_names(body: &Value) -> Vec<String> {
    body.get("files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Lists the log files of an instance.
///
/// # Errors
/// Propagates client errors.
pub async fn list_logs(client: &DroveClient, target: LogTarget<'_>) -> Result<Vec<String>, Error> {
    let body = client.get_raw(&target.list_path(), 200).await?;
    Ok(log_file_names(&body))
}

/// Downloads a log file to `destination`, returning the bytes written.
///
/// # Errors
/// Propagates client errors.
pub async fn download_log(
    client: &DroveClient,
    target: LogTarget<'_>,
    file: &str,
    destination: &Path,
) -> Result<u64, Error> {
    Ok(client
        .get_to_file(&target.download_path(file), destination, 200)
        .await?)
}

/// Incremental reader that follows the end of a log file.
#[derive(Debug)]
pub struct LogTail<'a> {
    client: &'a DroveClient,
    target: LogTarget<'a>,
    file: &'a str,
    offset: Option<u64>,
}

impl<'a> LogTail<'a> {
    #[must_use]
    pub const fn new(client: &'a DroveClient, target: LogTarget<'a>, file: &'a str) -> Self {
        Self {
            client,
            target,
            file,
            offset: None,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    async fn read(&self, offset: Option<u64>, length: u64) -> Result<Value, Error> {
        let path = self.target.read_path(self.file, offset, length);
        Ok(self.client.get_raw(&path, 200).await?)
    }

    /// Fetches the next chunk of the file. Returns an empty string when
    /// nothing new has been written.
    ///
    /// The first call starts a little before the current end of the file.
    ///
    /// # Errors
    /// Propagates client errors.
    pub async fn poll(&mut self) -> Result<String, Error> {
        let offset = match self.offset {
            Some(offset) => offset,
            None => {
                let size = self
                    .read(None, 0)
                    .await?
                    .get("offset")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                let start = size.saturating_sub(constants::TAIL_INITIAL_BYTES);
                debug!(target: "drove::logs", size, start, "starting tail");
                self.offset = Some(start);
                start
            }
        };

        let body = self.read(Some(offset), constants::TAIL_READ_LENGTH).await?;
        let data = body
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.offset = Some(offset + data.len() as u64);
        Ok(data)
    }

    /// Writes new log content to `out` until an error occurs or the process
    /// is interrupted.
    ///
    /// # Errors
    /// Propagates client errors and write failures.
    pub async fn follow<W: Write>(&mut self, out: &mut W) -> Result<(), Error> {
        loop {
            let data = self.poll().await?;
            if data.is_empty() {
                tokio::time::sleep(Duration::from_millis(constants::TAIL_POLL_INTERVAL_MS)).await;
                continue;
            }
            out.write_all(data.as_bytes())?;
            out.flush()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths() {
        let target = LogTarget::new("applications", "APP-1", "AI-123");
        assert_eq!(
            target.list_path(),
            "/apis/v1/logfiles/applications/APP-1/AI-123/list"
        );
        assert_eq!(
            target.read_path("output.log", None, 0),
            "/apis/v1/logfiles/applications/APP-1/AI-123/read/output.log?offset=-1&length=0"
        );
        assert_eq!(
            target.read_path("output.log", Some(10), 20),
            "/apis/v1/logfiles/applications/APP-1/AI-123/read/output.log?offset=10&length=20"
        );
        assert_eq!(
            target.download_path("output.log"),
            "/apis/v1/logfiles/applications/APP-1/AI-123/download/output.log"
        );
    }

    #[test]
    fn test_log_file_names() {
        assert_eq!(
            log_file_names(&json!({"files": ["output.log", "error.log"]})),
            vec!["output.log".to_string(), "error.log".to_string()]
        );
    }

    #[test]
    fn test_missing_files_is_empty_listing() {
        assert!(log_file_names(&json!({})).is_empty());
        assert!(log_file_names(&json!({"status": "FAILED"})).is_empty());
        assert!(log_file_names(&json!({"files": null})).is_empty());
    }
}
