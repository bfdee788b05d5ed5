//! Per-sandbox build log

use repro_errors::SandboxError;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

enum Sink {
    Discard,
    File { path: PathBuf, writer: BufWriter<File> },
}

/// Transcript of the commands run in one sandbox.
///
/// Each command is written as a `--> <command>` header followed by its
/// combined output. [`BuildLog::discard`] keeps nothing.
pub struct BuildLog {
    sink: Sink,
}

impl BuildLog {
    #[must_use]
    pub fn discard() -> Self {
        Self { sink: Sink::Discard }
    }

    /// Create `<dir>/<package>.log`, truncating an earlier run's log
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::LogFailed` if the directory or file cannot be
    /// created.
    pub async fn open(dir: &Path, package: &str) -> Result<Self, SandboxError> {
        let path = dir.join(format!("{package}.log"));
        let failed = |e: std::io::Error| SandboxError::LogFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(dir).await.map_err(failed)?;
        let file = File::create(&path).await.map_err(failed)?;

        Ok(Self {
            sink: Sink::File {
                writer: BufWriter::new(file),
                path,
            },
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            Sink::Discard => None,
            Sink::File { path, .. } => Some(path),
        }
    }

    /// Append one command and its output
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::LogFailed` if the write fails.
    pub async fn record(&mut self, command: &str, output: &str) -> Result<(), SandboxError> {
        let Sink::File { path, writer } = &mut self.sink else {
            return Ok(());
        };

        let entry = format!("\n\n--> {command}\n\n{output}");
        writer
            .write_all(entry.as_bytes())
            .await
            .map_err(|e| SandboxError::LogFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// Flush and release the log file
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::LogFailed` if buffered output cannot be flushed.
    pub async fn close(self) -> Result<(), SandboxError> {
        if let Sink::File { path, mut writer } = self.sink {
            writer
                .shutdown()
                .await
                .map_err(|e| SandboxError::LogFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}
