use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum LogSinkError {
    #[error("failed to open log file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log file {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Журнал сессии: входящие команды как есть и исходящие отчёты.
/// Каждая строка сбрасывается на диск сразу. После `close` запись молча
/// игнорируется.
#[derive(Debug)]
pub(crate) struct LogSink {
    path: Option<PathBuf>,
    file: Option<File>,
}

impl LogSink {
    pub(crate) fn disabled() -> Self {
        Self {
            path: None,
            file: None,
        }
    }

    pub(crate) fn open_append(path: impl AsRef<Path>) -> Result<Self, LogSinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogSinkError::Open {
                path: path.clone(),
                source,
            })?;

        debug!("logging session to {:?}", path);
        Ok(Self {
            path: Some(path),
            file: Some(file),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub(crate) fn write_line(&mut self, line: &str) -> Result<(), LogSinkError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        writeln!(file, "{line}")
            .and_then(|_| file.flush())
            .map_err(|source| LogSinkError::Write {
                path: self.path.clone().unwrap_or_default(),
                source,
            })
    }

    /// Закрыть один раз; ошибки закрытия только в лог
    pub(crate) fn close(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.sync_all() {
                warn!("log file sync failed: {e}");
            }
        }
    }
}
