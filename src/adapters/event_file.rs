//! Append-only event log file (the SD card's `events.txt` on the board).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use log::{debug, info};

use crate::app::ports::EventLogPort;
use crate::error::LogError;

pub struct FileEventLog {
    path: PathBuf,
    file: Option<File>,
}

impl FileEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }
}

impl EventLogPort for FileEventLog {
    fn init(&mut self) -> Result<(), LogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                debug!("event log: open {} failed: {e}", self.path.display());
                LogError::OpenFailed
            })?;
        info!("event log: appending to {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn append(&mut self, line: &str) -> Result<(), LogError> {
        let file = self.file.as_mut().ok_or(LogError::Unavailable)?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|_| LogError::ShortWrite)
    }
}
