//! Configuration storage adapters.
//!
//! Both implement [`ConfigPort`]:
//!
//! | Adapter             | Backing                      | Encoding   |
//! |---------------------|------------------------------|------------|
//! | `JsonConfigFile`    | a JSON file on disk          | serde_json |
//! | `MemoryConfigStore` | an in-memory blob (NVS-like) | postcard   |
//!
//! Every save validates first; a stored config that fails to decode is
//! reported as [`ConfigError::Corrupted`].

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

/// Largest blob the in-memory store accepts.
const MAX_BLOB_SIZE: usize = 512;

// ── JSON file ─────────────────────────────────────────────────

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => {
                warn!("config: cannot read {}: {e}", self.path.display());
                ConfigError::IoError
            }
        })?;
        let config: SystemConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;

        // Write-then-rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                warn!("config: cannot write {}: {e}", self.path.display());
                ConfigError::IoError
            })?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}

// ── In-memory blob ────────────────────────────────────────────

/// Volatile store holding a postcard blob, the way the config sits in a
/// flash key-value partition.
#[derive(Default)]
pub struct MemoryConfigStore {
    blob: RefCell<Option<Vec<u8>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored blob size, if any.
    pub fn stored_len(&self) -> Option<usize> {
        self.blob.borrow().as_ref().map(Vec::len)
    }

    /// Overwrite the raw blob (used to simulate corruption).
    pub fn put_raw(&self, bytes: Vec<u8>) {
        *self.blob.borrow_mut() = Some(bytes);
    }
}

impl ConfigPort for MemoryConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let blob = self.blob.borrow();
        let bytes = blob.as_deref().ok_or(ConfigError::NotFound)?;
        let config: SystemConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::Corrupted)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::IoError);
        }
        *self.blob.borrow_mut() = Some(bytes);
        Ok(())
    }
}

/// Load the stored config, falling back to defaults on any failure.  On
/// first boot the defaults are persisted.
pub fn load_or_default(store: &impl ConfigPort) -> SystemConfig {
    match store.load() {
        Ok(config) => config,
        Err(ConfigError::NotFound) => {
            info!("config: none stored, writing defaults");
            let config = SystemConfig::default();
            if let Err(e) = store.save(&config) {
                warn!("config: could not persist defaults: {e}");
            }
            config
        }
        Err(e) => {
            warn!("config: {e}; using defaults");
            SystemConfig::default()
        }
    }
}
