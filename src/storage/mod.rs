use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{app_config_path, config_env_dirs, ConfigPathError, APP_DIR};
use crate::settings::Settings;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read settings: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write settings: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse settings")]
    Parse(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

pub trait SettingsStore {
    /// Persisted values merged over [`Settings::default`].
    fn load(&self) -> StorageResult<Settings>;
    fn save(&self, settings: &Settings) -> StorageResult<()>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &S {
    fn load(&self) -> StorageResult<Settings> {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> StorageResult<()> {
        (**self).save(settings)
    }
}

#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// `settings.json` under the XDG config directory.
    pub fn with_default_path() -> StorageResult<Self> {
        let (xdg_config_home, home) = config_env_dirs();
        Self::in_config_root(xdg_config_home.as_deref(), home.as_deref())
    }

    pub fn in_config_root(
        xdg_config_home: Option<&Path>,
        home: Option<&Path>,
    ) -> StorageResult<Self> {
        let path = app_config_path(APP_DIR, SETTINGS_FILE, xdg_config_home, home).map_err(
            |error| match error {
                ConfigPathError::MissingHomeDirectory => StorageError::MissingHomeDirectory,
            },
        )?;
        Ok(Self::with_path(path))
    }

    /// `settings.json` directly inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_path(dir.join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> StorageResult<Settings> {
        if !self.path.exists() {
            tracing::debug!(path = ?self.path, "settings file missing; using defaults");
            return Ok(Settings::default());
        }
        let serialized = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&serialized)?)
    }

    fn save(&self, settings: &Settings) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let serialized = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, serialized).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::trace!(path = ?self.path, "settings saved");
        Ok(())
    }
}

/// Keeps settings in process; used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RefCell<Settings>,
    saves: Cell<usize>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(settings),
            saves: Cell::new(0),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.settings.borrow().clone()
    }

    pub fn replace(&self, settings: Settings) {
        *self.settings.borrow_mut() = settings;
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> StorageResult<Settings> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &Settings) -> StorageResult<()> {
        self.replace(settings.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
