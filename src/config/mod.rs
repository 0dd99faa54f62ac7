use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

pub const APP_DIR: &str = "daynight";
pub const APP_CONFIG_FILE: &str = "config.json";

const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
const DEFAULT_GSETTINGS_SCHEMA: &str = "org.gnome.desktop.interface";
const DEFAULT_THEME_KEY: &str = "gtk-theme";
const DEFAULT_COLOR_SCHEME_KEY: &str = "color-scheme";

/// Which gsettings schema and keys hold the theme and color scheme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GsettingsConfig {
    pub schema: String,
    pub theme_key: String,
    pub color_scheme_key: String,
    /// dconf directory backing `schema`; derived from the schema id when unset.
    pub dconf_path: Option<String>,
}

impl Default for GsettingsConfig {
    fn default() -> Self {
        Self {
            schema: DEFAULT_GSETTINGS_SCHEMA.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            color_scheme_key: DEFAULT_COLOR_SCHEME_KEY.to_string(),
            dconf_path: None,
        }
    }
}

impl GsettingsConfig {
    /// Directory holding the keys, always with a trailing slash.
    pub fn dconf_dir(&self) -> String {
        let mut dir = match self.dconf_path.as_deref() {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => format!("/{}", self.schema.replace('.', "/")),
        };
        if !dir.ends_with('/') {
            dir.push('/');
        }
        dir
    }
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tick_interval_secs: u64,
    pub notify_on_toggle: bool,
    pub gsettings: GsettingsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            notify_on_toggle: true,
            gsettings: GsettingsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

pub(crate) fn load_app_config_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    load_app_config_from(&path)
}

/// Read `config.json` at `path`, falling back to defaults when it is absent
/// or unreadable.
pub fn load_app_config_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
