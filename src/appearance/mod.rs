use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::process::Command;

use thiserror::Error;

use crate::config::GsettingsConfig;

const GSETTINGS_COMMAND: &str = "gsettings";
const DCONF_COMMAND: &str = "dconf";

#[derive(Debug, Error)]
pub enum AppearanceError {
    #[error("failed to run {command}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with non-zero status: {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

pub type AppearanceResult<T> = std::result::Result<T, AppearanceError>;

/// A theme and the color scheme applied alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AppearancePair {
    pub theme: String,
    pub color_scheme: String,
}

impl AppearancePair {
    pub fn new(theme: impl Into<String>, color_scheme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            color_scheme: color_scheme.into(),
        }
    }
}

impl fmt::Display for AppearancePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let theme: &str = if self.theme.is_empty() {
            "<default>"
        } else {
            &self.theme
        };
        let scheme: &str = if self.color_scheme.is_empty() {
            "<default>"
        } else {
            &self.color_scheme
        };
        write!(f, "{theme} / {scheme}")
    }
}

/// The host's theme state. Reads are authoritative; the settings cache is not.
pub trait AppearanceService {
    fn current_theme(&self) -> AppearanceResult<String>;
    fn set_current_theme(&self, theme: &str) -> AppearanceResult<()>;
    fn current_color_scheme(&self) -> AppearanceResult<String>;
    fn set_current_color_scheme(&self, color_scheme: &str) -> AppearanceResult<()>;

    /// Tell dependents the appearance changed.
    fn refresh(&self) -> AppearanceResult<()> {
        Ok(())
    }

    fn current_pair(&self) -> AppearanceResult<AppearancePair> {
        Ok(AppearancePair {
            theme: self.current_theme()?,
            color_scheme: self.current_color_scheme()?,
        })
    }

    fn apply_pair(&self, pair: &AppearancePair) -> AppearanceResult<()> {
        self.set_current_color_scheme(&pair.color_scheme)?;
        self.set_current_theme(&pair.theme)
    }
}

impl<A: AppearanceService + ?Sized> AppearanceService for &A {
    fn current_theme(&self) -> AppearanceResult<String> {
        (**self).current_theme()
    }

    fn set_current_theme(&self, theme: &str) -> AppearanceResult<()> {
        (**self).set_current_theme(theme)
    }

    fn current_color_scheme(&self) -> AppearanceResult<String> {
        (**self).current_color_scheme()
    }

    fn set_current_color_scheme(&self, color_scheme: &str) -> AppearanceResult<()> {
        (**self).set_current_color_scheme(color_scheme)
    }

    fn refresh(&self) -> AppearanceResult<()> {
        (**self).refresh()
    }
}

/// Writes the desktop interface settings through `gsettings` and reads them
/// back from dconf.
///
/// An empty value resets the key, and a key at its schema default reads back
/// as empty, so whatever was written is what gets observed.
#[derive(Debug, Clone)]
pub struct GsettingsAppearance {
    config: GsettingsConfig,
    gsettings: String,
    dconf: String,
}

impl GsettingsAppearance {
    pub fn new(config: GsettingsConfig) -> Self {
        Self::with_programs(config, GSETTINGS_COMMAND, DCONF_COMMAND)
    }

    pub(crate) fn with_programs(
        config: GsettingsConfig,
        gsettings: impl Into<String>,
        dconf: impl Into<String>,
    ) -> Self {
        Self {
            config,
            gsettings: gsettings.into(),
            dconf: dconf.into(),
        }
    }

    /// `dconf read` prints nothing while the key sits at its schema default.
    fn get(&self, key: &str) -> AppearanceResult<String> {
        let path = format!("{}{key}", self.config.dconf_dir());
        let stdout = run_program(&self.dconf, &["read", &path])?;
        Ok(parse_gsettings_string(&stdout))
    }

    fn set(&self, key: &str, value: &str) -> AppearanceResult<()> {
        if value.is_empty() {
            run_program(&self.gsettings, &["reset", &self.config.schema, key])?;
        } else {
            run_program(&self.gsettings, &["set", &self.config.schema, key, value])?;
        }
        tracing::debug!(schema = %self.config.schema, key, value, "gsettings updated");
        Ok(())
    }
}

fn run_program(program: &str, args: &[&str]) -> AppearanceResult<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| AppearanceError::CommandIo {
            command: program.to_string(),
            source,
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(AppearanceError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl AppearanceService for GsettingsAppearance {
    fn current_theme(&self) -> AppearanceResult<String> {
        self.get(&self.config.theme_key)
    }

    fn set_current_theme(&self, theme: &str) -> AppearanceResult<()> {
        self.set(&self.config.theme_key, theme)
    }

    fn current_color_scheme(&self) -> AppearanceResult<String> {
        self.get(&self.config.color_scheme_key)
    }

    fn set_current_color_scheme(&self, color_scheme: &str) -> AppearanceResult<()> {
        self.set(&self.config.color_scheme_key, color_scheme)
    }

    fn refresh(&self) -> AppearanceResult<()> {
        // dconf broadcasts key changes to every running client.
        tracing::trace!("gsettings change notification is implicit");
        Ok(())
    }
}

/// `dconf read` prints GVariant text, e.g. `'Adwaita-dark'`.
fn parse_gsettings_string(stdout: &str) -> String {
    let trimmed = stdout.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(trimmed)
        .replace("\\'", "'")
}

/// In-process appearance host for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryAppearance {
    pair: RefCell<AppearancePair>,
    writes: Cell<usize>,
    reads: Cell<usize>,
    refreshes: Cell<usize>,
}

impl MemoryAppearance {
    pub fn new(pair: AppearancePair) -> Self {
        Self {
            pair: RefCell::new(pair),
            ..Self::default()
        }
    }

    pub fn pair(&self) -> AppearancePair {
        self.pair.borrow().clone()
    }

    /// Change the host state without counting it as a write.
    pub fn set_externally(&self, pair: AppearancePair) {
        *self.pair.borrow_mut() = pair;
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }

    /// True if the service was touched at all.
    pub fn was_called(&self) -> bool {
        self.reads.get() + self.writes.get() + self.refreshes.get() > 0
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }
}

impl AppearanceService for MemoryAppearance {
    fn current_theme(&self) -> AppearanceResult<String> {
        Self::bump(&self.reads);
        Ok(self.pair.borrow().theme.clone())
    }

    fn set_current_theme(&self, theme: &str) -> AppearanceResult<()> {
        Self::bump(&self.writes);
        self.pair.borrow_mut().theme = theme.to_string();
        Ok(())
    }

    fn current_color_scheme(&self) -> AppearanceResult<String> {
        Self::bump(&self.reads);
        Ok(self.pair.borrow().color_scheme.clone())
    }

    fn set_current_color_scheme(&self, color_scheme: &str) -> AppearanceResult<()> {
        Self::bump(&self.writes);
        self.pair.borrow_mut().color_scheme = color_scheme.to_string();
        Ok(())
    }

    fn refresh(&self) -> AppearanceResult<()> {
        Self::bump(&self.refreshes);
        Ok(())
    }
}
