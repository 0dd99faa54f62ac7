//! Wiring between the command line, configuration and the controller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::appearance::{
    AppearancePair, AppearanceService, GsettingsAppearance, MemoryAppearance,
};
use crate::config::{load_app_config, load_app_config_from, AppConfig, APP_CONFIG_FILE};
use crate::controller::{Status, TickOutcome, ToggleController};
use crate::daemon;
use crate::error::AppResult;
use crate::notification;
use crate::schedule::{Clock, LocalClock, Window};
use crate::storage::{JsonSettingsStore, MemorySettingsStore, SettingsStore};

pub type DynController<'a> = ToggleController<&'a dyn AppearanceService, &'a dyn SettingsStore>;

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Directory holding `settings.json` and `config.json`; XDG default when unset.
    pub config_dir: Option<PathBuf>,
    /// Drive an in-memory host seeded from the cached appearance.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub interval: Option<Duration>,
    pub interactive: bool,
}

pub struct App {
    options: AppOptions,
    config: AppConfig,
    store: JsonSettingsStore,
}

impl App {
    pub fn new(options: AppOptions) -> AppResult<Self> {
        let (config, store) = match options.config_dir.as_deref() {
            Some(dir) => (
                load_app_config_from(&dir.join(APP_CONFIG_FILE)),
                JsonSettingsStore::in_dir(dir),
            ),
            None => (load_app_config(), JsonSettingsStore::with_default_path()?),
        };
        tracing::debug!(settings = ?store.path(), dry_run = options.dry_run, "app configured");
        Ok(Self {
            options,
            config,
            store,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn settings_path(&self) -> &Path {
        self.store.path()
    }

    /// Run the scheduler until shutdown. Ticks once immediately.
    pub fn run(&self, run_options: RunOptions) -> AppResult<()> {
        let interval = run_options.interval.unwrap_or_else(|| self.config.tick_interval());
        let notify = self.config.notify_on_toggle;
        self.with_controller(|controller| {
            let (handle, commands) = daemon::channel();
            if run_options.interactive {
                daemon::spawn_stdin_reader(handle.clone());
            }
            let result =
                daemon::run_loop(controller, &LocalClock, interval, &commands, |window, pair| {
                    if notify {
                        notification::send_toggled(window, pair);
                    }
                });
            drop(handle);
            result
        })
    }

    pub fn tick(&self) -> AppResult<TickOutcome> {
        self.with_controller(|controller| Ok(controller.tick(LocalClock.now())?))
    }

    pub fn toggle(&self) -> AppResult<(Window, AppearancePair)> {
        let (window, pair) = self.with_controller(|controller| {
            let window = controller.manual_toggle()?;
            Ok((window, controller.settings().pair_for(window)))
        })?;
        if self.config.notify_on_toggle {
            notification::send_toggled(window, &pair);
        }
        Ok((window, pair))
    }

    pub fn status(&self) -> AppResult<Status> {
        self.with_controller(|controller| Ok(controller.status(LocalClock.now())?))
    }

    fn with_controller<R>(
        &self,
        f: impl FnOnce(&mut DynController<'_>) -> AppResult<R>,
    ) -> AppResult<R> {
        let settings = self.store.load()?;
        if self.options.dry_run {
            let host = MemoryAppearance::new(settings.cached_pair());
            let store = MemorySettingsStore::new(settings.clone());
            let mut controller: DynController<'_> = ToggleController::new(
                settings,
                &host as &dyn AppearanceService,
                &store as &dyn SettingsStore,
            );
            let result = finish(&mut controller, f);
            tracing::info!(applied = %host.pair(), writes = host.write_count(), "dry run finished");
            result
        } else {
            let host = GsettingsAppearance::new(self.config.gsettings.clone());
            let mut controller: DynController<'_> = ToggleController::new(
                settings,
                &host as &dyn AppearanceService,
                &self.store as &dyn SettingsStore,
            );
            finish(&mut controller, f)
        }
    }
}

/// Run `f`, then report a save that is still pending instead of dropping it.
fn finish<R>(
    controller: &mut DynController<'_>,
    f: impl FnOnce(&mut DynController<'_>) -> AppResult<R>,
) -> AppResult<R> {
    let result = f(controller)?;
    controller.flush()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::state::ToggleState;
    use std::fs;

    fn fixture_dir() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        path.push(format!("daynight-app-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn seeded_app(settings: &Settings, config: &str) -> (App, PathBuf) {
        let dir = fixture_dir();
        fs::write(dir.join(APP_CONFIG_FILE), config).unwrap();
        JsonSettingsStore::in_dir(&dir).save(settings).unwrap();
        let app = App::new(AppOptions {
            config_dir: Some(dir.clone()),
            dry_run: true,
        })
        .unwrap();
        (app, dir)
    }

    #[test]
    fn config_dir_override_reads_both_files() {
        let (app, dir) = seeded_app(&Settings::default(), r#"{ "tick_interval_secs": 30 }"#);
        assert_eq!(app.config().tick_interval(), Duration::from_secs(30));
        assert_eq!(app.settings_path(), dir.join("settings.json"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn dry_run_toggle_leaves_persisted_settings_untouched() {
        let settings = Settings {
            plugin_enabled: true,
            day_theme: "Adwaita".into(),
            night_theme: "Adwaita-dark".into(),
            current_theme: "Adwaita-dark".into(),
            ..Settings::default()
        };
        let (app, dir) = seeded_app(&settings, r#"{ "notify_on_toggle": false }"#);

        let (window, pair) = app.toggle().unwrap();
        assert_eq!(window, Window::Day);
        assert_eq!(pair.theme, "Adwaita");

        let persisted = JsonSettingsStore::in_dir(&dir).load().unwrap();
        assert_eq!(persisted, settings);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn dry_run_status_reflects_pause_flag() {
        let settings = Settings {
            pause_theme_toggle: true,
            ..Settings::default()
        };
        let (app, dir) = seeded_app(&settings, "{}");

        let status = app.status().unwrap();
        assert_eq!(status.state, ToggleState::Paused);
        assert!(!status.enabled);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn dry_run_tick_with_disabled_plugin_is_noop() {
        let (app, dir) = seeded_app(&Settings::default(), "{}");
        assert_eq!(app.tick().unwrap(), TickOutcome::Disabled);
        let _ = fs::remove_dir_all(dir);
    }
}
