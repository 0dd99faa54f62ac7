//! Toggle controller: decides on every tick or manual action whether the
//! appearance service should be driven, honouring the manual-override pause.

use chrono::NaiveTime;
use thiserror::Error;

use crate::appearance::{AppearanceError, AppearancePair, AppearanceService};
use crate::schedule::{resolve, ScheduleError, Window};
use crate::settings::Settings;
use crate::state::{StateError, StateMachine, ToggleEvent, ToggleState};
use crate::storage::{SettingsStore, StorageError};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Appearance(#[from] AppearanceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    State(#[from] StateError),
}

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The plugin is switched off; the host was not touched.
    Disabled,
    Applied {
        window: Window,
        pair: AppearancePair,
    },
    Unchanged {
        window: Window,
    },
    /// The manual appearance matched a configured pair; automatic switching resumes.
    Resumed {
        window: Window,
    },
    StillPaused {
        window: Window,
    },
}

impl TickOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, TickOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub enabled: bool,
    pub state: ToggleState,
    pub window: Window,
    pub target: AppearancePair,
    pub observed: AppearancePair,
    pub day: AppearancePair,
    pub night: AppearancePair,
}

pub struct ToggleController<A, S> {
    settings: Settings,
    appearance: A,
    store: S,
    machine: StateMachine,
    unsaved: bool,
}

impl<A: AppearanceService, S: SettingsStore> ToggleController<A, S> {
    pub fn new(settings: Settings, appearance: A, store: S) -> Self {
        let machine = StateMachine::with_state(ToggleState::from_pause_flag(
            settings.pause_theme_toggle,
        ));
        Self {
            settings,
            appearance,
            store,
            machine,
            unsaved: false,
        }
    }

    pub fn load(appearance: A, store: S) -> ControllerResult<Self> {
        let settings = store.load()?;
        Ok(Self::new(settings, appearance, store))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> ToggleState {
        self.machine.state()
    }

    pub fn appearance(&self) -> &A {
        &self.appearance
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True while the in-memory settings are ahead of the store.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Retry a save that failed earlier; no-op when nothing is pending.
    pub fn flush(&mut self) -> ControllerResult<()> {
        if self.unsaved {
            self.store.save(&self.settings)?;
            self.unsaved = false;
            tracing::info!("pending settings saved");
        }
        Ok(())
    }

    /// Re-read settings from the store, picking up edits made elsewhere.
    /// Pending changes are written first; if that fails the in-memory
    /// settings stay as they are.
    pub fn reload(&mut self) -> ControllerResult<()> {
        self.flush()?;
        let settings = self.store.load()?;
        if settings != self.settings {
            tracing::debug!("settings changed on disk; reloaded");
        }
        self.machine =
            StateMachine::with_state(ToggleState::from_pause_flag(settings.pause_theme_toggle));
        self.settings = settings;
        Ok(())
    }

    pub fn resolve_window(&self, now: NaiveTime) -> ControllerResult<Window> {
        let day = self.settings.day_start()?;
        let night = self.settings.night_start()?;
        Ok(resolve(now, day, night))
    }

    pub fn tick(&mut self, now: NaiveTime) -> ControllerResult<TickOutcome> {
        if !self.settings.plugin_enabled {
            tracing::trace!("tick skipped; plugin disabled");
            return Ok(TickOutcome::Disabled);
        }

        let window = self.resolve_window(now)?;
        let target = self.settings.pair_for(window);
        let observed = self.appearance.current_pair()?;

        match self.machine.state() {
            ToggleState::Active => {
                if observed == target {
                    return Ok(TickOutcome::Unchanged { window });
                }
                tracing::info!(%window, from = %observed, to = %target, "scheduled switch");
                self.apply(&target)?;
                Ok(TickOutcome::Applied {
                    window,
                    pair: target,
                })
            }
            ToggleState::Paused => {
                let settled =
                    observed == self.settings.day_pair() || observed == self.settings.night_pair();
                if !settled {
                    tracing::debug!(observed = %observed, "paused; appearance not settled");
                    return Ok(TickOutcome::StillPaused { window });
                }
                self.machine.transition(ToggleEvent::Confirm)?;
                self.settings.pause_theme_toggle = false;
                self.persist();
                tracing::info!(observed = %observed, "manual appearance confirmed; resuming schedule");
                Ok(TickOutcome::Resumed { window })
            }
        }
    }

    /// Flip to the pair opposite the observed one and pause automatic switching.
    pub fn manual_toggle(&mut self) -> ControllerResult<Window> {
        let observed = self.appearance.current_pair()?;
        let window = if observed == self.settings.night_pair() {
            Window::Day
        } else {
            Window::Night
        };
        let pair = self.settings.pair_for(window);

        self.machine.transition(ToggleEvent::ManualToggle)?;
        self.settings.pause_theme_toggle = true;
        tracing::info!(%window, from = %observed, to = %pair, "manual toggle");
        self.apply(&pair)?;
        Ok(window)
    }

    pub fn status(&self, now: NaiveTime) -> ControllerResult<Status> {
        let window = self.resolve_window(now)?;
        Ok(Status {
            enabled: self.settings.plugin_enabled,
            state: self.machine.state(),
            window,
            target: self.settings.pair_for(window),
            observed: self.appearance.current_pair()?,
            day: self.settings.day_pair(),
            night: self.settings.night_pair(),
        })
    }

    fn apply(&mut self, pair: &AppearancePair) -> ControllerResult<()> {
        self.appearance.apply_pair(pair)?;
        self.settings.record_applied(pair);
        self.persist();
        self.appearance.refresh()?;
        Ok(())
    }

    /// The host has already changed by the time settings are saved, so a
    /// failed save is kept pending for [`Self::flush`] instead of failing
    /// the operation.
    fn persist(&mut self) {
        match self.store.save(&self.settings) {
            Ok(()) => self.unsaved = false,
            Err(err) => {
                tracing::error!(%err, "failed to persist settings; keeping them in memory");
                self.unsaved = true;
            }
        }
    }
}
