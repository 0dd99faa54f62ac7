use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::appearance::AppearancePair;
use crate::schedule::{parse_time_of_day, ScheduleResult, Window};

pub const DEFAULT_DAY_TIME: &str = "10:00";
pub const DEFAULT_NIGHT_TIME: &str = "15:00";

/// Persisted day/night configuration plus the last applied appearance.
///
/// Stored as a flat camelCase record. Missing keys take the defaults below
/// and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub plugin_enabled: bool,

    #[serde(alias = "dayCommunityTheme")]
    pub day_theme: String,
    pub day_color_scheme: String,
    pub day_time: String,

    #[serde(alias = "nightCommunityTheme")]
    pub night_theme: String,
    pub night_color_scheme: String,
    pub night_time: String,

    pub current_theme: String,
    pub current_color_scheme: String,

    pub pause_theme_toggle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plugin_enabled: false,
            day_theme: String::new(),
            day_color_scheme: String::new(),
            day_time: DEFAULT_DAY_TIME.to_string(),
            night_theme: String::new(),
            night_color_scheme: String::new(),
            night_time: DEFAULT_NIGHT_TIME.to_string(),
            current_theme: String::new(),
            current_color_scheme: String::new(),
            pause_theme_toggle: false,
        }
    }
}

impl Settings {
    pub fn day_pair(&self) -> AppearancePair {
        AppearancePair::new(&self.day_theme, &self.day_color_scheme)
    }

    pub fn night_pair(&self) -> AppearancePair {
        AppearancePair::new(&self.night_theme, &self.night_color_scheme)
    }

    pub fn pair_for(&self, window: Window) -> AppearancePair {
        match window {
            Window::Day => self.day_pair(),
            Window::Night => self.night_pair(),
        }
    }

    /// Last applied pair as cached in the settings record.
    pub fn cached_pair(&self) -> AppearancePair {
        AppearancePair::new(&self.current_theme, &self.current_color_scheme)
    }

    pub fn day_start(&self) -> ScheduleResult<NaiveTime> {
        parse_time_of_day(&self.day_time)
    }

    pub fn night_start(&self) -> ScheduleResult<NaiveTime> {
        parse_time_of_day(&self.night_time)
    }

    pub(crate) fn record_applied(&mut self, pair: &AppearancePair) {
        self.current_theme.clone_from(&pair.theme);
        self.current_color_scheme.clone_from(&pair.color_scheme);
    }
}
