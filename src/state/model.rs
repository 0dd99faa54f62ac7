use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    /// Ticks apply the scheduled appearance.
    #[default]
    Active,
    /// Ticks are suppressed until the manual appearance is confirmed.
    Paused,
}

impl ToggleState {
    pub fn from_pause_flag(paused: bool) -> Self {
        if paused {
            Self::Paused
        } else {
            Self::Active
        }
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Paused => f.write_str("paused"),
        }
    }
}
