use super::error::{StateError, StateResult};
use super::{ToggleEvent, ToggleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateMachine {
    state: ToggleState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ToggleState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn can_transition(&self, event: ToggleEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: ToggleEvent) -> Option<ToggleState> {
        use ToggleEvent::*;
        match (self.state, event) {
            (ToggleState::Active, ManualToggle) => Some(ToggleState::Paused),
            (ToggleState::Paused, ManualToggle) => Some(ToggleState::Paused),
            (ToggleState::Paused, Confirm) => Some(ToggleState::Active),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: ToggleEvent) -> StateResult<ToggleState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        self.state = next;
        Ok(self.state)
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ToggleState::{:?}", self.state)
    }
}
