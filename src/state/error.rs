use super::event::ToggleEvent;
use super::model::ToggleState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid state transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: ToggleState,
        event: ToggleEvent,
    },
}
