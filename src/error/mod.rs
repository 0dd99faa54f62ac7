use crate::appearance::AppearanceError;
use crate::controller::ControllerError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Appearance(#[from] AppearanceError),
}
