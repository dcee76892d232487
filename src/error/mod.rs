use crate::session::SessionError;
use crate::storage::StorageError;
use crate::surface::SurfaceError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
}
