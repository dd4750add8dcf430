use thiserror::Error;

use crate::store::StorageError;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
