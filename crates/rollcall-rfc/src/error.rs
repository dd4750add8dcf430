use thiserror::Error;

/// RFC parsing and conversion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Invalid calendar value: {0}")]
    InvalidValue(String),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
