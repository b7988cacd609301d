// crates/retailer-core/src/error.rs

use retailer_repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Record store failure: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("No data found for given filters")]
    NotFound,

    #[error("Spreadsheet serialization failed: {0}")]
    Serialization(String),
}

impl From<rust_xlsxwriter::XlsxError> for ServiceError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
