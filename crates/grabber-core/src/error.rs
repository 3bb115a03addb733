//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] grabber_storage::StorageError),

    #[error("JD2 error: {0}")]
    Jd2(#[from] grabber_jd2::Jd2Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
