//! Errors raised while talking to miRDB.

use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirdbError>;

#[derive(Debug, Error)]
pub enum MirdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected miRDB page: {0}")]
    Parse(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("No result file name after {attempts} attempts")]
    PollExhausted { attempts: u32 },

    #[error("Table error: {0}")]
    Polars(#[from] PolarsError),
}
