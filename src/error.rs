use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Invalid date format: {0:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("Repository not found")]
    RepositoryNotFound,

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
