use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdleadError>;

#[derive(Error, Debug)]
pub enum AdleadError {
    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid search: {0}")]
    InvalidSearch(String),

    #[error("Ad search failed: {0}")]
    Search(String),

    #[error("Ad search returned no dataset")]
    NoDataset,

    #[error("Phase 1 produced no rows; nothing to enrich")]
    NoRows,

    #[error("No input found at {}; upload a CSV or run phase 1 first", .0.display())]
    NoInput(PathBuf),

    #[error("Storage error at {}: {}", .path.display(), .message)]
    Storage { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
