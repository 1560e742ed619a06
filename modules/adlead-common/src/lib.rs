pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DedupKey, EmptyOutput, FieldSet, FileConfig, FilterMode};
pub use error::{AdleadError, Result};
pub use types::*;
