use rafex_core::{ConfigError, SurfaceError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrialError {
    #[error("render surface: {0}")]
    Surface(#[from] SurfaceError),
    #[error("trial {index}: {source}")]
    InvalidConfig {
        index: usize,
        #[source]
        source: ConfigError,
    },
    #[error("session has no trials")]
    EmptySession,
}
