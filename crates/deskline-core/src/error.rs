//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesklineError {
    #[error("CONFIG/{0}")]
    Config(String),

    #[error("REPORT/{0}")]
    Report(String),
}
