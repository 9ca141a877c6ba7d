use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Series;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Conditions that abort an evaluation cycle.
///
/// Per-series fetch failures are not here: they degrade to absent columns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("missing primary series: no usable {} observations", series.key())]
    MissingAnchor { series: Series },

    #[error("no {} observations on or after {display_start}", series.key())]
    EmptyDisplayWindow {
        series: Series,
        display_start: NaiveDate,
    },
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(3, err.to_string())
    }
}
