//! Statement error types.

use fundline_shared::AppError;
use thiserror::Error;

use super::anchor::Anchor;

/// Statement-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatementError {
    /// No row with this id exists in the statement.
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// The row's figures are computed and cannot be entered.
    #[error("Row is not editable: {0}")]
    RowNotEditable(String),

    /// Two rows share an id.
    #[error("Duplicate row id: {0}")]
    DuplicateId(String),

    /// A reserved row sits somewhere other than its expected place.
    #[error("Reserved row {0} is not where the statement layout expects it")]
    MisplacedAnchor(Anchor),
}

impl From<StatementError> for AppError {
    fn from(err: StatementError) -> Self {
        match err {
            StatementError::RowNotFound(_) => Self::NotFound(err.to_string()),
            StatementError::RowNotEditable(_)
            | StatementError::DuplicateId(_)
            | StatementError::MisplacedAnchor(_) => Self::Validation(err.to_string()),
        }
    }
}
