use thiserror::Error;

/// Main error type of the crate.
/// Aggregates errors from dependencies and internal modules.
#[derive(Error, Debug)]
pub enum SheetBinderError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Binding module errors
    #[error("{0}")]
    BindingError(#[from] crate::binding::BindingError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetBinderError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetBinderError::WithContextError(format!("{}: {}", message, e)))
    }
}
