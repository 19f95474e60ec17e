use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedDataError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Directory not found: {0}")]
    MissingDirectory(String),

    #[error("Malformed role definition at line {line} of {file}: {text}")]
    RoleDefinitionError {
        file: String,
        line: usize,
        text: String,
    },

    #[error("Malformed spreadsheet for subsystem {subsystem} at line {line}: {message}")]
    SpreadsheetError {
        subsystem: String,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SeedDataError {
    /// True for problems with the curated content itself, as opposed to problems reading it.
    pub fn is_structural(&self) -> bool {
        matches!(self, SeedDataError::SpreadsheetError { .. })
    }
}
