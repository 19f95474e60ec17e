use seedcheck_core::SeedDataError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleParseError {
    #[error("Error in {file} line {line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Error in {file} line {line}: \"{name}\" has no expression")]
    MissingExpression {
        file: String,
        line: usize,
        name: String,
    },
}

#[derive(Error, Debug)]
pub enum SubsystemLoadError {
    #[error(transparent)]
    Data(#[from] SeedDataError),

    #[error(transparent)]
    Rules(#[from] RuleParseError),
}

impl SubsystemLoadError {
    ///
    /// True when the subsystem's curated content is malformed.
    ///
    /// Structural failures are recorded and the subsystem is skipped; anything else
    /// (an unreadable file) stops the run.
    ///
    pub fn is_structural(&self) -> bool {
        match self {
            SubsystemLoadError::Rules(_) => true,
            SubsystemLoadError::Data(e) => e.is_structural(),
        }
    }
}
