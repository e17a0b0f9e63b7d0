use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // A fixed-height block cannot fit on a fresh page. This is a layout
    // defect, never a runtime condition to recover from.
    #[error("block cannot fit on any page: {0}")]
    OverflowMisconfiguration(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to save report to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ReportError::InvalidInput(_))
    }

    pub fn is_save_failure(&self) -> bool {
        matches!(self, ReportError::Save { .. })
    }
}
