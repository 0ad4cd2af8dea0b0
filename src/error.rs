use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    TimedOut { after_ms: u64 },
    Cancelled,
    Crashed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::TimedOut { after_ms } => write!(f, "timed out after {after_ms}ms"),
            FailureReason::Cancelled => f.write_str("cancelled"),
            FailureReason::Crashed(detail) => write!(f, "worker crashed: {detail}"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("'{file_name}' is not a supported hyperspectral file type")]
    InvalidFileType { file_name: String },

    #[error("'{file_name}' is {byte_len} bytes, over the {limit} byte upload limit")]
    FileTooLarge {
        file_name: String,
        byte_len: u64,
        limit: u64,
    },

    #[error("analysis of '{file_name}' failed: {reason}")]
    AnalysisFailure {
        file_name: String,
        reason: FailureReason,
    },
}

impl PipelineError {
    pub fn file_name(&self) -> &str {
        match self {
            PipelineError::InvalidFileType { file_name }
            | PipelineError::FileTooLarge { file_name, .. }
            | PipelineError::AnalysisFailure { file_name, .. } => file_name,
        }
    }
}
