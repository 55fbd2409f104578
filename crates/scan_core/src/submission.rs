use std::fmt;

use serde_json::Value;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Lifecycle of the most recent scan request.
///
/// Only `Succeeded` carries a result and only `Failed` carries error info, so
/// the two can never be populated at the same time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending { request_id: RequestId },
    Succeeded { result: Value },
    Failed { error: ErrorInfo },
}

impl SubmissionState {
    pub fn phase(&self) -> Phase {
        match self {
            SubmissionState::Idle => Phase::Idle,
            SubmissionState::Pending { .. } => Phase::Pending,
            SubmissionState::Succeeded { .. } => Phase::Succeeded,
            SubmissionState::Failed { .. } => Phase::Failed,
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            SubmissionState::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_info(&self) -> Option<&ErrorInfo> {
        match self {
            SubmissionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        match self {
            SubmissionState::Pending { request_id } => Some(*request_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The request never produced a response.
    Network,
    /// The service answered with a non-success status.
    Server,
    /// A response arrived but its body could not be decoded.
    Decode,
    /// The request was rejected locally before being sent.
    InvalidConfig,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCategory::Network => write!(f, "network"),
            FailureCategory::Server => write!(f, "server"),
            FailureCategory::Decode => write!(f, "decode"),
            FailureCategory::InvalidConfig => write!(f, "invalid config"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub category: FailureCategory,
    pub message: String,
    pub status: Option<u16>,
}

impl ErrorInfo {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} error (status {status}): {}", self.category, self.message),
            None => write!(f, "{} error: {}", self.category, self.message),
        }
    }
}

/// What the engine reports back for one request.
pub type ScanOutcome = Result<Value, ErrorInfo>;
