use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Search,
    TextGeneration,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::TextGeneration => "text generation",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{service} service unavailable: {reason}")]
    Unavailable { service: ServiceKind, reason: String },
    #[error("{service} transport failure: {message}")]
    Transport { service: ServiceKind, message: String },
    #[error("{service} service returned HTTP {status}")]
    Status { service: ServiceKind, status: u16 },
    #[error("{service} response could not be decoded: {message}")]
    Decode { service: ServiceKind, message: String },
}

impl ServiceError {
    pub fn service(&self) -> ServiceKind {
        match self {
            Self::Unavailable { service, .. }
            | Self::Transport { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. } => *service,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Failure of a single agent step. The `Display` output is the exact text
/// placed in the `error` field of the agent's result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("Invalid state type: {0}")]
    InvalidStateType(String),
    #[error("{0}")]
    MissingInput(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("API error: {0}")]
    Service(#[from] ServiceError),
    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl AgentError {
    /// Input problems are detected before any external call is made.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidStateType(_) | Self::MissingInput(_) | Self::InvalidInput(_))
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::InvalidStateType(_) => "invalid_state_type",
            Self::MissingInput(_) => "missing_input",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Service(_) => "service",
            Self::Calculation(_) => "calculation",
        }
    }
}
