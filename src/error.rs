use thiserror::Error;

/// Credential set that cannot authenticate a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("host is empty")]
    EmptyHost,
    #[error("`{field}` is required for {variant} authentication")]
    MissingField {
        field: &'static str,
        variant: &'static str,
    },
}

/// Failure of a single SNMP exchange. Always absorbed per item during a poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("no response for {oid} after {attempts} attempt(s)")]
    Timeout { oid: String, attempts: u32 },
    #[error("transport error for {oid}: {reason}")]
    Transport { oid: String, reason: String },
    #[error("agent returned error status {status} for {oid}")]
    Status { oid: String, status: u32 },
}

/// Whole-poll failure. Nothing is published for the cycle.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("invalid authentication config: {0}")]
    AuthConfigInvalid(#[from] SessionError),
    #[error("SNMP client support unavailable: {0}")]
    LibraryUnavailable(String),
    #[error("host {host} is unreachable: {reason}")]
    HostUnreachable { host: String, reason: String },
}

/// Setup-time validation outcome. Each variant drives a different remediation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cannot connect: {0}")]
    CannotConnect(String),
    #[error("invalid authentication: {0}")]
    InvalidAuth(String),
    #[error("SNMP library unavailable: {0}")]
    LibraryUnavailable(String),
}

impl From<PollError> for ValidationError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::AuthConfigInvalid(e) => ValidationError::InvalidAuth(e.to_string()),
            PollError::LibraryUnavailable(msg) => ValidationError::LibraryUnavailable(msg),
            e @ PollError::HostUnreachable { .. } => ValidationError::CannotConnect(e.to_string()),
        }
    }
}

impl From<RequestError> for ValidationError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Status { .. } => ValidationError::InvalidAuth(err.to_string()),
            RequestError::Timeout { .. } | RequestError::Transport { .. } => {
                ValidationError::CannotConnect(err.to_string())
            }
        }
    }
}
