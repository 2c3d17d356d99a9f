//! Error types for the search pipeline
use std::fmt;
use thiserror::Error;

/// Coarse failure taxonomy surfaced to callers.
///
/// The transport adapter maps each kind onto its own status codes; callers use it to
/// tell retryable conditions apart from permanent ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Category or sub-category failed validation.
    InvalidArgument,
    /// Admission was denied by the rate limiter.
    ResourceExhausted,
    /// Upstream reported not-found, or the lookup resolved to nothing.
    NotFound,
    /// Transport-level failure talking to the upstream.
    Unavailable,
    /// The caller canceled the request mid-flight.
    Canceled,
    /// The caller's deadline elapsed mid-flight.
    DeadlineExceeded,
    /// Malformed upstream data, unexpected status, or a violated post-condition.
    Internal,
}

impl ErrorKind {
    /// Whether a caller may reasonably retry the same request later.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Unavailable | Self::ResourceExhausted)
    }

    /// Stable snake_case name, used in logs and telemetry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::ResourceExhausted => "resource_exhausted",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::Canceled => "canceled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The query field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    SubCategory,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category => f.write_str("category"),
            Self::SubCategory => f.write_str("sub-category"),
        }
    }
}

/// Upstream step in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Category lookup that yields the resource URL.
    Resolve,
    /// Download of the resolved resource.
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => f.write_str("resolve"),
            Self::Fetch => f.write_str("fetch"),
        }
    }
}

/// Transport error of a single upstream GET.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint could not be turned into a request.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    /// The client-side timeout elapsed.
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    /// Connection, protocol or body-read failure.
    #[error("transport failure for {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The HTTP client itself could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Build a transport failure from any error, keeping it as the source.
    pub fn transport<E>(endpoint: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport { endpoint: endpoint.into(), source: source.into() }
    }

    /// Check if this error is a client-side timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("admission capacity must be > 0")]
    ZeroCapacity,
    #[error("decay interval must be > 0")]
    ZeroDecayInterval,
    #[error("http timeout must be > 0")]
    ZeroHttpTimeout,
    #[error("upstream base url must start with http:// or https:// (got {0:?})")]
    InvalidUpstream(String),
}

/// Failure of one search request. Every variant maps onto exactly one [`ErrorKind`].
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid {field} {value:?}: only latin letters are allowed")]
    InvalidArgument { field: Field, value: String },
    #[error("capacity exceeded ({in_use}/{capacity} slots in use), retry later")]
    ResourceExhausted { in_use: usize, capacity: usize },
    #[error("image is not found on the server ({stage}), check the breed or search again")]
    NotFound { stage: Stage },
    #[error("upstream unavailable during {stage}: {source}")]
    Unavailable {
        stage: Stage,
        #[source]
        source: FetchError,
    },
    #[error("request canceled during {stage}")]
    Canceled { stage: Stage },
    #[error("deadline exceeded during {stage}")]
    DeadlineExceeded { stage: Stage },
    #[error("upstream {stage} responded with status {status}")]
    UnexpectedStatus { stage: Stage, status: u16 },
    #[error("malformed upstream envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),
    #[error("fetch of {url} returned an empty payload")]
    EmptyPayload { url: String },
    #[error("upstream resolved to an unusable resource url {url:?}: {reason}")]
    MalformedResourceUrl { url: String, reason: String },
}

impl SearchError {
    /// Classify this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::Canceled { .. } => ErrorKind::Canceled,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            Self::UnexpectedStatus { .. }
            | Self::MalformedEnvelope(_)
            | Self::EmptyPayload { .. }
            | Self::MalformedResourceUrl { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is an admission denial
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }

    /// Check if this error is a validation failure
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if this error is a not-found outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The offending field of a validation failure.
    pub fn invalid_field(&self) -> Option<Field> {
        match self {
            Self::InvalidArgument { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// The upstream step a failure belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::NotFound { stage }
            | Self::Unavailable { stage, .. }
            | Self::Canceled { stage }
            | Self::DeadlineExceeded { stage }
            | Self::UnexpectedStatus { stage, .. } => Some(*stage),
            Self::MalformedEnvelope(_) => Some(Stage::Resolve),
            Self::EmptyPayload { .. } | Self::MalformedResourceUrl { .. } => Some(Stage::Fetch),
            Self::InvalidArgument { .. } | Self::ResourceExhausted { .. } => None,
        }
    }

    /// The raw upstream status embedded in an unexpected-status failure.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
