//! Error kind to gRPC status mapping.

use breedlens::{ErrorKind, SearchError};
use tonic::{Code, Status};

/// One code per kind; the mapping is total.
pub fn code_for(kind: ErrorKind) -> Code {
    match kind {
        ErrorKind::InvalidArgument => Code::InvalidArgument,
        ErrorKind::ResourceExhausted => Code::ResourceExhausted,
        ErrorKind::NotFound => Code::NotFound,
        ErrorKind::Unavailable => Code::Unavailable,
        ErrorKind::Canceled => Code::Cancelled,
        ErrorKind::DeadlineExceeded => Code::DeadlineExceeded,
        ErrorKind::Internal => Code::Internal,
    }
}

/// Status returned to the caller for a failed search.
pub fn to_status(err: &SearchError) -> Status {
    Status::new(code_for(err.kind()), err.to_string())
}
