//! `grpc-timeout` header parsing.

use std::time::Duration;
use tonic::metadata::MetadataMap;

/// Request header carrying the caller's remaining time budget.
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// At most eight digits are allowed in the value.
const MAX_DIGITS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeoutHeaderError {
    #[error("grpc-timeout header is not valid ascii")]
    NotAscii,
    #[error("grpc-timeout value {0:?} must be 1-8 digits followed by a unit")]
    Malformed(String),
    #[error("grpc-timeout unit {0:?} is not one of H, M, S, m, u, n")]
    UnknownUnit(char),
}

/// Parse a header value such as `1S`, `250m` or `3000000u`.
pub fn parse_grpc_timeout(value: &str) -> Result<Duration, TimeoutHeaderError> {
    let Some(unit) = value.chars().last() else {
        return Err(TimeoutHeaderError::Malformed(value.to_owned()));
    };
    let digits = &value[..value.len() - unit.len_utf8()];
    if unit.is_ascii_digit()
        || digits.is_empty()
        || digits.len() > MAX_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(TimeoutHeaderError::Malformed(value.to_owned()));
    }
    let amount: u64 =
        digits.parse().map_err(|_| TimeoutHeaderError::Malformed(value.to_owned()))?;

    let timeout = match unit {
        'H' => Duration::from_secs(amount * 60 * 60),
        'M' => Duration::from_secs(amount * 60),
        'S' => Duration::from_secs(amount),
        'm' => Duration::from_millis(amount),
        'u' => Duration::from_micros(amount),
        'n' => Duration::from_nanos(amount),
        other => return Err(TimeoutHeaderError::UnknownUnit(other)),
    };
    Ok(timeout)
}

/// Time budget announced by the caller, if any.
///
/// A malformed header is logged and treated as absent.
pub fn timeout_from_metadata(metadata: &MetadataMap) -> Option<Duration> {
    let raw = metadata.get(GRPC_TIMEOUT_HEADER)?;
    let parsed = raw
        .to_str()
        .map_err(|_| TimeoutHeaderError::NotAscii)
        .and_then(parse_grpc_timeout);

    match parsed {
        Ok(timeout) => Some(timeout),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring grpc-timeout header");
            None
        }
    }
}
