//! Request failure taxonomy.
//!
//! Every failed request ends up as exactly one of two user-facing kinds:
//! the transport failed (`Connectivity`) or the server answered in a way
//! that broke the contract (`Unexpected`). Each kind carries one fixed hint.

use thiserror::Error;

/// Hint shown when the request never reached the server.
pub const HINT_CHECK_CONNECTIVITY: &str = "Please check your Internet connection.";

/// Hint shown when the server answered but the answer was unusable.
pub const HINT_TRY_AGAIN: &str = "Please try again.";

/// The user-facing class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connectivity,
    Unexpected,
}

impl ErrorKind {
    pub fn hint(self) -> &'static str {
        match self {
            Self::Connectivity => HINT_CHECK_CONNECTIVITY,
            Self::Unexpected => HINT_TRY_AGAIN,
        }
    }
}

/// A failed request, as produced by a backend or by response validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// The request itself failed (offline, DNS, aborted, CORS).
    #[error("network request failed: {0}")]
    Connectivity(String),

    #[error("unexpected status code: {status} {status_text}")]
    UnexpectedStatus { status: u16, status_text: String },

    #[error("missing Location header in server response")]
    MissingLocation,

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connectivity(_) => ErrorKind::Connectivity,
            Self::UnexpectedStatus { .. } | Self::MissingLocation | Self::MalformedBody(_) => {
                ErrorKind::Unexpected
            }
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedBody(err.to_string())
    }
}

/// A failure as stored in canonical state and shown by the render layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: ErrorKind,
    /// Fixed user-facing hint for `kind`.
    pub hint: String,
    /// Technical detail, for logs only.
    pub detail: String,
}

impl From<&RequestError> for Failure {
    fn from(err: &RequestError) -> Self {
        let kind = err.kind();
        Self {
            kind,
            hint: kind.hint().to_string(),
            detail: err.to_string(),
        }
    }
}

impl From<RequestError> for Failure {
    fn from(err: RequestError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_get_connectivity_hint() {
        let failure = Failure::from(RequestError::Connectivity("offline".into()));
        assert_eq!(failure.kind, ErrorKind::Connectivity);
        assert_eq!(failure.hint, HINT_CHECK_CONNECTIVITY);
        assert!(failure.detail.contains("offline"));
    }

    #[test]
    fn contract_violations_get_try_again_hint() {
        let errors = [
            RequestError::UnexpectedStatus {
                status: 500,
                status_text: "Internal Server Error".into(),
            },
            RequestError::MissingLocation,
            RequestError::MalformedBody("expected value".into()),
        ];
        for err in errors {
            let failure = Failure::from(&err);
            assert_eq!(failure.kind, ErrorKind::Unexpected, "{err}");
            assert_eq!(failure.hint, HINT_TRY_AGAIN);
        }
    }

    #[test]
    fn json_errors_are_malformed_bodies() {
        let err: RequestError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, RequestError::MalformedBody(_)));
    }
}
