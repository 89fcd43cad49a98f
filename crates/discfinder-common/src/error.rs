//! Common error types used throughout discfinder.
//!
//! Fetch failures are split by kind so callers can tell a request that never
//! completed ([`Error::Transport`]) from one that completed with a bad answer
//! ([`Error::Status`], [`Error::Decode`], [`Error::Blocked`]). Only transport
//! failures are eligible for the CORS-bypass retry.

/// Common error type for discfinder.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The page is a bot-challenge / captcha page instead of content.
    #[error("Blocked by bot challenge: {0}")]
    Blocked(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new Status error.
    pub fn status<S: Into<String>>(status: u16, url: S) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new Blocked error.
    pub fn blocked<S: Into<String>>(msg: S) -> Self {
        Self::Blocked(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the request failed before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "Request failed: connection refused");

        let err = Error::status(503, "https://api.example.com/x");
        assert_eq!(err.to_string(), "HTTP 503 from https://api.example.com/x");

        let err = Error::decode("expected value");
        assert_eq!(err.to_string(), "Malformed response: expected value");

        let err = Error::blocked("Just a moment...");
        assert_eq!(err.to_string(), "Blocked by bot challenge: Just a moment...");

        let err = Error::invalid_input("empty barcode");
        assert_eq!(err.to_string(), "Invalid input: empty barcode");

        let err = Error::config("bad url");
        assert_eq!(err.to_string(), "Configuration error: bad url");

        let err = Error::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_only_transport_is_transport() {
        assert!(Error::transport("x").is_transport());
        assert!(!Error::status(404, "u").is_transport());
        assert!(!Error::decode("x").is_transport());
        assert!(!Error::blocked("x").is_transport());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Decode(_)));
    }
}
