use thiserror::Error;

/// Result type alias for Investigate operations
pub type Result<T> = std::result::Result<T, InvestigateError>;

/// Errors that can occur when using the Investigate API
#[derive(Error, Debug)]
pub enum InvestigateError {
    /// Every delivery attempt failed
    #[error("request failed after {attempts} attempts: {last}")]
    TransportExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Failure of the final attempt
        #[source]
        last: AttemptError,
    },

    /// Response was valid JSON but not the expected structure
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Response body was not valid JSON
    #[error("could not decode response body: {source}")]
    Decode {
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
        /// Raw body as received, kept for diagnostics
        body: Vec<u8>,
    },

    /// DNS record type outside the supported set
    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(String),

    /// Authentication failed - invalid key or certificate
    #[error("authentication failed: credential rejected")]
    Unauthorized,

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// API returned a non-retryable error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// Request URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Client certificate could not be read or parsed
    #[error("credential error: {0}")]
    Credential(String),

    /// Request body could not be serialized
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl InvestigateError {
    /// Returns true if retrying the whole operation later may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransportExhausted { .. })
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns the HTTP status code behind this error, if any
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            Self::TransportExhausted {
                last: AttemptError::Status { code, .. },
                ..
            } => Some(*code),
            _ => None,
        }
    }

    /// Raw response body for decode failures
    #[must_use]
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            Self::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Failure of a single delivery attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Request timed out
    #[error("request timed out")]
    Timeout,

    /// Any other HTTP-level failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a retryable status
    #[error("server returned status {code}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Success status without a body
    #[error("response carried no body")]
    EmptyBody,
}
