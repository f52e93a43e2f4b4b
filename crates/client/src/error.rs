use ranch_forms::message;

/// Failure of a call to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request exceeded the configured upper wait.
    #[error("request timed out")]
    Timeout,
    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// 401, or an explicit "Unauthenticated" body.
    #[error("authentication expired")]
    AuthExpired,
    /// A non-2xx response, with the message derived from its body.
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),
    /// The body decoded but is not the expected shape.
    #[error("{0}")]
    Shape(String),
    /// A media attachment could not be read.
    #[error("could not read attachment '{path}': {message}")]
    Attachment { path: String, message: String },
}

impl ApiError {
    /// The text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout => message::TIMED_OUT.to_string(),
            ApiError::Network(_) => message::NETWORK_UNREACHABLE.to_string(),
            ApiError::AuthExpired => message::SESSION_EXPIRED.to_string(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Decode(_) => message::UNDECODABLE_RESPONSE.to_string(),
            ApiError::Shape(message) => message.clone(),
            ApiError::Attachment { .. } => self.to_string(),
        }
    }
}
