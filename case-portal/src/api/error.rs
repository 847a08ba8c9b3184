use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 401 from the server
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403 from the server
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (unreachable, timed out).
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("undecodable response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The server explicitly refused the credential.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Forbidden(_))
    }

    /// Message the server put in its `{error}` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::Status { message, .. } => {
                Some(message.as_str()).filter(|m| !m.is_empty())
            }
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}
