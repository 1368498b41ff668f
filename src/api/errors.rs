use thiserror::Error;

/// Errors surfaced by the Crosspost backend and the publish webhook.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Server Error: {0}")]
    ServerError(String),

    #[error("Unexpected Error: {0}")]
    Unexpected(String),

    #[error("Decoding Error: {0}")]
    DecodeError(String),

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Consider spacing out your requests to avoid hitting the rate limit")]
    RateLimited,
}
