use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single completion request. None of these are retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// DNS, TLS, connect, reset, or failing to read the body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("completion API returned {status}: {body}")]
    Api {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// 2xx, but `choices[0].message.content` was missing or not a string.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Why a submission did not produce an assistant reply.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("input is empty")]
    EmptyInput,

    #[error("a request is already in flight")]
    Busy,

    #[error(transparent)]
    Completion(#[from] CompletionError),
}
