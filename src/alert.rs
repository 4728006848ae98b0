use std::fmt;

use tokio::sync::mpsc;

use crate::constants;
use crate::error::CompletionError;

/// User-facing notices. They carry no error detail; that goes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    EmptyInput,
    Busy,
    ApiError,
    ConnectionFailed,
    UnexpectedResponse,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::EmptyInput => constants::EMPTY_INPUT_ALERT,
            Alert::Busy => constants::BUSY_ALERT,
            Alert::ApiError => constants::API_ERROR_ALERT,
            Alert::ConnectionFailed => constants::TRANSPORT_ERROR_ALERT,
            Alert::UnexpectedResponse => constants::MALFORMED_RESPONSE_ALERT,
        }
    }
}

impl From<&CompletionError> for Alert {
    fn from(err: &CompletionError) -> Self {
        match err {
            CompletionError::Transport(_) => Alert::ConnectionFailed,
            CompletionError::Api { .. } => Alert::ApiError,
            CompletionError::MalformedResponse(_) => Alert::UnexpectedResponse,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Where alerts are shown.
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Forwards alerts to whoever owns the receiver. A closed receiver drops them.
impl AlertSink for mpsc::UnboundedSender<Alert> {
    fn alert(&self, alert: Alert) {
        if self.send(alert).is_err() {
            tracing::debug!(%alert, "Alert receiver closed, dropping alert");
        }
    }
}
