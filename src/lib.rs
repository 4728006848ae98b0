pub mod alert;
pub mod chat;
pub mod completion;
pub mod config;
pub mod constants;
pub mod controller;
pub mod conversation;
pub mod error;

pub use alert::{Alert, AlertSink};
pub use completion::{CompletionService, GroqClient};
pub use config::{ClientConfig, SystemPrompts};
pub use controller::{ChatController, InFlightPolicy};
pub use conversation::{ConversationState, ConversationStore, Message, Role};
pub use error::{CompletionError, SendError};
