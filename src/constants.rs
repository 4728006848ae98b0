// Defaults for the completion client, loaded from environment where it makes sense.

use std::env;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Sent as the user turn of the bootstrap request.
pub const INTRODUCTION_PROMPT: &str = "You are a teacher of German Language.  To start with you will send a response in English introducing yourself and asking users which topic they would like to talk about, suggesting a list of 4 topics.  You will then respond to user prompts in German, and in the same message you will correct their mistakes and offer constructive feedback in English.  You will use the informal 'du' unless instructed otherwise";

/// System message attached to every request, bootstrap included.
pub const CONVERSATION_SYSTEM_PROMPT: &str = "You are a teacher of German Language. You will respond to user prompts in German if they use the German language, and importantly, in your response message you will correct their mistakes and offer constructive feedback using the English language.  When using German, you will use the informal 'du' unless instructed otherwise";

pub const EMPTY_INPUT_ALERT: &str = "Please enter a message.";
pub const BUSY_ALERT: &str = "Still waiting for the previous reply.";
pub const API_ERROR_ALERT: &str = "An error occurred while calling the API.";
pub const TRANSPORT_ERROR_ALERT: &str = "Failed to connect to the server.";
pub const MALFORMED_RESPONSE_ALERT: &str = "The server returned an unexpected response.";

// Use lazy_static to initialize static variables safely.
lazy_static::lazy_static! {
    pub static ref GROQ_ENDPOINT: String = env::var("GROQ_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    pub static ref GROQ_MODEL: String = env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    // Missing key is not an error here; the server rejects the request instead.
    pub static ref API_KEY: String = env::var("API_KEY").unwrap_or_default();
}
