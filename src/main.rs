use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use tokio::sync::mpsc;
use tracing::info;

use german_tutor::{chat, constants};
use german_tutor::{
    ChatController, ClientConfig, CompletionService, ConversationStore, GroqClient, InFlightPolicy,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Chat with the tutor. Reads one message per line until /quit or end of input.
    Chat {
        #[command(flatten)]
        client: ClientArgs,
        #[arg(
            long,
            env = "TUTOR_SINGLE_SLOT",
            help = "Reject a new message while a reply is still pending."
        )]
        single_slot: bool,
    },
    /// Send a single prompt and print the reply.
    Ask {
        #[arg(help = "The message to send.")]
        prompt: String,
        #[command(flatten)]
        client: ClientArgs,
    },
}

// Each flag falls back to its environment variable, then to the built-in default
#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(long, env = "GROQ_ENDPOINT", help = "Completion endpoint URL [default: Groq chat completions]")]
    endpoint: Option<String>,
    #[arg(long, env = "GROQ_MODEL", help = "Model identifier [default: llama3-8b-8192]")]
    model: Option<String>,
    #[arg(long, env = "API_KEY", hide_env_values = true, help = "Bearer token sent with every request")]
    api_key: Option<String>,
}

impl ClientArgs {
    fn into_config(self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }
        config
    }
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for API_KEY and friends)
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the transcript on stdout.
    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,german_tutor=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            client,
            single_slot,
        } => {
            let config = client.into_config();
            info!(model = %config.model, endpoint = %config.endpoint, "Starting tutor chat");

            let prompts = config.prompts.clone();
            let (alert_tx, alert_rx) = mpsc::unbounded_channel();
            let policy = if single_slot {
                InFlightPolicy::SingleSlot
            } else {
                InFlightPolicy::Unguarded
            };
            let controller = ChatController::new(
                Arc::new(ConversationStore::new()),
                Arc::new(GroqClient::new(config)),
                prompts,
                Arc::new(alert_tx),
            )
            .with_policy(policy);

            chat::run_chat(Arc::new(controller), alert_rx)
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask { prompt, client } => {
            anyhow::ensure!(!prompt.trim().is_empty(), constants::EMPTY_INPUT_ALERT);
            let config = client.into_config();
            let system_prompt = config.prompts.conversation.clone();
            let groq = GroqClient::new(config);
            let reply = groq
                .complete(prompt.trim(), &system_prompt)
                .await
                .context("Completion request failed")?;
            println!("{}", reply);
        }
    }

    Ok(())
}
