#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, ResponseMode,
    TranslateInput, TranslateStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "chatrepl")]
#[command(about = "Terminal chat with OpenAI-compatible models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SessionArgs {
    /// Model to use
    #[arg(short = 'M', long)]
    model: Option<String>,

    /// System prompt that opens the conversation
    #[arg(long)]
    system_prompt: Option<String>,

    /// Maximum number of turns kept in context, system prompt included
    #[arg(long)]
    capacity: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with complete replies
    Chat(SessionArgs),
    /// Chat with replies streamed as they are generated
    Stream(SessionArgs),
    /// Translate lines through a prompt template
    Translate {
        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info,
    /// Show version
    Version,
}

impl SessionArgs {
    fn into_input(self, mode: ResponseMode) -> ChatInput {
        ChatInput {
            mode,
            model: self.model,
            system_prompt: self.system_prompt,
            capacity: self.capacity,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat(args) => {
            ChatStrategy
                .execute(args.into_input(ResponseMode::Whole))
                .await
        }
        Commands::Stream(args) => {
            ChatStrategy
                .execute(args.into_input(ResponseMode::Streamed))
                .await
        }
        Commands::Translate { model } => {
            TranslateStrategy
                .execute(TranslateInput { model })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
