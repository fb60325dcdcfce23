//! Interactive chat over a bounded conversation history.

use chatrepl_conversation::{
    Console, ExchangeError, InteractionLoop, ResponseStrategy, StreamedResponse, WholeResponse,
};
use chatrepl_core::{ConversationBuffer, LLMProvider};
use tracing::info;

use super::init_common_components;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Whole,
    Streamed,
}

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub mode: ResponseMode,
    /// Optional model override
    pub model: Option<String>,
    /// Optional system prompt override
    pub system_prompt: Option<String>,
    /// Maximum number of turns kept in context
    pub capacity: Option<usize>,
}

/// Strategy for the `chat` and `stream` commands.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;
        let chat = &common.config.chat;

        let system_prompt = input
            .system_prompt
            .unwrap_or_else(|| chat.system_prompt.clone());
        let system_prompt = Some(system_prompt.as_str()).filter(|p| !p.trim().is_empty());

        let buffer = match input.capacity.or(chat.history_capacity) {
            Some(capacity) => ConversationBuffer::new(system_prompt, capacity)?,
            None => ConversationBuffer::with_default_capacity(system_prompt),
        };
        let model = common.resolve_model(input.model);

        info!("Starting {:?} chat with {model}", input.mode);

        let history = match input.mode {
            ResponseMode::Whole => run(common.provider, WholeResponse, buffer, model).await?,
            ResponseMode::Streamed => {
                run(common.provider, StreamedResponse, buffer, model).await?
            }
        };

        info!("Chat finished with {} turns in history", history.len());
        Ok(())
    }
}

async fn run<P, S>(
    provider: P,
    strategy: S,
    buffer: ConversationBuffer,
    model: String,
) -> Result<ConversationBuffer, ExchangeError>
where
    P: LLMProvider,
    S: ResponseStrategy,
{
    InteractionLoop::new(provider, strategy, buffer, Console::stdio(), model)
        .run()
        .await
}
