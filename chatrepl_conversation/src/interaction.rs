//! Read-eval-print loop over a bounded conversation.

use chatrepl_core::{ConversationBuffer, LLMProvider};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::console::Console;
use crate::error::ExchangeError;
use crate::response::ResponseStrategy;

/// Inputs that end the session (after trimming, case-insensitive).
pub const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "bye"];

const USER_PROMPT: &str = "You: ";
const AI_PREFIX: &str = "🤖 AI: ";
const FAREWELL: &str = "\n🤖 AI: Goodbye! Have a great day! 👋";

#[must_use]
pub fn is_exit_command(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&normalized.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Processing,
    Terminated,
}

pub struct InteractionLoop<P, S, R, W> {
    provider: P,
    strategy: S,
    buffer: ConversationBuffer,
    console: Console<R, W>,
    model: String,
    session_id: Uuid,
    state: LoopState,
    exchanges: usize,
}

impl<P, S, R, W> InteractionLoop<P, S, R, W>
where
    P: LLMProvider,
    S: ResponseStrategy,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        provider: P,
        strategy: S,
        buffer: ConversationBuffer,
        console: Console<R, W>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            strategy,
            buffer,
            console,
            model: model.into(),
            session_id: Uuid::now_v7(),
            state: LoopState::AwaitingInput,
            exchanges: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub const fn buffer(&self) -> &ConversationBuffer {
        &self.buffer
    }

    /// Run until an exit command or end of input, then release the console.
    ///
    /// Failed exchanges are reported and the loop continues. The final
    /// history is handed back to the caller.
    ///
    /// # Errors
    /// Returns the error that made the console unusable: a failed write, a
    /// failed read other than invalid UTF-8, or a failed error report.
    pub async fn run(mut self) -> Result<ConversationBuffer, ExchangeError> {
        info!(
            "Starting conversation session: {} (model: {}, capacity: {})",
            self.session_id,
            self.model,
            self.buffer.capacity()
        );

        if let Err(e) = self.greet().await {
            warn!("Failed to write banner: {e}");
        }

        while self.state != LoopState::Terminated {
            if let Err(e) = self.step().await {
                if e.is_fatal() {
                    warn!("Console unusable, ending session {}: {e}", self.session_id);
                    return Err(e);
                }

                warn!("Exchange failed: {e}");
                if let Err(io_err) = self.console.report_error(&e).await {
                    warn!("Failed to report error: {io_err}");
                    return Err(ExchangeError::Output(io_err));
                }
            }
        }

        info!(
            "Conversation ended: {} exchanges, {} turns in history",
            self.exchanges,
            self.buffer.len()
        );

        let Self {
            console, buffer, ..
        } = self;
        if let Err(e) = console.close().await {
            warn!("Failed to close console: {e}");
        }
        Ok(buffer)
    }

    /// One pass of the loop: read a line and, unless it is empty or an exit
    /// command, run a full exchange.
    pub async fn step(&mut self) -> Result<LoopState, ExchangeError> {
        let Some(input) = self.console.read_line(USER_PROMPT).await? else {
            debug!("Input closed");
            return self.terminate().await;
        };

        if is_exit_command(&input) {
            return self.terminate().await;
        }

        if input.trim().is_empty() {
            return Ok(self.state);
        }

        self.state = LoopState::Processing;
        let outcome = self.exchange(input).await;
        self.state = LoopState::AwaitingInput;
        outcome.map(|()| self.state)
    }

    async fn exchange(&mut self, input: String) -> Result<(), ExchangeError> {
        self.buffer.append_human(input);

        self.console
            .write_partial(AI_PREFIX)
            .await
            .map_err(ExchangeError::Output)?;

        let reply = self
            .strategy
            .respond(
                &self.provider,
                self.buffer.snapshot(),
                &self.model,
                &mut self.console,
            )
            .await?;

        self.buffer.append_assistant(reply);
        let evicted = self.buffer.trim();
        self.exchanges += 1;

        debug!(
            "Exchange {} completed, evicted {evicted}, {} turns kept",
            self.exchanges,
            self.buffer.len()
        );
        Ok(())
    }

    async fn greet(&mut self) -> std::io::Result<()> {
        self.console
            .write_line("🤖 Welcome to the Interactive AI Chatbot!")
            .await?;
        self.console
            .write_line("💡 Type \"exit\", \"quit\", or \"bye\" to end the conversation.")
            .await?;
        self.console.blank_line().await
    }

    async fn terminate(&mut self) -> Result<LoopState, ExchangeError> {
        self.state = LoopState::Terminated;
        self.console
            .write_line(FAREWELL)
            .await
            .map_err(ExchangeError::Output)?;
        Ok(self.state)
    }
}
