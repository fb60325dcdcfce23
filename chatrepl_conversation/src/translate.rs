//! Prompt-template translation session.
//!
//! Asks for a target language once, then translates each line through a
//! fixed two-message template. No history is kept between requests.

use std::collections::HashMap;

use chatrepl_core::{LLMProvider, PromptTemplate, Role, TemplateError};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, warn};

use crate::console::Console;
use crate::error::ExchangeError;
use crate::interaction::{LoopState, is_exit_command};
use crate::response::{ResponseStrategy, WholeResponse};

const GOODBYE: &str = "\n🤖 Goodbye! 👋";

/// Template with `system_template` as the system message and `{text}` as the
/// user message.
pub fn translation_template(system_template: &str) -> Result<PromptTemplate, TemplateError> {
    PromptTemplate::from_messages(&[(Role::System, system_template), (Role::Human, "{text}")])
}

pub struct TranslationSession<P, R, W> {
    provider: P,
    template: PromptTemplate,
    console: Console<R, W>,
    model: String,
    translations: usize,
}

impl<P, R, W> TranslationSession<P, R, W>
where
    P: LLMProvider,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        provider: P,
        template: PromptTemplate,
        console: Console<R, W>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            template,
            console,
            model: model.into(),
            translations: 0,
        }
    }

    /// Run the session and return how many translations completed.
    ///
    /// # Errors
    /// Returns the error that made the console unusable, as
    /// [`InteractionLoop::run`](crate::InteractionLoop::run) does.
    pub async fn run(mut self) -> Result<usize, ExchangeError> {
        if let Err(e) = self.greet().await {
            warn!("Failed to write banner: {e}");
        }

        match self.ask_language().await {
            Ok(Some(language)) => {
                info!("Translating to {language}");
                self.translate_until_exit(&language).await?;
            }
            Ok(None) => {}
            Err(e) => self.recover(e).await?,
        }

        let Self {
            console,
            translations,
            ..
        } = self;
        if let Err(e) = console.close().await {
            warn!("Failed to close console: {e}");
        }
        Ok(translations)
    }

    async fn greet(&mut self) -> std::io::Result<()> {
        self.console
            .write_line("🤖 Prompt Template Translation Example")
            .await?;
        self.console
            .write_line("💡 Type \"exit\", \"quit\", or \"bye\" to end the conversation.")
            .await?;
        self.console.blank_line().await
    }

    async fn ask_language(&mut self) -> Result<Option<String>, ExchangeError> {
        let Some(input) = self.console.read_line("Target language: ").await? else {
            return Ok(None);
        };

        if is_exit_command(&input) {
            self.say(GOODBYE).await?;
            return Ok(None);
        }

        let language = input.trim();
        if language.is_empty() {
            self.say("❌ Language is required!").await?;
            return Ok(None);
        }

        self.say(&format!("\n✅ Translating to: {language}\n")).await?;
        Ok(Some(language.to_string()))
    }

    async fn translate_until_exit(&mut self, language: &str) -> Result<(), ExchangeError> {
        loop {
            match self.translate_next(language).await {
                Ok(LoopState::Terminated) => return Ok(()),
                Ok(_) => {}
                Err(e) => self.recover(e).await?,
            }
        }
    }

    async fn translate_next(&mut self, language: &str) -> Result<LoopState, ExchangeError> {
        let Some(text) = self.console.read_line("Text to translate: ").await? else {
            return Ok(LoopState::Terminated);
        };

        if is_exit_command(&text) {
            self.say(GOODBYE).await?;
            return Ok(LoopState::Terminated);
        }

        if text.trim().is_empty() {
            return Ok(LoopState::AwaitingInput);
        }

        let values = HashMap::from([("language", language), ("text", text.as_str())]);
        let turns = self.template.format_messages(&values)?;

        self.say("\n📝 Generated Prompt:").await?;
        for turn in &turns {
            self.say(&format!("  {}: {}", turn.role.label(), turn.content))
                .await?;
        }

        self.console
            .write_partial("\n🤖 Translation: ")
            .await
            .map_err(ExchangeError::Output)?;
        WholeResponse
            .respond(&self.provider, &turns, &self.model, &mut self.console)
            .await?;

        self.translations += 1;
        Ok(LoopState::AwaitingInput)
    }

    async fn say(&mut self, text: &str) -> Result<(), ExchangeError> {
        self.console
            .write_line(text)
            .await
            .map_err(ExchangeError::Output)
    }

    /// Report a failed translation, or hand it back if the console is gone.
    async fn recover(&mut self, error: ExchangeError) -> Result<(), ExchangeError> {
        if error.is_fatal() {
            warn!("Console unusable, ending translation session: {error}");
            return Err(error);
        }

        warn!("Translation failed: {error}");
        self.console
            .report_error(&error)
            .await
            .map_err(ExchangeError::Output)
    }
}
