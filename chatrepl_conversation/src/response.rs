//! Response strategies: how a reply is fetched and shown.
//!
//! The strategy is picked when the loop is built and dispatched statically,
//! the same way command strategies are in the binary.

use chatrepl_core::{LLMProvider, Turn};
use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

use crate::console::Console;
use crate::error::ExchangeError;

/// Futures returned by `respond` carry no `Send` bound; sessions are driven
/// on the task that owns the console.
#[allow(async_fn_in_trait)]
pub trait ResponseStrategy: Send + Sync {
    /// Fetch a reply for `turns`, display it, and return the full text.
    ///
    /// The returned text is what gets recorded as the assistant turn.
    async fn respond<P, R, W>(
        &self,
        provider: &P,
        turns: &[Turn],
        model: &str,
        console: &mut Console<R, W>,
    ) -> Result<String, ExchangeError>
    where
        P: LLMProvider + ?Sized,
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin;
}

/// One request, one complete reply printed at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeResponse;

impl ResponseStrategy for WholeResponse {
    async fn respond<P, R, W>(
        &self,
        provider: &P,
        turns: &[Turn],
        model: &str,
        console: &mut Console<R, W>,
    ) -> Result<String, ExchangeError>
    where
        P: LLMProvider + ?Sized,
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let response = provider.chat(turns, model).await?;

        console
            .write_line(&response.content)
            .await
            .map_err(ExchangeError::Output)?;
        console.blank_line().await.map_err(ExchangeError::Output)?;

        Ok(response.content)
    }
}

/// Fragments are printed as they arrive and joined into the final reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamedResponse;

impl ResponseStrategy for StreamedResponse {
    async fn respond<P, R, W>(
        &self,
        provider: &P,
        turns: &[Turn],
        model: &str,
        console: &mut Console<R, W>,
    ) -> Result<String, ExchangeError>
    where
        P: LLMProvider + ?Sized,
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut stream = provider.chat_stream(turns, model).await?;
        let mut full_response = String::new();
        let mut fragments = 0_usize;

        while let Some(fragment) = stream.next().await {
            let fragment = match fragment {
                Ok(fragment) => fragment,
                Err(e) => {
                    // Keep the error report off the half-printed reply.
                    if !full_response.is_empty() {
                        console.blank_line().await.map_err(ExchangeError::Output)?;
                    }
                    return Err(e.into());
                }
            };

            if fragment.is_empty() {
                continue;
            }

            console
                .write_partial(&fragment)
                .await
                .map_err(ExchangeError::Output)?;
            full_response.push_str(&fragment);
            fragments += 1;
        }

        console.blank_line().await.map_err(ExchangeError::Output)?;
        console.blank_line().await.map_err(ExchangeError::Output)?;

        debug!(
            "Streamed reply complete: {fragments} fragments, {} chars",
            full_response.len()
        );
        Ok(full_response)
    }
}
