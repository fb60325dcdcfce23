//! Line-oriented console handle.
//!
//! The console owns its reader and writer. Whoever drives the conversation
//! holds it for the session and calls [`Console::close`] on the way out.

use std::fmt::Display;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::error::ExchangeError;

pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    /// Console over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Show `prompt` and read one line without its line terminator.
    ///
    /// Returns `None` once the input is exhausted. A failed prompt write is
    /// an output error, not an input one.
    pub async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ExchangeError> {
        self.write_partial(prompt)
            .await
            .map_err(ExchangeError::Output)?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(ExchangeError::Input)?;
        if read == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    pub async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Write without a trailing newline and flush immediately.
    pub async fn write_partial(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await
    }

    pub async fn blank_line(&mut self) -> io::Result<()> {
        self.write_line("").await
    }

    /// Error line followed by a retry invitation.
    pub async fn report_error(&mut self, error: &impl Display) -> io::Result<()> {
        self.write_line(&format!("❌ Error: {error}")).await?;
        self.write_line("Please try again.").await?;
        self.blank_line().await
    }

    /// Flush and shut down the writer, releasing both handles.
    pub async fn close(mut self) -> io::Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await
    }
}
