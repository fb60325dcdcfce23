//! Scripted provider shared by the session tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use async_trait::async_trait;
use chatrepl_core::{LLMProvider, LLMResponse, TextStream, Turn};
use tokio::io::AsyncWrite;

pub enum Reply {
    /// Succeeds; whole replies join the fragments.
    Fragments(Vec<&'static str>),
    /// Fails before any text is produced.
    Fail(&'static str),
    /// Streams the fragments, then fails.
    BreakAfter(Vec<&'static str>, &'static str),
}

#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every turn list the provider was called with, in call order.
    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, turns: &[Turn]) -> Reply {
        self.requests.lock().unwrap().push(turns.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Fail("no scripted reply left"))
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(&self, turns: &[Turn], _model: &str) -> anyhow::Result<LLMResponse> {
        match self.next_reply(turns) {
            Reply::Fragments(fragments) => Ok(LLMResponse {
                content: fragments.concat(),
                usage: None,
            }),
            Reply::Fail(message) | Reply::BreakAfter(_, message) => Err(anyhow::anyhow!(message)),
        }
    }

    async fn chat_stream(&self, turns: &[Turn], _model: &str) -> anyhow::Result<TextStream> {
        let items: Vec<anyhow::Result<String>> = match self.next_reply(turns) {
            Reply::Fragments(fragments) => fragments
                .into_iter()
                .map(|f| Ok(f.to_string()))
                .collect(),
            Reply::Fail(message) => return Err(anyhow::anyhow!(message)),
            Reply::BreakAfter(fragments, message) => fragments
                .into_iter()
                .map(|f| Ok(f.to_string()))
                .chain(std::iter::once(Err(anyhow::anyhow!(message))))
                .collect(),
        };
        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    fn get_default_model(&self) -> &'static str {
        "scripted"
    }
}

/// Output captured from an in-memory console.
pub fn text(output: &[u8]) -> String {
    String::from_utf8(output.to_vec()).unwrap()
}

/// Writer whose every write fails, like stdout after the reader went away.
pub struct ClosedPipe;

impl AsyncWrite for ClosedPipe {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
