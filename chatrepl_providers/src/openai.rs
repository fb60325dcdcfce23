use std::collections::VecDeque;

use async_trait::async_trait;
use chatrepl_core::{LLMProvider, LLMResponse, TextStream, Turn, Usage};
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, header};
use serde_json::json;
use tracing::{debug, info};

use crate::sse::SseDecoder;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAICompatProvider {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f32,
    user_agent: Option<String>,
}

impl OpenAICompatProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAICompatProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent.filter(|ua| !ua.is_empty());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request(&self, body: &serde_json::Value) -> RequestBuilder {
        let request = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(body);

        match &self.user_agent {
            Some(ua) => request.header(header::USER_AGENT, ua),
            None => request,
        }
    }

    fn request_body(&self, turns: &[Turn], model: &str, stream: bool) -> serde_json::Value {
        let mut body = json!({
            "model": model,
            "messages": turns,
            "temperature": self.temperature,
        });
        if stream {
            body["stream"] = json!(true);
        }
        body
    }
}

fn parse_completion(response: &serde_json::Value) -> anyhow::Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
        .to_string();

    let usage = response["usage"].as_object().map(|u| {
        let count = |key: &str| {
            u.get(key)
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };
        Usage {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        }
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    async fn chat(&self, turns: &[Turn], model: &str) -> anyhow::Result<LLMResponse> {
        let body = self.request_body(turns, model, false);

        info!("Sending chat request: model={model}, turns={}", turns.len());

        let response = self
            .request(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let parsed = parse_completion(&response)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        Ok(parsed)
    }

    async fn chat_stream(&self, turns: &[Turn], model: &str) -> anyhow::Result<TextStream> {
        let body = self.request_body(turns, model, true);

        info!(
            "Sending streaming chat request: model={model}, turns={}",
            turns.len()
        );

        let response = self.request(&body).send().await?.error_for_status()?;
        let bytes = Box::pin(response.bytes_stream());

        let fragments = futures_util::stream::try_unfold(
            (bytes, SseDecoder::new(), VecDeque::new()),
            |(mut bytes, mut decoder, mut ready)| async move {
                loop {
                    if let Some(fragment) = ready.pop_front() {
                        return Ok::<_, anyhow::Error>(Some((fragment, (bytes, decoder, ready))));
                    }
                    if decoder.is_done() {
                        return Ok(None);
                    }
                    match bytes.next().await {
                        Some(chunk) => ready.extend(decoder.feed(&chunk?)?),
                        None => ready.extend(decoder.finish()?),
                    }
                }
            },
        );

        Ok(Box::pin(fragments))
    }

    fn get_default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }
}
