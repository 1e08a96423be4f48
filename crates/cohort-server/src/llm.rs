//! [`CandidateSource`] backed by an OpenAI-compatible chat-completions
//! endpoint.

use std::time::Duration;

use cohort_query::{CandidateSource, candidate::system_prompt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ServerConfig;

#[derive(Debug, Error)]
pub enum LlmError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("endpoint returned {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("reply contained no message")]
  EmptyReply,
}

#[derive(Serialize)]
struct Message<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  temperature: f32,
  messages:    [Message<'a>; 2],
}

#[derive(Deserialize)]
struct ChatReply {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: Option<String>,
}

impl ChatReply {
  fn into_text(self) -> Result<String, LlmError> {
    self
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|text| !text.trim().is_empty())
      .ok_or(LlmError::EmptyReply)
  }
}

/// Chat-completions client. Cheap to clone.
#[derive(Clone)]
pub struct ChatCompletions {
  client:   Client,
  endpoint: String,
  model:    String,
  api_key:  Option<String>,
  prompt:   String,
}

impl ChatCompletions {
  pub fn new(config: &ServerConfig) -> Result<Self, LlmError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      endpoint: config.llm_endpoint.clone(),
      model: config.llm_model.clone(),
      api_key: config.llm_api_key.clone(),
      prompt: system_prompt(),
    })
  }

  fn request<'a>(&'a self, question: &'a str) -> ChatRequest<'a> {
    ChatRequest {
      model:       &self.model,
      temperature: 0.0,
      messages:    [
        Message { role: "system", content: &self.prompt },
        Message { role: "user", content: question },
      ],
    }
  }
}

impl CandidateSource for ChatCompletions {
  type Error = LlmError;

  async fn candidate(&self, question: &str) -> Result<String, LlmError> {
    let mut req = self.client.post(&self.endpoint).json(&self.request(question));
    if let Some(key) = &self.api_key {
      req = req.bearer_auth(key);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(LlmError::Status { status, body });
    }
    resp.json::<ChatReply>().await?.into_text()
  }
}
