//! Client for the answering model.
//!
//! Speaks the OpenAI-compatible chat-completions protocol. The assembled
//! context goes in as the user turn; the model only phrases an answer from it.
//! Failures never reach the asker: they are logged and replaced by a fixed
//! message.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::query::Context;

/// Returned without calling the model when nothing matched the question
pub const NO_DATA_MESSAGE: &str =
    "관련 데이터가 없습니다. 의원 이름이나 정당명, 항목을 조금 더 정확히 입력해주세요.";

/// Returned when the model could not be reached or answered nonsense
pub const FALLBACK_MESSAGE: &str =
    "죄송합니다. 지금은 답변을 생성할 수 없습니다. 잠시 후 다시 시도해주세요.";

pub const SYSTEM_PROMPT: &str = "\
너는 대한민국 국회의원과 정당의 실적 데이터를 분석하는 챗봇이야. \
함께 제공되는 데이터만 근거로 자연스럽고 명확한 한국어로 답변해.

지침:
1. 제공된 데이터에 없는 내용은 만들어내거나 추측하지 마. 데이터가 부족하면 부족하다고 말해.
2. 국회의원 실적은 'ranking_members', 정당 실적은 'party_score', 정당 통계는 'party_statistics_kr' 데이터야.
   - 정당의 의원수, 평균실적, 가중점수는 'party_score'를 참고해.
   - 정당의 출석률은 '출석_평균', 기권률은 '기권무효_평균', 표결일치율은 '표결일치_평균' 컬럼을 의미해.
   - 정당의 총점이나 점수는 'party_score'의 '평균실적'을 의미해.
3. '_순위'로 끝나는 컬럼은 해당 항목의 순위야. 순위를 묻는 질문에는 이 값을 참고해.
4. '데이터 출처'에 mode가 max이면 해당 값이 가장 큰 행, min이면 가장 작은 행이 주어진 거야.
5. 숫자를 기계적으로 나열하지 말고 읽기 쉬운 문장으로 답해.
6. 비표준 정당명('국힘', '민주당', '더민주', '혁신당' 등)은 이미 정식 명칭으로 정규화되어 있어.";

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("no API key configured for the answering model")]
    MissingApiKey,

    #[error("request to answering model failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("answering model returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("answering model returned no message content")]
    Malformed,
}

/// Outcome of answering one question
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Whether the model was actually called
    pub called_model: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Answering-model client, shared across requests
pub struct AnswerClient {
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    http: reqwest::Client,
}

impl AnswerClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            url: config.url.clone(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            temperature: config.temperature,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Answer a question from its assembled context.
    ///
    /// An empty context skips the model entirely.
    pub async fn answer(&self, context: &Context) -> Answer {
        if context.is_empty() {
            return Answer {
                text: NO_DATA_MESSAGE.to_string(),
                called_model: false,
            };
        }

        let text = match self.complete(&context.render()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(model = %self.model, "Answering model failed: {}", e);
                FALLBACK_MESSAGE.to_string()
            }
        };
        Answer {
            text,
            called_model: true,
        }
    }

    /// One chat-completions round trip with the fixed system prompt
    pub async fn complete(&self, user_prompt: &str) -> Result<String, AnswerError> {
        let api_key = self.api_key.as_deref().ok_or(AnswerError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnswerError::Status { status, body });
        }

        let body: ChatResponse = resp.json().await.map_err(|_| AnswerError::Malformed)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(AnswerError::Malformed)
    }
}
