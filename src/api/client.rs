//! HTTP client for the conversation endpoints.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::api::{CreateConversationRequest, CreateConversationResponse, SendMessageRequest};
use crate::core::constants::{DEFAULT_LANGUAGE, MESSAGE_TYPE_TEXT};
use crate::core::credentials::ApiCredentials;
use crate::core::reply_stream::{format_api_error, ProgressFn, ReplyAccumulator};
use crate::core::spaces::SpaceId;

const CREATE_CONVERSATION_PATH: &str = "v1/create-conversation";
const SEND_MESSAGE_PATH: &str = "v1/send-message";

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response, or the body stream broke.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: StatusCode, body: String },
    /// The response body was not the expected JSON.
    Decode(String),
    /// The create-conversation response had no usable id.
    MissingConversationId,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "request failed: {err}"),
            ApiError::Status { status, body } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            ApiError::Decode(err) => write!(f, "unexpected response body: {err}"),
            ApiError::MissingConversationId => {
                write!(f, "create-conversation response carried no conversation id")
            }
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

/// The two calls the rest of the crate needs from the remote service.
#[async_trait]
pub trait ConversationApi: Send + Sync {
    /// Open a new conversation in `space` and return its id.
    async fn create_conversation(&self, space: SpaceId) -> Result<String, ApiError>;

    /// Send `message` and return the final reply text.
    ///
    /// `progress`, when given, observes every intermediate full-text state.
    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<String, ApiError>;
}

#[derive(Clone)]
pub struct SlangitClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    language: String,
}

impl SlangitClient {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self::with_client(reqwest::Client::new(), credentials)
    }

    pub fn with_client(client: reqwest::Client, credentials: ApiCredentials) -> Self {
        Self {
            client,
            base_url: credentials.base_url,
            token: credentials.token,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(endpoint_url(&self.base_url, path))
            .header("Content-Type", "application/json")
            .bearer_auth(&self.token)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(ApiError::Status {
        status,
        body: format_api_error(&body),
    })
}

#[async_trait]
impl ConversationApi for SlangitClient {
    async fn create_conversation(&self, space: SpaceId) -> Result<String, ApiError> {
        let response = self
            .post(CREATE_CONVERSATION_PATH)
            .json(&CreateConversationRequest { space_id: space })
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let bytes = response.bytes().await?;
        let parsed: CreateConversationResponse =
            serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
        let id = parsed
            .conversation
            .id_string()
            .ok_or(ApiError::MissingConversationId)?;

        info!(space = %space, conversation = %id, "opened conversation");
        Ok(id)
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<String, ApiError> {
        let request = SendMessageRequest {
            message,
            file: None,
            message_type: MESSAGE_TYPE_TEXT,
            conversation_id,
            language: &self.language,
        };

        let response = self.post(SEND_MESSAGE_PATH).json(&request).send().await?;
        let response = ensure_success(response).await?;

        let mut stream = response.bytes_stream();
        let mut accumulator = ReplyAccumulator::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if accumulator.push(&chunk) {
                if let Some(progress) = progress {
                    progress(accumulator.latest());
                }
            }
        }

        let updates = accumulator.update_count();
        let reply = accumulator.finish();
        debug!(
            conversation = conversation_id,
            updates,
            chars = reply.chars().count(),
            "reply stream finished"
        );
        Ok(reply)
    }
}

/// Join a base URL and an endpoint path with exactly one slash between them.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
