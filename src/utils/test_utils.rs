use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::client::{ApiError, ConversationApi};
use crate::core::reply_stream::ProgressFn;
use crate::core::spaces::SpaceId;

/// In-memory stand-in for the Slangit API.
///
/// Unknown questions are answered with `Answer to <question> (<conversation>)`.
#[derive(Default)]
pub struct FakeApi {
    answers: HashMap<String, String>,
    failing_messages: HashMap<String, String>,
    failing_spaces: HashSet<SpaceId>,
    next_conversation: AtomicUsize,
    opened: Mutex<Vec<SpaceId>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, question: &str, answer: &str) -> Self {
        self.answers
            .insert(question.to_string(), answer.to_string());
        self
    }

    pub fn fail_message(mut self, question: &str, reason: &str) -> Self {
        self.failing_messages
            .insert(question.to_string(), reason.to_string());
        self
    }

    pub fn fail_space(mut self, space: SpaceId) -> Self {
        self.failing_spaces.insert(space);
        self
    }

    pub fn conversations_opened(&self) -> Vec<SpaceId> {
        self.opened.lock().unwrap().clone()
    }

    /// `(conversation_id, message)` pairs in send order.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationApi for FakeApi {
    async fn create_conversation(&self, space: SpaceId) -> Result<String, ApiError> {
        if self.failing_spaces.contains(&space) {
            return Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "space unavailable".to_string(),
            });
        }
        self.opened.lock().unwrap().push(space);
        let n = self.next_conversation.fetch_add(1, Ordering::SeqCst);
        Ok(format!("conv-{space}-{n}"))
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<String, ApiError> {
        self.sent
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), message.to_string()));

        if let Some(reason) = self.failing_messages.get(message) {
            return Err(ApiError::Decode(reason.clone()));
        }

        let answer = self
            .answers
            .get(message)
            .cloned()
            .unwrap_or_else(|| format!("Answer to {message} ({conversation_id})"));

        if let Some(progress) = progress {
            let half: String = answer.chars().take(answer.chars().count() / 2).collect();
            progress(&half);
            progress(&answer);
        }
        Ok(answer)
    }
}
