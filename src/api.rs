//! Wire payloads for the Slangit HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::spaces::SpaceId;

pub mod client;

#[derive(Serialize)]
pub struct CreateConversationRequest {
    #[serde(rename = "spaceId")]
    pub space_id: SpaceId,
}

#[derive(Deserialize)]
pub struct CreateConversationResponse {
    pub conversation: ConversationInfo,
}

#[derive(Deserialize)]
pub struct ConversationInfo {
    pub id: Value,
}

impl ConversationInfo {
    /// Conversation ids are opaque; servers have sent both strings and numbers.
    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    pub file: Option<Value>,
    pub message_type: &'a str,
    pub conversation_id: &'a str,
    pub language: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_message_request_uses_camel_case_and_null_file() {
        let request = SendMessageRequest {
            message: "hello",
            file: None,
            message_type: "TEXT",
            conversation_id: "conv-1",
            language: "EN",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "hello",
                "file": null,
                "messageType": "TEXT",
                "conversationId": "conv-1",
                "language": "EN"
            })
        );
    }

    #[test]
    fn create_request_sends_numeric_space_id() {
        let request = CreateConversationRequest {
            space_id: SpaceId(41),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "spaceId": 41 })
        );
    }

    #[test]
    fn conversation_ids_accept_strings_and_numbers() {
        let string_id: CreateConversationResponse =
            serde_json::from_value(json!({ "conversation": { "id": "abc" } })).unwrap();
        assert_eq!(string_id.conversation.id_string().as_deref(), Some("abc"));

        let numeric_id: CreateConversationResponse =
            serde_json::from_value(json!({ "conversation": { "id": 981, "title": "x" } }))
                .unwrap();
        assert_eq!(numeric_id.conversation.id_string().as_deref(), Some("981"));

        let null_id: CreateConversationResponse =
            serde_json::from_value(json!({ "conversation": { "id": null } })).unwrap();
        assert_eq!(null_id.conversation.id_string(), None);
    }
}
