//! Sequential question runner for a single space.

use tracing::{info, warn};

use crate::api::client::{ApiError, ConversationApi};
use crate::core::results::{ExchangeRecord, ExchangeStatus, ReplyClassifier};
use crate::core::spaces::SpaceId;

/// Open one conversation in `space` and ask every question in order.
///
/// Each question yields exactly one record. A failed send becomes an error
/// record and the run continues; only a failure to open the conversation is
/// returned as an error.
pub async fn run_batch<A>(
    api: &A,
    space: SpaceId,
    questions: &[String],
    classifier: &ReplyClassifier,
) -> Result<Vec<ExchangeRecord>, ApiError>
where
    A: ConversationApi + ?Sized,
{
    let conversation_id = api.create_conversation(space).await?;
    let mut records = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let record = match api.send_message(&conversation_id, question, None).await {
            Ok(answer) => {
                let status = classifier.classify(&answer);
                ExchangeRecord {
                    question: question.clone(),
                    answer,
                    status,
                }
            }
            Err(err) => {
                warn!(space = %space, question = index, error = %err, "question failed");
                ExchangeRecord {
                    question: question.clone(),
                    answer: format!("Error: {err}"),
                    status: ExchangeStatus::Error,
                }
            }
        };
        records.push(record);
    }

    info!(
        space = %space,
        questions = questions.len(),
        failed = records.iter().filter(|r| !r.status.is_success()).count(),
        "batch finished"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::FakeApi;

    fn questions(items: &[&str]) -> Vec<String> {
        items.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn produces_one_record_per_question_in_order() {
        let api = FakeApi::new()
            .answer("first?", "One.")
            .answer("second?", "Two.")
            .answer("third?", "Three.");

        let records = run_batch(
            &api,
            SpaceId(41),
            &questions(&["first?", "second?", "third?"]),
            &ReplyClassifier::default(),
        )
        .await
        .expect("batch should run");

        let answers: Vec<_> = records.iter().map(|r| r.answer.as_str()).collect();
        assert_eq!(answers, ["One.", "Two.", "Three."]);
        assert!(records.iter().all(|r| r.status == ExchangeStatus::Success));
        assert_eq!(api.conversations_opened(), vec![SpaceId(41)]);
    }

    #[tokio::test]
    async fn all_questions_share_one_conversation() {
        let api = FakeApi::new();
        run_batch(
            &api,
            SpaceId(45),
            &questions(&["a", "b"]),
            &ReplyClassifier::default(),
        )
        .await
        .unwrap();

        let sent = api.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, sent[1].0);
        assert_eq!(sent[0].1, "a");
        assert_eq!(sent[1].1, "b");
    }

    #[tokio::test]
    async fn apology_answers_are_tagged_as_errors() {
        let api = FakeApi::new().answer("q", "Sorry, I don't know.");
        let records = run_batch(
            &api,
            SpaceId(41),
            &questions(&["q"]),
            &ReplyClassifier::default(),
        )
        .await
        .unwrap();
        assert_eq!(records[0].status, ExchangeStatus::Error);
        assert_eq!(records[0].answer, "Sorry, I don't know.");
    }

    #[tokio::test]
    async fn send_failures_are_recorded_and_processing_continues() {
        let api = FakeApi::new()
            .fail_message("broken", "connection reset")
            .answer("after", "still here");

        let records = run_batch(
            &api,
            SpaceId(41),
            &questions(&["before", "broken", "after"]),
            &ReplyClassifier::default(),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].status, ExchangeStatus::Error);
        assert_eq!(
            records[1].answer,
            "Error: unexpected response body: connection reset"
        );
        assert_eq!(records[2].answer, "still here");
        assert_eq!(records[2].status, ExchangeStatus::Success);
    }

    #[tokio::test]
    async fn conversation_failure_is_propagated() {
        let api = FakeApi::new().fail_space(SpaceId(9));
        let result = run_batch(
            &api,
            SpaceId(9),
            &questions(&["q"]),
            &ReplyClassifier::default(),
        )
        .await;
        assert!(result.is_err());
        assert!(api.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn empty_question_list_still_opens_conversation() {
        let api = FakeApi::new();
        let records = run_batch(&api, SpaceId(1), &[], &ReplyClassifier::default())
            .await
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(api.conversations_opened().len(), 1);
    }
}
