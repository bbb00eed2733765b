//! One chat turn: a prompt delivered to one or more spaces in sequence.

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::client::ConversationApi;
use crate::core::reply_stream::ProgressFn;
use crate::core::spaces::SpaceId;

/// One space a turn delivers to.
///
/// A space's conversation is opened lazily on its first send, not when a
/// panel first shows it, so drawing and switching projects never touch the
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTarget {
    pub space: SpaceId,
    /// Known conversation, or `None` to open one first.
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub prompt: String,
    pub targets: Vec<TurnTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    ConversationOpened {
        space: SpaceId,
        conversation_id: String,
    },
    Partial {
        space: SpaceId,
        text: String,
    },
    Replied {
        space: SpaceId,
        text: String,
    },
    Failed {
        space: SpaceId,
        error: String,
    },
    Finished,
}

/// Deliver `request` to each target in order, reporting progress on `tx`.
///
/// A target is fully answered (or failed) before the next one starts.
/// `Finished` is always the last event.
pub async fn run_turn<A>(api: &A, request: TurnRequest, tx: &mpsc::UnboundedSender<TurnEvent>)
where
    A: ConversationApi + ?Sized,
{
    for target in request.targets {
        let space = target.space;
        let conversation_id = match target.conversation_id {
            Some(id) => id,
            None => match api.create_conversation(space).await {
                Ok(id) => {
                    let _ = tx.send(TurnEvent::ConversationOpened {
                        space,
                        conversation_id: id.clone(),
                    });
                    id
                }
                Err(err) => {
                    let _ = tx.send(TurnEvent::Failed {
                        space,
                        error: err.to_string(),
                    });
                    continue;
                }
            },
        };

        let progress_tx = tx.clone();
        let forward = move |text: &str| {
            let _ = progress_tx.send(TurnEvent::Partial {
                space,
                text: text.to_string(),
            });
        };
        let progress: ProgressFn<'_> = &forward;

        let event = match api
            .send_message(&conversation_id, &request.prompt, Some(progress))
            .await
        {
            Ok(text) => TurnEvent::Replied { space, text },
            Err(err) => TurnEvent::Failed {
                space,
                error: err.to_string(),
            },
        };
        debug!(space = %space, "turn target done");
        let _ = tx.send(event);
    }

    let _ = tx.send(TurnEvent::Finished);
}
