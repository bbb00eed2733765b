//! TUI-less "ask" command

use std::error::Error;
use std::io::{self, Write};
use std::sync::Mutex;

use tracing::warn;

use crate::api::client::{ApiError, ConversationApi, SlangitClient};
use crate::core::config::Config;
use crate::core::credentials::ApiCredentials;
use crate::core::reply_stream::ProgressFn;
use crate::core::results::{ExchangeStatus, ReplyClassifier};
use crate::core::spaces::SpaceId;

/// Open a fresh conversation in `space` and send one prompt.
pub async fn ask_space<A>(
    api: &A,
    space: SpaceId,
    prompt: &str,
    progress: Option<ProgressFn<'_>>,
) -> Result<String, ApiError>
where
    A: ConversationApi + ?Sized,
{
    let conversation_id = api.create_conversation(space).await?;
    api.send_message(&conversation_id, prompt, progress).await
}

/// Part of `latest` not yet echoed, or `None` when the reply was rewritten
/// rather than extended.
pub fn unprinted_suffix<'a>(printed: &str, latest: &'a str) -> Option<&'a str> {
    latest.strip_prefix(printed)
}

pub async fn run_ask(
    space: SpaceId,
    prompt: Vec<String>,
    config: &Config,
    credentials: ApiCredentials,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: slangit ask --space <id> <prompt>");
        std::process::exit(1);
    }

    let client = SlangitClient::new(credentials).with_language(config.language());
    let printed = Mutex::new(String::new());
    let echo = |latest: &str| {
        let Ok(mut printed) = printed.lock() else {
            return;
        };
        if let Some(suffix) = unprinted_suffix(&printed, latest) {
            print!("{suffix}");
            let _ = io::stdout().flush();
            *printed = latest.to_string();
        }
    };
    let progress: ProgressFn<'_> = &echo;

    let reply = match ask_space(&client, space, &prompt, Some(progress)).await {
        Ok(reply) => reply,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let printed = printed.into_inner().unwrap_or_default();
    match unprinted_suffix(&printed, &reply) {
        Some(suffix) => println!("{suffix}"),
        None => {
            // The stream rewrote earlier text; show the final reply in full.
            println!();
            println!("{reply}");
        }
    }

    let classifier = ReplyClassifier::new(config.apology_markers());
    if classifier.classify(&reply) == ExchangeStatus::Error {
        warn!(space = %space, "reply looks like an apology");
        eprintln!("⚠️  The reply looks like a refusal or apology");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::FakeApi;

    #[tokio::test]
    async fn ask_opens_a_conversation_per_call() {
        let api = FakeApi::new().answer("hello", "hi there");

        let first = ask_space(&api, SpaceId(41), "hello", None).await.unwrap();
        let second = ask_space(&api, SpaceId(41), "hello", None).await.unwrap();

        assert_eq!(first, "hi there");
        assert_eq!(second, "hi there");
        assert_eq!(api.conversations_opened(), vec![SpaceId(41), SpaceId(41)]);
    }

    #[tokio::test]
    async fn ask_reports_unavailable_space() {
        let api = FakeApi::new().fail_space(SpaceId(46));
        let err = ask_space(&api, SpaceId(46), "hello", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn suffix_only_when_reply_extends_printed_text() {
        assert_eq!(unprinted_suffix("", "abc"), Some("abc"));
        assert_eq!(unprinted_suffix("ab", "abc"), Some("c"));
        assert_eq!(unprinted_suffix("abc", "abc"), Some(""));
        assert_eq!(unprinted_suffix("abx", "abc"), None);
    }
}
