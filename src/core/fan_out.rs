//! Running the same question list against several spaces.

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::api::client::ConversationApi;
use crate::core::batch::run_batch;
use crate::core::results::{BatchEntry, FanOutResults, ReplyClassifier};
use crate::core::spaces::SpaceId;

pub struct MultiSpaceProcessor<'a, A: ConversationApi + ?Sized> {
    api: &'a A,
    classifier: ReplyClassifier,
    jobs: usize,
}

impl<'a, A: ConversationApi + ?Sized> MultiSpaceProcessor<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            classifier: ReplyClassifier::default(),
            jobs: 1,
        }
    }

    pub fn with_classifier(mut self, classifier: ReplyClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Number of spaces processed at once; questions within a space are
    /// always sent one after another.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Ask `questions` in every space. A space that cannot be processed gets
    /// a single failure entry; the other spaces are unaffected. Results keep
    /// the order of `spaces`.
    pub async fn process_spaces(&self, spaces: &[SpaceId], questions: &[String]) -> FanOutResults {
        info!(
            spaces = spaces.len(),
            questions = questions.len(),
            jobs = self.jobs,
            "processing spaces"
        );

        let outcomes: Vec<(SpaceId, Vec<BatchEntry>)> = stream::iter(spaces.iter().copied())
            .map(|space| async move { (space, self.process_space(space, questions).await) })
            .buffered(self.jobs)
            .collect()
            .await;

        let mut results = FanOutResults::new();
        for (space, entries) in outcomes {
            results.insert(space, entries);
        }
        results
    }

    async fn process_space(&self, space: SpaceId, questions: &[String]) -> Vec<BatchEntry> {
        match run_batch(self.api, space, questions, &self.classifier).await {
            Ok(records) => records.into_iter().map(BatchEntry::Exchange).collect(),
            Err(err) => {
                warn!(space = %space, error = %err, "space failed");
                vec![BatchEntry::Failure {
                    error: format!("Failed to process space {space}: {err}"),
                }]
            }
        }
    }
}
