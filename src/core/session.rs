//! Per-space chat state for one interactive session.
//!
//! Transcripts and conversation ids are keyed by space, so every panel that
//! shows a space sees the same history and talks to the same conversation.
//! A session is created when the UI starts and closed when it exits; nothing
//! is persisted.

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use crate::core::message::Message;
use crate::core::spaces::{SpaceDirectory, SpaceId};

#[derive(Debug, Clone, Default)]
pub struct SpaceThread {
    pub conversation_id: Option<String>,
    pub transcript: Vec<Message>,
    /// Partial reply shown while a response is still streaming in.
    pub pending_reply: Option<String>,
}

#[derive(Debug)]
pub struct ChatSession {
    directory: SpaceDirectory,
    threads: HashMap<SpaceId, SpaceThread>,
    started_at: Instant,
    turns: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub spaces: usize,
    pub conversations: usize,
    pub turns: usize,
}

impl ChatSession {
    pub fn start(directory: SpaceDirectory) -> Self {
        info!(spaces = directory.len(), "chat session started");
        Self {
            directory,
            threads: HashMap::new(),
            started_at: Instant::now(),
            turns: 0,
        }
    }

    pub fn directory(&self) -> &SpaceDirectory {
        &self.directory
    }

    pub fn display_name(&self, space: SpaceId) -> String {
        self.directory.display_name(space)
    }

    pub fn greeting(&self, space: SpaceId) -> String {
        format!(
            "Welcome to {}! How can I help you?",
            self.display_name(space)
        )
    }

    /// Get the thread for `space`, creating it with a greeting on first use.
    pub fn ensure_thread(&mut self, space: SpaceId) -> &mut SpaceThread {
        if !self.threads.contains_key(&space) {
            let greeting = self.greeting(space);
            self.threads.insert(
                space,
                SpaceThread {
                    transcript: vec![Message::assistant(greeting)],
                    ..SpaceThread::default()
                },
            );
        }
        self.threads.entry(space).or_default()
    }

    pub fn transcript(&self, space: SpaceId) -> &[Message] {
        self.threads
            .get(&space)
            .map(|thread| thread.transcript.as_slice())
            .unwrap_or(&[])
    }

    pub fn conversation_id(&self, space: SpaceId) -> Option<&str> {
        self.threads
            .get(&space)
            .and_then(|thread| thread.conversation_id.as_deref())
    }

    pub fn set_conversation_id(&mut self, space: SpaceId, conversation_id: String) {
        self.ensure_thread(space).conversation_id = Some(conversation_id);
    }

    pub fn push_user(&mut self, space: SpaceId, content: impl Into<String>) {
        self.ensure_thread(space)
            .transcript
            .push(Message::user(content));
    }

    /// Record a completed reply, replacing any streaming preview.
    pub fn push_reply(&mut self, space: SpaceId, content: impl Into<String>) {
        let thread = self.ensure_thread(space);
        thread.pending_reply = None;
        thread.transcript.push(Message::assistant(content));
        self.turns += 1;
    }

    pub fn push_error(&mut self, space: SpaceId, content: impl Into<String>) {
        let thread = self.ensure_thread(space);
        thread.pending_reply = None;
        thread.transcript.push(Message::app_error(content));
    }

    pub fn set_pending_reply(&mut self, space: SpaceId, text: impl Into<String>) {
        self.ensure_thread(space).pending_reply = Some(text.into());
    }

    pub fn pending_reply(&self, space: SpaceId) -> Option<&str> {
        self.threads
            .get(&space)
            .and_then(|thread| thread.pending_reply.as_deref())
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            spaces: self.threads.len(),
            conversations: self
                .threads
                .values()
                .filter(|thread| thread.conversation_id.is_some())
                .count(),
            turns: self.turns,
        }
    }

    /// End the session, dropping all transcripts.
    pub fn close(self) -> SessionStats {
        let stats = self.stats();
        info!(
            spaces = stats.spaces,
            conversations = stats.conversations,
            turns = stats.turns,
            elapsed_secs = self.started_at.elapsed().as_secs(),
            "chat session closed"
        );
        stats
    }
}
