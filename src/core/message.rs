/// Who a transcript entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptRole {
    User,
    Assistant,
    /// Shown inline in the transcript; never sent to the API.
    AppError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: TranscriptRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::Assistant,
            content: content.into(),
        }
    }

    pub fn app_error(content: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::AppError,
            content: content.into(),
        }
    }
}
