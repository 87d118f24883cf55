//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! without making API calls. Replies are scripted as a queue: each call pops
//! the next reply, and once the queue is empty the fallback reply is used.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A successful text response
    Text(String),
    /// A provider failure with the given message
    Error(String),
}

/// A mock completion model for testing purposes.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: Arc<Mutex<Option<MockReply>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCompletionModel {
    /// Creates a new mock model that answers with empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that always answers with `text`.
    pub async fn always_text(text: &str) -> Self {
        let model = Self::new();
        model.set_fallback(MockReply::Text(text.to_string())).await;
        model
    }

    /// Queues a text reply.
    pub async fn push_text(&self, text: &str) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Text(text.to_string()));
    }

    /// Queues a provider error.
    pub async fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Error(message.to_string()));
    }

    /// Sets the reply used once the queue is drained.
    pub async fn set_fallback(&self, reply: MockReply) {
        *self.fallback.lock().await = Some(reply);
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = match self.replies.lock().await.pop_front() {
            Some(reply) => Some(reply),
            None => self.fallback.lock().await.clone(),
        };

        match reply {
            Some(MockReply::Text(text)) => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text(&text)),
                raw_response: text,
            }),
            Some(MockReply::Error(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: String::new(),
            }),
        }
    }
}
