//! Grounded chat turns.
//!
//! A turn first retrieves a few documents with a vector-leaning hybrid
//! search, then sends the message, the conversation so far, and those
//! documents to the chat endpoint. The documents come back as citations.
//!
//! A turn never fails: a retrieval failure leaves the model without
//! context, and a chat failure is answered with an assistant message that
//! describes it.

use govsearch_hybrid::router::{self, HybridExecution};
use govsearch_hybrid::{
    ChatMessage, MergeMethod, MergedResult, SearchApi, SearchMode, SearchParams,
};

/// Documents retrieved per chat turn.
pub const DEFAULT_CONTEXT_LIMIT: usize = 3;
/// Vector weight of the context retrieval.
pub const DEFAULT_CONTEXT_VECTOR_WEIGHT: f64 = 0.7;

/// Reply to a blank message.
pub const EMPTY_MESSAGE_REPLY: &str = "Please type a question to get started.";

/// How context is retrieved for a chat turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatContextPolicy {
    /// Number of documents to retrieve.
    pub limit: usize,
    /// Vector weight of the weighted hybrid retrieval.
    pub vector_weight: f64,
    /// Whether the hybrid merge runs on the service or locally.
    pub execution: HybridExecution,
}

impl Default for ChatContextPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONTEXT_LIMIT,
            vector_weight: DEFAULT_CONTEXT_VECTOR_WEIGHT,
            execution: HybridExecution::Server,
        }
    }
}

impl ChatContextPolicy {
    fn search_params(&self, message: &str) -> SearchParams {
        SearchParams::new(message)
            .with_limit(self.limit)
            .with_vector_weight(self.vector_weight)
            .with_merge_method(MergeMethod::Weighted)
    }
}

/// The assistant's reply and the documents it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Assistant message.
    pub message: ChatMessage,
    /// Context documents in citation order (`[1]`, `[2]`, ...).
    pub sources: Vec<MergedResult>,
    /// The message was written locally (blank input, chat failure) rather
    /// than by the model. Such turns are not part of the conversation.
    pub synthesized: bool,
}

impl ChatResponse {
    fn synthesized(text: impl Into<String>) -> Self {
        Self {
            message: ChatMessage::assistant(text),
            sources: Vec::new(),
            synthesized: true,
        }
    }
}

/// Run one grounded chat turn.
///
/// `history` is the conversation before `message`; the caller appends both
/// `message` and the reply afterwards unless the reply is synthesized.
pub async fn grounded_turn<A: SearchApi>(
    api: &A,
    message: &str,
    history: &[ChatMessage],
    policy: &ChatContextPolicy,
) -> ChatResponse {
    if message.trim().is_empty() {
        return ChatResponse::synthesized(EMPTY_MESSAGE_REPLY);
    }

    let params = policy.search_params(message);
    let context = match router::search(api, SearchMode::Hybrid, &params, policy.execution).await {
        Ok(outcome) => {
            tracing::debug!(count = outcome.results.len(), "chat context retrieved");
            outcome.results
        }
        Err(err) => {
            tracing::warn!(error = %err, "context retrieval failed, answering without context");
            Vec::new()
        }
    };

    match api.chat(message, history, &context).await {
        Ok(reply) => ChatResponse {
            message: ChatMessage::assistant(reply),
            sources: context,
            synthesized: false,
        },
        Err(err) => {
            tracing::warn!(error = %err, "chat request failed");
            ChatResponse::synthesized(format!(
                "Sorry, I couldn't reach the assistant ({err}). Please try again."
            ))
        }
    }
}
