//! Remote tutor gateway: request/response shaping around the generative-AI
//! service, plus the multi-turn conversation session built on top of it.

use async_trait::async_trait;
use wortschatz_types::{SentenceAnalysis, WordEntry};

pub mod client;
pub mod preprocess;
pub mod session;
pub mod wire;

pub use client::GeminiClient;
pub use session::{ChatSession, ChatTurn};

/// Remote tutoring capability behind the gateway boundary.
///
/// The four stateless operations are independently fallible and carry no
/// built-in retry. Media synthesis is best-effort: failure is `None`,
/// never an error.
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Analyze a single German word.
    async fn lookup_word(&self, term: &str) -> Result<WordEntry, LookupError>;

    /// Check a German sentence for grammar and logic.
    async fn check_sentence(&self, text: &str) -> Result<SentenceAnalysis, CheckError>;

    /// One conversational exchange. `history` is the running wire transcript
    /// and already ends with the user's latest turn.
    async fn chat_turn(
        &self,
        instruction: &str,
        history: &[ChatTurn],
    ) -> Result<String, ChatError>;

    /// Illustrative image for a looked-up word. Best-effort.
    async fn synthesize_image(&self, prompt: &str) -> Option<Vec<u8>>;

    /// Spoken rendition of a German text. Best-effort.
    async fn synthesize_speech(&self, text: &str) -> Option<Vec<u8>>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("empty search term")]
    EmptyTerm,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("authentication failed")]
    Authentication,

    #[error("malformed lookup response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("empty sentence")]
    EmptyText,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("authentication failed")]
    Authentication,

    #[error("malformed check response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("empty message")]
    EmptyMessage,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("authentication failed")]
    Authentication,

    #[error("malformed chat response: {0}")]
    MalformedResponse(String),
}
