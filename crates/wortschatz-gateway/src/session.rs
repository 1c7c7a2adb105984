//! One continuous multi-turn exchange with the tutoring agent.

use std::sync::Arc;

use crate::{ChatError, TutorBackend};

/// Wire-side conversation turn. Roles follow the remote protocol
/// ("user" / "model"), not the display model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: String,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            text: text.into(),
        }
    }
}

/// Owns the wire history of one session. The history only ever records
/// exchanges the remote has actually seen: a failed send rolls the user
/// turn back out, so the next attempt starts from a consistent transcript.
pub struct ChatSession {
    backend: Arc<dyn TutorBackend>,
    instruction: String,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    /// A fresh, empty session with no memory of any prior one.
    pub fn create(backend: Arc<dyn TutorBackend>, display_language: &str) -> Self {
        Self {
            backend,
            instruction: tutor_instruction(display_language),
            history: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Dispatch one user message and return the tutor's reply.
    pub async fn send(&mut self, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.history.push(ChatTurn::user(text));
        let outcome = self.backend.chat_turn(&self.instruction, &self.history).await;
        match outcome {
            Ok(reply) => {
                self.history.push(ChatTurn::model(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// Discard the exchange entirely. Irreversible; the next send behaves
    /// exactly like the first send of a new session.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

fn tutor_instruction(display_language: &str) -> String {
    format!(
        "You are a helpful and friendly German language tutor. Your goal is to help users \
         learn German by answering their questions about grammar, vocabulary, culture, and \
         pronunciation. Always respond in {display_language}, but use German words and \
         sentences for examples. Be encouraging and provide clear explanations."
    )
}
