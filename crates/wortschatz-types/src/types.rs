use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Grammatical gender marker of a German noun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Article {
    Der,
    Die,
    Das,
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Article::Der => "der",
            Article::Die => "die",
            Article::Das => "das",
        };
        f.write_str(s)
    }
}

/// One analyzed vocabulary entry as returned by the tutor backend.
///
/// Every field except `article` is required at the gateway boundary;
/// a missing `article` means "not a noun", never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(default)]
    pub article: Option<Article>,
    pub part_of_speech: String,
    pub meaning_primary: String,
    pub meaning_secondary: String,
    pub plural_or_conjugation: String,
    pub plural_or_conjugation_meaning: String,
    pub synonym: String,
    pub synonym_meaning: String,
    pub example_sentence: String,
    pub example_sentence_translated: String,
    pub image_prompt: String,
}

/// A word the user explicitly saved into the notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWord {
    pub id: String,
    pub saved_at: u64,
    #[serde(flatten)]
    pub entry: WordEntry,
}

/// Verdict of one sentence check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub is_correct: bool,
    /// Best corrected form; equals the input when it was already correct.
    pub corrected: String,
    pub explanation: String,
    pub meaning: String,
    /// Grammatical confidence in [0, 100], higher is better.
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One visible line of the tutoring transcript. Session-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub sent_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Search,
    Notebook,
    Checker,
    Assistant,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Search => "search",
            View::Notebook => "notebook",
            View::Checker => "checker",
            View::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    // UI -> app
    SwitchView(View),
    Search(String),
    SaveCurrentWord,
    DeleteWord(String),
    CheckSentence(String),
    ChatSend(String),
    ChatClear,
    Speak(String),

    // spawned task -> app
    ImageFetched { lookup: u64, bytes: Option<Vec<u8>> },
    NoticeExpired { seq: u64 },

    // app -> UI
    BackendReady,
    ViewChanged(View),
    WordReady(WordEntry),
    WordImageReady(Vec<u8>),
    WordsChanged(Vec<SavedWord>),
    AnalysisReady(SentenceAnalysis),
    ChatAppended(ChatMessage),
    ChatFailed,
    ChatCleared,
    SpeechReady(Vec<u8>),
    Notice(String),
    NoticeCleared,
}

/// Wall-clock timestamp in milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
