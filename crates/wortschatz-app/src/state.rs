use std::sync::Arc;

use tokio::sync::RwLock;
use wortschatz_config::Config;
use wortschatz_types::{ChatMessage, Role, SentenceAnalysis, View, WordEntry, epoch_millis};

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub view: RwLock<ViewState>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            view: RwLock::new(ViewState::default()),
        }
    }
}

/// Transient per-view state. Switching views never clears another view's
/// state; everything here dies with the process.
#[derive(Default)]
pub struct ViewState {
    pub active: View,
    pub search: SearchState,
    pub checker: CheckerState,
    pub chat: ChatState,
    pub notice: Option<Notice>,
    notice_seq: u64,
}

#[derive(Default)]
pub struct SearchState {
    pub result: Option<WordEntry>,
    pub image: Option<Vec<u8>>,
    pub pending: bool,
    /// Bumped per lookup; image arrivals tagged with an older value are stale.
    pub lookup_seq: u64,
}

#[derive(Default)]
pub struct CheckerState {
    pub result: Option<SentenceAnalysis>,
    pub pending: bool,
}

#[derive(Default)]
pub struct ChatState {
    pub transcript: Vec<ChatMessage>,
    pub pending: bool,
}

impl ChatState {
    /// Append with a timestamp that never decreases within the transcript.
    pub fn append(&mut self, role: Role, text: String) -> ChatMessage {
        let floor = self.transcript.last().map(|m| m.sent_at).unwrap_or(0);
        let message = ChatMessage {
            role,
            text,
            sent_at: epoch_millis().max(floor),
        };
        self.transcript.push(message.clone());
        message
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub seq: u64,
    pub text: String,
}

impl ViewState {
    /// Install a new notice, preempting any current one. Returns the
    /// sequence number its expiry must carry.
    pub fn begin_notice(&mut self, text: String) -> u64 {
        self.notice_seq += 1;
        self.notice = Some(Notice {
            seq: self.notice_seq,
            text,
        });
        self.notice_seq
    }

    /// Clear the notice only if `seq` still names it; a stale expiry for a
    /// preempted notice is ignored. Returns whether anything was cleared.
    pub fn clear_notice_if(&mut self, seq: u64) -> bool {
        match &self.notice {
            Some(notice) if notice.seq == seq => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }
}
