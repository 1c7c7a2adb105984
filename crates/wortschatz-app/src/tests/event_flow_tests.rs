//! End-to-end tests of the event loop against a scripted backend.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wortschatz_config::Config;
use wortschatz_gateway::{ChatError, ChatTurn, CheckError, LookupError, TutorBackend};
use wortschatz_store::WordStore;
use wortschatz_types::{
    AppEvent, Article, Role, SentenceAnalysis, View, WordEntry,
};

use crate::events::event_loop;
use crate::state::AppState;

fn scratch_path() -> PathBuf {
    std::env::temp_dir().join(format!("wortschatz-app-{}.json", Uuid::new_v4()))
}

fn entry(word: &str) -> WordEntry {
    WordEntry {
        word: word.to_string(),
        article: Some(Article::Das),
        part_of_speech: "Noun".to_string(),
        meaning_primary: "house".to_string(),
        meaning_secondary: "house".to_string(),
        plural_or_conjugation: "Häuser".to_string(),
        plural_or_conjugation_meaning: "houses".to_string(),
        synonym: "Gebäude".to_string(),
        synonym_meaning: "building".to_string(),
        example_sentence: "Das Haus ist alt.".to_string(),
        example_sentence_translated: "The house is old.".to_string(),
        image_prompt: "a small house".to_string(),
    }
}

fn analysis() -> SentenceAnalysis {
    SentenceAnalysis {
        is_correct: false,
        corrected: "Ich gehe nach Hause.".to_string(),
        explanation: "word order".to_string(),
        meaning: "I am going home".to_string(),
        score: 60.0,
    }
}

#[derive(Default)]
struct ScriptedBackend {
    lookups: Mutex<VecDeque<Result<WordEntry, LookupError>>>,
    checks: Mutex<VecDeque<Result<SentenceAnalysis, CheckError>>>,
    chats: Mutex<VecDeque<Result<String, ChatError>>>,
    image: Option<Vec<u8>>,
    check_calls: AtomicUsize,
    chat_history_lens: Mutex<Vec<usize>>,
}

impl ScriptedBackend {
    fn with_lookups(mut self, script: Vec<Result<WordEntry, LookupError>>) -> Self {
        self.lookups = Mutex::new(script.into());
        self
    }

    fn with_checks(mut self, script: Vec<Result<SentenceAnalysis, CheckError>>) -> Self {
        self.checks = Mutex::new(script.into());
        self
    }

    fn with_chats(mut self, script: Vec<Result<String, ChatError>>) -> Self {
        self.chats = Mutex::new(script.into());
        self
    }

    fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }
}

#[async_trait]
impl TutorBackend for ScriptedBackend {
    async fn lookup_word(&self, _term: &str) -> Result<WordEntry, LookupError> {
        self.lookups
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LookupError::Api("script exhausted".to_string())))
    }

    async fn check_sentence(&self, _text: &str) -> Result<SentenceAnalysis, CheckError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.checks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CheckError::Api("script exhausted".to_string())))
    }

    async fn chat_turn(
        &self,
        _instruction: &str,
        history: &[ChatTurn],
    ) -> Result<String, ChatError> {
        self.chat_history_lens.lock().unwrap().push(history.len());
        self.chats
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ChatError::Api("script exhausted".to_string())))
    }

    async fn synthesize_image(&self, _prompt: &str) -> Option<Vec<u8>> {
        self.image.clone()
    }

    async fn synthesize_speech(&self, _text: &str) -> Option<Vec<u8>> {
        None
    }
}

struct Harness {
    state: Arc<AppState>,
    backend: Arc<ScriptedBackend>,
    to_app: AsyncSender<AppEvent>,
    from_app: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
    store_path: PathBuf,
}

impl Harness {
    async fn next(&self) -> AppEvent {
        timeout(Duration::from_secs(2), self.from_app.recv())
            .await
            .expect("timed out waiting for an app event")
            .expect("app loop dropped its channel")
    }

    async fn dispatch(&self, event: AppEvent) {
        self.to_app.send(event).await.unwrap();
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
        let _ = std::fs::remove_file(&self.store_path);
    }
}

/// Spawns an event loop over a fresh store, consuming the startup events.
async fn start(backend: ScriptedBackend) -> Harness {
    let store_path = scratch_path();
    let mut config = Config::default();
    config.storage.path = store_path.clone();
    let state = Arc::new(AppState::new(config));
    let backend = Arc::new(backend);

    let (ui_to_app_tx, ui_to_app_rx) = kanal::bounded_async(64);
    let (app_to_ui_tx, app_to_ui_rx) = kanal::bounded_async(256);
    let cancel = CancellationToken::new();

    tokio::spawn(event_loop(
        state.clone(),
        WordStore::open(&store_path),
        backend.clone(),
        ui_to_app_rx,
        ui_to_app_tx.clone(),
        app_to_ui_tx,
        cancel.child_token(),
    ));

    let harness = Harness {
        state,
        backend,
        to_app: ui_to_app_tx,
        from_app: app_to_ui_rx,
        cancel,
        store_path,
    };

    assert!(matches!(harness.next().await, AppEvent::BackendReady));
    assert!(matches!(harness.next().await, AppEvent::WordsChanged(_)));
    harness
}

#[tokio::test]
async fn lookup_publishes_word_then_image() {
    let backend = ScriptedBackend::default()
        .with_lookups(vec![Ok(entry("Haus"))])
        .with_image(vec![1, 2, 3]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;

    match harness.next().await {
        AppEvent::WordReady(word) => assert_eq!(word.word, "Haus"),
        other => panic!("expected WordReady, got {other:?}"),
    }
    match harness.next().await {
        AppEvent::WordImageReady(bytes) => assert_eq!(bytes, vec![1, 2, 3]),
        other => panic!("expected WordImageReady, got {other:?}"),
    }

    let views = harness.state.view.read().await;
    assert!(views.search.result.is_some());
    assert!(views.search.image.is_some());
    assert!(!views.search.pending);
}

#[tokio::test]
async fn failed_lookup_notices_and_clears_result() {
    let backend = ScriptedBackend::default()
        .with_lookups(vec![Err(LookupError::Api("HTTP 503".to_string()))]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;

    assert!(matches!(harness.next().await, AppEvent::Notice(_)));
    let views = harness.state.view.read().await;
    assert!(views.search.result.is_none());
    assert!(!views.search.pending);
}

#[tokio::test]
async fn image_failure_leaves_the_text_result_intact() {
    // no image scripted: synthesis yields None
    let backend = ScriptedBackend::default().with_lookups(vec![Ok(entry("Haus"))]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::WordReady(_)));

    // no WordImageReady may ever surface; the next UI event is the view switch
    harness.dispatch(AppEvent::SwitchView(View::Notebook)).await;
    assert!(matches!(
        harness.next().await,
        AppEvent::ViewChanged(View::Notebook)
    ));

    let views = harness.state.view.read().await;
    assert!(views.search.result.is_some());
    assert!(views.search.image.is_none());
}

#[tokio::test]
async fn stale_image_arrival_is_discarded() {
    let backend = ScriptedBackend::default().with_lookups(vec![Ok(entry("Haus"))]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::WordReady(_)));

    // an arrival tagged with a lookup that is no longer current
    harness
        .dispatch(AppEvent::ImageFetched {
            lookup: 0,
            bytes: Some(vec![9, 9, 9]),
        })
        .await;
    harness.dispatch(AppEvent::SwitchView(View::Notebook)).await;
    assert!(matches!(
        harness.next().await,
        AppEvent::ViewChanged(View::Notebook)
    ));

    let views = harness.state.view.read().await;
    assert!(views.search.image.is_none());
}

#[tokio::test]
async fn empty_sentence_never_reaches_the_backend() {
    let backend = ScriptedBackend::default();
    let harness = start(backend).await;

    harness.dispatch(AppEvent::CheckSentence("   ".to_string())).await;
    harness.dispatch(AppEvent::SwitchView(View::Checker)).await;
    assert!(matches!(
        harness.next().await,
        AppEvent::ViewChanged(View::Checker)
    ));

    // the blank sentence was dropped before the gateway
    assert_eq!(harness.backend.check_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_check_publishes_the_analysis() {
    let backend = ScriptedBackend::default().with_checks(vec![Ok(analysis())]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::CheckSentence("Ich bin gehen nach Hause.".to_string())).await;

    match harness.next().await {
        AppEvent::AnalysisReady(result) => {
            assert!(!result.is_correct);
            assert_eq!(result.corrected, "Ich gehe nach Hause.");
        }
        other => panic!("expected AnalysisReady, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_appends_in_order_and_failure_keeps_the_user_message() {
    let backend = ScriptedBackend::default().with_chats(vec![
        Ok("Hallo! Wie kann ich helfen?".to_string()),
        Err(ChatError::Api("HTTP 500".to_string())),
    ]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::ChatSend("Guten Tag".to_string())).await;
    match harness.next().await {
        AppEvent::ChatAppended(m) => {
            assert_eq!(m.role, Role::User);
            assert_eq!(m.text, "Guten Tag");
        }
        other => panic!("expected user message, got {other:?}"),
    }
    match harness.next().await {
        AppEvent::ChatAppended(m) => assert_eq!(m.role, Role::Assistant),
        other => panic!("expected assistant reply, got {other:?}"),
    }

    harness.dispatch(AppEvent::ChatSend("Noch eine Frage".to_string())).await;
    match harness.next().await {
        AppEvent::ChatAppended(m) => assert_eq!(m.role, Role::User),
        other => panic!("expected user message, got {other:?}"),
    }
    assert!(matches!(harness.next().await, AppEvent::ChatFailed));
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));

    let views = harness.state.view.read().await;
    let transcript = &views.chat.transcript;
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[2].role, Role::User);
    assert_eq!(transcript[2].text, "Noch eine Frage");
    assert!(transcript.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));
}

#[tokio::test]
async fn clearing_the_chat_starts_a_fresh_session() {
    let backend = ScriptedBackend::default().with_chats(vec![
        Ok("Erste Antwort.".to_string()),
        Ok("Zweite Antwort.".to_string()),
    ]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::ChatSend("eins".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::ChatAppended(_)));
    assert!(matches!(harness.next().await, AppEvent::ChatAppended(_)));

    harness.dispatch(AppEvent::ChatClear).await;
    assert!(matches!(harness.next().await, AppEvent::ChatCleared));
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));
    assert!(harness.state.view.read().await.chat.transcript.is_empty());

    harness.dispatch(AppEvent::ChatSend("zwei".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::ChatAppended(_)));
    assert!(matches!(harness.next().await, AppEvent::ChatAppended(_)));

    // the second dispatch carried exactly one turn: no residual context
    assert_eq!(*harness.backend.chat_history_lens.lock().unwrap(), vec![1, 1]);
    let views = harness.state.view.read().await;
    assert_eq!(views.chat.transcript.len(), 2);
    assert_eq!(views.chat.transcript[0].text, "zwei");
}

#[tokio::test]
async fn duplicate_save_is_rejected_with_a_notice() {
    let backend = ScriptedBackend::default().with_lookups(vec![Ok(entry("Haus"))]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::WordReady(_)));

    harness.dispatch(AppEvent::SaveCurrentWord).await;
    match harness.next().await {
        AppEvent::WordsChanged(words) => assert_eq!(words.len(), 1),
        other => panic!("expected WordsChanged, got {other:?}"),
    }
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));

    // second save of the same word: a notice, no WordsChanged
    harness.dispatch(AppEvent::SaveCurrentWord).await;
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));

    let reopened = WordStore::open(&harness.store_path);
    assert_eq!(reopened.words().len(), 1);
}

#[tokio::test]
async fn saving_without_a_lookup_only_notices() {
    let backend = ScriptedBackend::default();
    let harness = start(backend).await;

    harness.dispatch(AppEvent::SaveCurrentWord).await;
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));
}

#[tokio::test]
async fn deleting_a_saved_word_updates_the_notebook() {
    let backend = ScriptedBackend::default().with_lookups(vec![Ok(entry("Haus"))]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::WordReady(_)));
    harness.dispatch(AppEvent::SaveCurrentWord).await;
    let id = match harness.next().await {
        AppEvent::WordsChanged(words) => words[0].id.clone(),
        other => panic!("expected WordsChanged, got {other:?}"),
    };
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));

    harness.dispatch(AppEvent::DeleteWord(id)).await;
    match harness.next().await {
        AppEvent::WordsChanged(words) => assert!(words.is_empty()),
        other => panic!("expected WordsChanged, got {other:?}"),
    }
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));

    let reopened = WordStore::open(&harness.store_path);
    assert!(reopened.words().is_empty());
}

#[tokio::test]
async fn switching_views_preserves_transient_state() {
    let backend = ScriptedBackend::default().with_lookups(vec![Ok(entry("Haus"))]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::Search("Haus".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::WordReady(_)));

    harness.dispatch(AppEvent::SwitchView(View::Assistant)).await;
    assert!(matches!(harness.next().await, AppEvent::ViewChanged(View::Assistant)));
    harness.dispatch(AppEvent::SwitchView(View::Search)).await;
    assert!(matches!(harness.next().await, AppEvent::ViewChanged(View::Search)));

    let views = harness.state.view.read().await;
    assert_eq!(views.search.result.as_ref().unwrap().word, "Haus");
}

#[tokio::test]
async fn stale_notice_expiry_does_not_clear_a_newer_notice() {
    let backend = ScriptedBackend::default().with_checks(vec![
        Err(CheckError::Api("HTTP 500".to_string())),
        Err(CheckError::Api("HTTP 500".to_string())),
    ]);
    let harness = start(backend).await;

    harness.dispatch(AppEvent::CheckSentence("erste".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));
    harness.dispatch(AppEvent::CheckSentence("zweite".to_string())).await;
    assert!(matches!(harness.next().await, AppEvent::Notice(_)));

    // expiry of the first (preempted) notice is ignored; the second clears
    harness.dispatch(AppEvent::NoticeExpired { seq: 1 }).await;
    harness.dispatch(AppEvent::NoticeExpired { seq: 2 }).await;
    assert!(matches!(harness.next().await, AppEvent::NoticeCleared));
    assert!(harness.state.view.read().await.notice.is_none());
}
