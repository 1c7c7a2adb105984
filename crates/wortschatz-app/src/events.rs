use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use wortschatz_gateway::{ChatSession, TutorBackend};
use wortschatz_store::WordStore;
use wortschatz_types::AppEvent;

use crate::state::AppState;

pub mod chat;
pub mod check_sentence;
pub mod save_word;
pub mod search;
pub mod speak;

/// App's main loop. Sole owner of the word store and the chat session;
/// every mutation of view state happens on this task.
pub async fn event_loop(
    state: Arc<AppState>,
    mut store: WordStore,
    backend: Arc<dyn TutorBackend>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    loopback_tx: AsyncSender<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let display_language = {
        let config = state.config.read().await;
        config.gateway.display_language.clone()
    };
    let mut session = ChatSession::create(backend.clone(), &display_language);

    app_to_ui_tx.send(AppEvent::BackendReady).await?;
    app_to_ui_tx
        .send(AppEvent::WordsChanged(store.words().to_vec()))
        .await?;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => event?,
        };

        handle_event(
            &state,
            &mut store,
            &mut session,
            &backend,
            &loopback_tx,
            &app_to_ui_tx,
            event,
        )
        .await?;
    }

    tracing::info!("event loop stopping");
    Ok(())
}

async fn handle_event(
    state: &Arc<AppState>,
    store: &mut WordStore,
    session: &mut ChatSession,
    backend: &Arc<dyn TutorBackend>,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::SwitchView(view) => {
            {
                let mut views = state.view.write().await;
                views.active = view;
            }
            app_to_ui_tx.send(AppEvent::ViewChanged(view)).await?;
        }
        AppEvent::Search(term) => {
            search::handle_search(state, backend, loopback_tx, app_to_ui_tx, term).await?;
        }
        AppEvent::ImageFetched { lookup, bytes } => {
            search::handle_image_fetched(state, app_to_ui_tx, lookup, bytes).await?;
        }
        AppEvent::SaveCurrentWord => {
            save_word::handle_save(state, store, loopback_tx, app_to_ui_tx).await?;
        }
        AppEvent::DeleteWord(id) => {
            save_word::handle_delete(state, store, loopback_tx, app_to_ui_tx, &id).await?;
        }
        AppEvent::CheckSentence(text) => {
            check_sentence::handle_check(state, backend, loopback_tx, app_to_ui_tx, text).await?;
        }
        AppEvent::ChatSend(text) => {
            chat::handle_send(state, session, loopback_tx, app_to_ui_tx, text).await?;
        }
        AppEvent::ChatClear => {
            chat::handle_clear(state, session, loopback_tx, app_to_ui_tx).await?;
        }
        AppEvent::Speak(text) => {
            speak::handle_speak(backend, app_to_ui_tx, text).await?;
        }
        AppEvent::NoticeExpired { seq } => {
            let cleared = {
                let mut views = state.view.write().await;
                views.clear_notice_if(seq)
            };
            if cleared {
                app_to_ui_tx.send(AppEvent::NoticeCleared).await?;
            }
        }
        // UI-bound events, nothing to do in the app loop
        _ => {}
    }

    Ok(())
}

/// Publish a transient notification, replacing any current one, and
/// schedule its expiry.
pub(crate) async fn show_notice(
    state: &Arc<AppState>,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    text: impl Into<String>,
) -> anyhow::Result<()> {
    let text = text.into();

    let ttl = {
        let config = state.config.read().await;
        Duration::from_millis(config.ui.notice_ttl_ms)
    };
    let seq = {
        let mut views = state.view.write().await;
        views.begin_notice(text.clone())
    };

    app_to_ui_tx.send(AppEvent::Notice(text)).await?;

    let tx = loopback_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        let _ = tx.send(AppEvent::NoticeExpired { seq }).await;
    });

    Ok(())
}
