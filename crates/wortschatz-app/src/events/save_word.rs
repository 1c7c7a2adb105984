use std::sync::Arc;

use kanal::AsyncSender;
use wortschatz_store::{StoreError, WordStore};
use wortschatz_types::AppEvent;

use crate::events::show_notice;
use crate::state::AppState;

pub async fn handle_save(
    state: &Arc<AppState>,
    store: &mut WordStore,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let entry = {
        let views = state.view.read().await;
        views.search.result.clone()
    };
    let Some(entry) = entry else {
        return show_notice(
            state,
            loopback_tx,
            app_to_ui_tx,
            "Look up a word before saving it.",
        )
        .await;
    };

    match store.add(entry) {
        Ok(saved) => {
            tracing::info!(word = %saved.entry.word, id = %saved.id, "word saved");
            app_to_ui_tx
                .send(AppEvent::WordsChanged(store.words().to_vec()))
                .await?;
            show_notice(state, loopback_tx, app_to_ui_tx, "Saved to your notebook!").await
        }
        Err(StoreError::Duplicate { .. }) => {
            show_notice(
                state,
                loopback_tx,
                app_to_ui_tx,
                "That word is already in your notebook.",
            )
            .await
        }
        Err(e) => {
            // The in-memory notebook keeps the word for this session even
            // though the write failed; the user has to know it is not durable.
            tracing::error!("could not persist the notebook: {e}");
            app_to_ui_tx
                .send(AppEvent::WordsChanged(store.words().to_vec()))
                .await?;
            show_notice(
                state,
                loopback_tx,
                app_to_ui_tx,
                "Saved for this session, but writing the notebook failed.",
            )
            .await
        }
    }
}

pub async fn handle_delete(
    state: &Arc<AppState>,
    store: &mut WordStore,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    id: &str,
) -> anyhow::Result<()> {
    match store.remove(id) {
        Ok(()) => {
            app_to_ui_tx
                .send(AppEvent::WordsChanged(store.words().to_vec()))
                .await?;
            show_notice(state, loopback_tx, app_to_ui_tx, "Removed from your notebook.").await
        }
        Err(e) => {
            tracing::error!("could not persist the notebook: {e}");
            app_to_ui_tx
                .send(AppEvent::WordsChanged(store.words().to_vec()))
                .await?;
            show_notice(
                state,
                loopback_tx,
                app_to_ui_tx,
                "Removed for this session, but writing the notebook failed.",
            )
            .await
        }
    }
}
