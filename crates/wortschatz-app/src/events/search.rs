use std::sync::Arc;

use kanal::AsyncSender;
use wortschatz_gateway::TutorBackend;
use wortschatz_types::AppEvent;

use crate::events::show_notice;
use crate::state::AppState;

pub async fn handle_search(
    state: &Arc<AppState>,
    backend: &Arc<dyn TutorBackend>,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    term: String,
) -> anyhow::Result<()> {
    let term = term.trim().to_string();
    if term.is_empty() {
        return Ok(());
    }

    let lookup = {
        let mut views = state.view.write().await;
        views.search.result = None;
        views.search.image = None;
        views.search.pending = true;
        views.search.lookup_seq += 1;
        views.search.lookup_seq
    };

    let outcome = backend.lookup_word(&term).await;

    match outcome {
        Ok(entry) => {
            {
                let mut views = state.view.write().await;
                views.search.pending = false;
                views.search.result = Some(entry.clone());
            }
            app_to_ui_tx.send(AppEvent::WordReady(entry.clone())).await?;

            // Illustration is fetched off the loop; the result is tagged with
            // the lookup it belongs to so a late arrival for an abandoned
            // lookup can be discarded.
            let backend = backend.clone();
            let tx = loopback_tx.clone();
            tokio::spawn(async move {
                let bytes = backend.synthesize_image(&entry.image_prompt).await;
                let _ = tx.send(AppEvent::ImageFetched { lookup, bytes }).await;
            });
        }
        Err(e) => {
            {
                let mut views = state.view.write().await;
                views.search.pending = false;
            }
            tracing::info!("lookup for \"{term}\" failed: {e}");
            show_notice(
                state,
                loopback_tx,
                app_to_ui_tx,
                "Sorry, nothing was found for that word.",
            )
            .await?;
        }
    }

    Ok(())
}

pub async fn handle_image_fetched(
    state: &Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    lookup: u64,
    bytes: Option<Vec<u8>>,
) -> anyhow::Result<()> {
    // Synthesis failure is "no image", handled by omission.
    let Some(bytes) = bytes else {
        return Ok(());
    };

    {
        let mut views = state.view.write().await;
        if views.search.lookup_seq != lookup || views.search.result.is_none() {
            tracing::debug!("discarding image for superseded lookup {lookup}");
            return Ok(());
        }
        views.search.image = Some(bytes.clone());
    }

    app_to_ui_tx.send(AppEvent::WordImageReady(bytes)).await?;
    Ok(())
}
