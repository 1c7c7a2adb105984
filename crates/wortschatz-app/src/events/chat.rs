use std::sync::Arc;

use kanal::AsyncSender;
use wortschatz_gateway::ChatSession;
use wortschatz_types::{AppEvent, Role};

use crate::events::show_notice;
use crate::state::AppState;

pub async fn handle_send(
    state: &Arc<AppState>,
    session: &mut ChatSession,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    text: String,
) -> anyhow::Result<()> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Ok(());
    }

    // The user's message shows up immediately; a failed dispatch leaves it
    // in the transcript with no reply.
    let user_message = {
        let mut views = state.view.write().await;
        views.chat.pending = true;
        views.chat.append(Role::User, text.clone())
    };
    app_to_ui_tx.send(AppEvent::ChatAppended(user_message)).await?;

    let outcome = session.send(&text).await;

    match outcome {
        Ok(reply) => {
            let message = {
                let mut views = state.view.write().await;
                views.chat.pending = false;
                views.chat.append(Role::Assistant, reply)
            };
            app_to_ui_tx.send(AppEvent::ChatAppended(message)).await?;
        }
        Err(e) => {
            {
                let mut views = state.view.write().await;
                views.chat.pending = false;
            }
            tracing::info!("chat send failed: {e}");
            app_to_ui_tx.send(AppEvent::ChatFailed).await?;
            show_notice(
                state,
                loopback_tx,
                app_to_ui_tx,
                "The tutor can't be reached right now.",
            )
            .await?;
        }
    }

    Ok(())
}

pub async fn handle_clear(
    state: &Arc<AppState>,
    session: &mut ChatSession,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    session.reset();
    {
        let mut views = state.view.write().await;
        views.chat.transcript.clear();
        views.chat.pending = false;
    }
    app_to_ui_tx.send(AppEvent::ChatCleared).await?;
    show_notice(state, loopback_tx, app_to_ui_tx, "Chat cleared.").await
}
