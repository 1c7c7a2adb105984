use std::sync::Arc;

use kanal::AsyncSender;
use wortschatz_gateway::TutorBackend;
use wortschatz_types::AppEvent;

use crate::events::show_notice;
use crate::state::AppState;

pub async fn handle_check(
    state: &Arc<AppState>,
    backend: &Arc<dyn TutorBackend>,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    text: String,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    {
        let mut views = state.view.write().await;
        views.checker.pending = true;
    }

    let outcome = backend.check_sentence(&text).await;

    match outcome {
        Ok(analysis) => {
            {
                let mut views = state.view.write().await;
                views.checker.pending = false;
                views.checker.result = Some(analysis.clone());
            }
            app_to_ui_tx.send(AppEvent::AnalysisReady(analysis)).await?;
        }
        Err(e) => {
            {
                let mut views = state.view.write().await;
                views.checker.pending = false;
            }
            tracing::info!("sentence check failed: {e}");
            show_notice(state, loopback_tx, app_to_ui_tx, "The check didn't go through.").await?;
        }
    }

    Ok(())
}
