use std::sync::Arc;

use kanal::AsyncSender;
use wortschatz_gateway::TutorBackend;
use wortschatz_types::AppEvent;

/// Best-effort: no bytes means no event, never a notice.
pub async fn handle_speak(
    backend: &Arc<dyn TutorBackend>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    text: String,
) -> anyhow::Result<()> {
    let Some(bytes) = backend.synthesize_speech(&text).await else {
        return Ok(());
    };
    app_to_ui_tx.send(AppEvent::SpeechReady(bytes)).await?;
    Ok(())
}
