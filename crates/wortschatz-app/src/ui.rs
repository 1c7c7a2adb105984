//! Line-oriented terminal front end. Presentation only: every state
//! transition lives behind the event channel, none here.

use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use wortschatz_config::Config;
use wortschatz_types::{AppEvent, Role, SavedWord, View, WordEntry};

/// Mirror of what is currently on screen; updated only from app events.
#[derive(Default)]
struct Screen {
    active: View,
    notebook: Vec<SavedWord>,
}

enum Command {
    Dispatch(AppEvent),
    Help,
    Quit,
    Nothing,
}

pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    config: Arc<RwLock<Config>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut screen = Screen::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => {
                render(&mut screen, event?, &config).await;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&screen, line.trim()) {
                    Command::Dispatch(event) => ui_to_app_tx.send(event).await?,
                    Command::Help => print_help(),
                    Command::Quit => break,
                    Command::Nothing => {}
                }
            }
        }
    }

    tracing::info!("ui loop stopping");
    Ok(())
}

fn parse_command(screen: &Screen, line: &str) -> Command {
    if line.is_empty() {
        return Command::Nothing;
    }

    if let Some(rest) = line.strip_prefix('/') {
        let (verb, arg) = match rest.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (rest, ""),
        };

        return match verb {
            "search" => Command::Dispatch(AppEvent::SwitchView(View::Search)),
            "notebook" => Command::Dispatch(AppEvent::SwitchView(View::Notebook)),
            "check" => Command::Dispatch(AppEvent::SwitchView(View::Checker)),
            "chat" => Command::Dispatch(AppEvent::SwitchView(View::Assistant)),
            "save" => Command::Dispatch(AppEvent::SaveCurrentWord),
            "delete" if !arg.is_empty() => {
                // accept either a notebook position or a full id
                let id = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| screen.notebook.get(n.saturating_sub(1)))
                    .map(|w| w.id.clone())
                    .unwrap_or_else(|| arg.to_string());
                Command::Dispatch(AppEvent::DeleteWord(id))
            }
            "clear" => Command::Dispatch(AppEvent::ChatClear),
            "say" if !arg.is_empty() => Command::Dispatch(AppEvent::Speak(arg.to_string())),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => {
                println!("unknown command: /{verb} (try /help)");
                Command::Nothing
            }
        };
    }

    // Plain text goes to whichever view is active.
    match screen.active {
        View::Search => Command::Dispatch(AppEvent::Search(line.to_string())),
        View::Checker => Command::Dispatch(AppEvent::CheckSentence(line.to_string())),
        View::Assistant => Command::Dispatch(AppEvent::ChatSend(line.to_string())),
        View::Notebook => {
            println!("the notebook is read-only; /delete <n> removes an entry");
            Command::Nothing
        }
    }
}

async fn render(screen: &mut Screen, event: AppEvent, config: &Arc<RwLock<Config>>) {
    match event {
        AppEvent::BackendReady => {
            println!("wortschatz - your German tutor. /help for commands.");
            let suggested = {
                let config = config.read().await;
                config.ui.suggested_words.join(", ")
            };
            if !suggested.is_empty() {
                println!("popular right now: {suggested}");
            }
        }
        AppEvent::ViewChanged(view) => {
            screen.active = view;
            println!("— {} —", view.label());
            if view == View::Notebook {
                render_notebook(&screen.notebook);
            }
        }
        AppEvent::WordReady(entry) => render_entry(&entry),
        AppEvent::WordImageReady(bytes) => {
            println!("[illustration ready, {} bytes]", bytes.len());
        }
        AppEvent::WordsChanged(words) => {
            screen.notebook = words;
            if screen.active == View::Notebook {
                render_notebook(&screen.notebook);
            }
        }
        AppEvent::AnalysisReady(analysis) => {
            let verdict = if analysis.is_correct {
                "correct"
            } else {
                "needs correction"
            };
            println!("{verdict} (score {:.0}/100)", analysis.score);
            println!("  corrected: {}", analysis.corrected);
            println!("  meaning:   {}", analysis.meaning);
            println!("  {}", analysis.explanation);
        }
        AppEvent::ChatAppended(message) => {
            let speaker = match message.role {
                Role::User => "you",
                Role::Assistant => "tutor",
            };
            println!("{speaker}: {}", message.text);
        }
        AppEvent::ChatFailed => {
            println!("tutor: (no reply; the message was not delivered)");
        }
        AppEvent::ChatCleared => {
            println!("(chat cleared)");
        }
        AppEvent::SpeechReady(bytes) => {
            // playback is out of scope; acknowledge the audio arrived
            println!("[audio ready, {} bytes]", bytes.len());
        }
        AppEvent::Notice(text) => println!("* {text}"),
        AppEvent::NoticeCleared => {}
        // app-bound events, nothing to render
        _ => {}
    }
}

fn render_entry(entry: &WordEntry) {
    let headline = match entry.article {
        Some(article) => format!("{article} {}", entry.word),
        None => entry.word.clone(),
    };
    println!("{headline}  [{}]", entry.part_of_speech);
    println!("  {} / {}", entry.meaning_primary, entry.meaning_secondary);
    println!(
        "  forms:    {} ({})",
        entry.plural_or_conjugation, entry.plural_or_conjugation_meaning
    );
    println!("  synonym:  {} ({})", entry.synonym, entry.synonym_meaning);
    println!("  example:  {}", entry.example_sentence);
    println!("            {}", entry.example_sentence_translated);
    println!("  /save to keep it, /say {} to hear it", entry.word);
}

fn render_notebook(words: &[SavedWord]) {
    if words.is_empty() {
        println!("your notebook is empty; look up a word and /save it");
        return;
    }
    println!("{} saved word(s):", words.len());
    for (i, word) in words.iter().enumerate() {
        let article = word
            .entry
            .article
            .map(|a| format!("{a} "))
            .unwrap_or_default();
        println!(
            "  {:>2}. {article}{} : {}",
            i + 1,
            word.entry.word,
            word.entry.meaning_primary
        );
    }
}

fn print_help() {
    println!("/search /notebook /check /chat   switch view");
    println!("/save                            save the displayed word");
    println!("/delete <n>                      remove notebook entry");
    println!("/say <text>                      speak a German text");
    println!("/clear                           start a fresh chat");
    println!("/quit                            leave");
    println!("plain text is sent to the active view");
}
