//! Main chat event loop.
//!
//! Terminal input is read on a background task and forwarded over a channel.
//! Accepted prompts run as a background turn whose [`TurnEvent`]s come back
//! on a second channel; the loop applies both to the [`App`] and redraws.

mod keybindings;
mod lifecycle;

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::client::{ConversationApi, SlangitClient};
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::credentials::ApiCredentials;
use crate::core::session::ChatSession;
use crate::core::turn::{run_turn, TurnEvent, TurnRequest};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;

pub use self::keybindings::map_key_event;
use self::keybindings::paste_actions;
use self::lifecycle::{restore_terminal, setup_terminal};

/// Redraw interval while idle, so the busy indicator keeps moving.
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(
    event_tx: mpsc::UnboundedSender<UiEvent>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while !cancel_token.is_cancelled() {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Run one turn in the background; cancelling the token abandons it.
pub fn spawn_turn(
    api: Arc<dyn ConversationApi>,
    request: TurnRequest,
    turn_tx: mpsc::UnboundedSender<TurnEvent>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                debug!("turn cancelled");
            }
            _ = run_turn(api.as_ref(), request, &turn_tx) => {}
        }
    })
}

/// Apply a terminal event to the app. Returns a turn when one was accepted.
pub fn dispatch_ui_event(app: &mut App, event: UiEvent) -> Option<TurnRequest> {
    match event {
        UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            map_key_event(key).and_then(|action| app.apply(action))
        }
        UiEvent::Crossterm(Event::Paste(text)) => {
            for action in paste_actions(&text) {
                app.apply(action);
            }
            None
        }
        _ => None,
    }
}

pub async fn run_chat(
    config: Config,
    credentials: ApiCredentials,
    log: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let api: Arc<dyn ConversationApi> =
        Arc::new(SlangitClient::new(credentials).with_language(config.language()));
    let logging = LoggingState::new(log)?;
    let session = ChatSession::start(config.space_directory());
    let mut app = App::new(session, logging)?;
    let theme = Theme::default();

    let mut terminal = setup_terminal()?;
    let cancel_token = CancellationToken::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx, cancel_token.clone());
    let (turn_tx, mut turn_rx) = mpsc::unbounded_channel::<TurnEvent>();

    let result: Result<(), Box<dyn Error>> = loop {
        if app.should_quit {
            break Ok(());
        }

        if let Err(err) = terminal.draw(|f| ui(f, &app, &theme)) {
            break Err(err.into());
        }

        tokio::select! {
            Some(ui_event) = event_rx.recv() => {
                if let Some(request) = dispatch_ui_event(&mut app, ui_event) {
                    info!(targets = request.targets.len(), "starting turn");
                    spawn_turn(api.clone(), request, turn_tx.clone(), cancel_token.clone());
                }
            }
            Some(turn_event) = turn_rx.recv() => {
                app.handle_turn_event(turn_event);
                while let Ok(turn_event) = turn_rx.try_recv() {
                    app.handle_turn_event(turn_event);
                }
            }
            _ = tokio::time::sleep(TICK) => {}
        }
    };

    cancel_token.cancel();
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    app.close();

    result
}
