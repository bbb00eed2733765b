//! State behind the multi-panel chat screen.
//!
//! Three panels each pick a space and chat with it; a broadcast input sends
//! one prompt to every space currently picked. Only one turn is in flight at a
//! time; the event loop runs it in the background and feeds [`TurnEvent`]s
//! back through [`App::handle_turn_event`].

use std::time::Instant;

use tracing::warn;

use crate::core::constants::PANEL_COUNT;
use crate::core::message::Message;
use crate::core::session::ChatSession;
use crate::core::spaces::SpaceId;
use crate::core::turn::{TurnEvent, TurnRequest, TurnTarget};
use crate::utils::logging::LoggingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Panel(usize),
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    InsertChar(char),
    Backspace,
    Submit,
    FocusNext,
    FocusPrevious,
    NextSpace,
    PreviousSpace,
    ScrollUp(u16),
    ScrollDown(u16),
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct PanelState {
    /// Index into the session's space directory.
    pub space_index: usize,
    pub input: String,
    /// Lines scrolled up from the bottom; 0 follows new messages.
    pub scroll_from_bottom: u16,
}

#[derive(Debug, Clone)]
pub struct InFlightTurn {
    pub current: Option<SpaceId>,
    pub started: Instant,
}

pub struct App {
    pub session: ChatSession,
    pub panels: Vec<PanelState>,
    pub broadcast_input: String,
    pub broadcast_scroll: u16,
    pub focus: Focus,
    pub in_flight: Option<InFlightTurn>,
    pub status: Option<String>,
    pub should_quit: bool,
    pub logging: LoggingState,
}

impl App {
    pub fn new(session: ChatSession, logging: LoggingState) -> Result<Self, String> {
        let space_count = session.directory().len();
        if space_count == 0 {
            return Err("No spaces configured".to_string());
        }

        let panels = (0..PANEL_COUNT)
            .map(|index| PanelState {
                space_index: index % space_count,
                ..PanelState::default()
            })
            .collect();

        let mut app = Self {
            session,
            panels,
            broadcast_input: String::new(),
            broadcast_scroll: 0,
            focus: Focus::Panel(0),
            in_flight: None,
            status: None,
            should_quit: false,
            logging,
        };
        for space in app.selected_spaces() {
            app.session.ensure_thread(space);
        }
        Ok(app)
    }

    pub fn panel_space(&self, panel: usize) -> SpaceId {
        panel_space_of(&self.session, &self.panels[panel])
    }

    /// Spaces picked in the panels, in panel order, without repeats.
    ///
    /// When two panels show the same space, a broadcast asks it once and the
    /// "Selected Projects" caption lists it once. Sending per panel would post
    /// the prompt twice into the one shared conversation.
    pub fn selected_spaces(&self) -> Vec<SpaceId> {
        let mut spaces = Vec::with_capacity(self.panels.len());
        for panel in 0..self.panels.len() {
            let space = self.panel_space(panel);
            if !spaces.contains(&space) {
                spaces.push(space);
            }
        }
        spaces
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn focused_input(&self) -> &str {
        match self.focus {
            Focus::Panel(panel) => &self.panels[panel].input,
            Focus::Broadcast => &self.broadcast_input,
        }
    }

    fn focused_input_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Panel(panel) => &mut self.panels[panel].input,
            Focus::Broadcast => &mut self.broadcast_input,
        }
    }

    fn focused_scroll_mut(&mut self) -> &mut u16 {
        match self.focus {
            Focus::Panel(panel) => &mut self.panels[panel].scroll_from_bottom,
            Focus::Broadcast => &mut self.broadcast_scroll,
        }
    }

    /// Apply a user action. Returns a turn to run when a prompt was accepted.
    pub fn apply(&mut self, action: AppAction) -> Option<TurnRequest> {
        match action {
            AppAction::InsertChar(ch) => self.focused_input_mut().push(ch),
            AppAction::Backspace => {
                self.focused_input_mut().pop();
            }
            AppAction::Submit => return self.submit(),
            AppAction::FocusNext => self.focus = self.cycle_focus(1),
            AppAction::FocusPrevious => self.focus = self.cycle_focus(self.panels.len()),
            AppAction::NextSpace => self.shift_space(1),
            AppAction::PreviousSpace => self.shift_space(-1),
            AppAction::ScrollUp(lines) => {
                let scroll = self.focused_scroll_mut();
                *scroll = scroll.saturating_add(lines);
            }
            AppAction::ScrollDown(lines) => {
                let scroll = self.focused_scroll_mut();
                *scroll = scroll.saturating_sub(lines);
            }
            AppAction::Quit => self.should_quit = true,
        }
        None
    }

    fn cycle_focus(&self, step: usize) -> Focus {
        // Panels 0..N then the broadcast input, N + 1 stops in total.
        let stops = self.panels.len() + 1;
        let current = match self.focus {
            Focus::Panel(panel) => panel,
            Focus::Broadcast => self.panels.len(),
        };
        let next = (current + step) % stops;
        if next == self.panels.len() {
            Focus::Broadcast
        } else {
            Focus::Panel(next)
        }
    }

    fn shift_space(&mut self, delta: isize) {
        let Focus::Panel(panel) = self.focus else {
            return;
        };
        let count = self.session.directory().len() as isize;
        let current = self.panels[panel].space_index as isize;
        let next = (current + delta).rem_euclid(count) as usize;
        self.panels[panel].space_index = next;
        self.panels[panel].scroll_from_bottom = 0;

        let space = self.panel_space(panel);
        self.session.ensure_thread(space);
    }

    fn submit(&mut self) -> Option<TurnRequest> {
        if self.is_busy() {
            self.status = Some("Still waiting for the previous response…".to_string());
            return None;
        }

        let prompt = self.focused_input().trim().to_string();
        if prompt.is_empty() {
            return None;
        }

        let spaces = match self.focus {
            Focus::Panel(panel) => vec![self.panel_space(panel)],
            Focus::Broadcast => self.selected_spaces(),
        };

        let mut targets = Vec::with_capacity(spaces.len());
        for &space in &spaces {
            self.session.push_user(space, prompt.clone());
            self.log(space, &Message::user(prompt.clone()));
            targets.push(TurnTarget {
                space,
                conversation_id: self.session.conversation_id(space).map(str::to_string),
            });
        }

        self.focused_input_mut().clear();
        *self.focused_scroll_mut() = 0;
        for panel in &mut self.panels {
            if spaces.contains(&panel_space_of(&self.session, panel)) {
                panel.scroll_from_bottom = 0;
            }
        }

        self.status = Some(match spaces.as_slice() {
            [space] => format!(
                "Generating response from {}…",
                self.session.display_name(*space)
            ),
            _ => format!("Asking {} spaces…", spaces.len()),
        });
        self.in_flight = Some(InFlightTurn {
            current: None,
            started: Instant::now(),
        });

        Some(TurnRequest { prompt, targets })
    }

    pub fn handle_turn_event(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::ConversationOpened {
                space,
                conversation_id,
            } => self.session.set_conversation_id(space, conversation_id),
            TurnEvent::Partial { space, text } => {
                self.mark_current(space);
                self.session.set_pending_reply(space, text);
            }
            TurnEvent::Replied { space, text } => {
                self.mark_current(space);
                self.log(space, &Message::assistant(text.clone()));
                self.session.push_reply(space, text);
            }
            TurnEvent::Failed { space, error } => {
                self.mark_current(space);
                let content = format!("Error: {error}");
                self.log(space, &Message::app_error(content.clone()));
                self.session.push_error(space, content);
            }
            TurnEvent::Finished => {
                self.in_flight = None;
                self.status = None;
            }
        }
    }

    fn mark_current(&mut self, space: SpaceId) {
        let name = self.session.display_name(space);
        if let Some(turn) = self.in_flight.as_mut() {
            if turn.current != Some(space) {
                turn.current = Some(space);
                self.status = Some(format!("Getting response from {name}…"));
            }
        }
    }

    fn log(&self, space: SpaceId, message: &Message) {
        let name = self.session.display_name(space);
        if let Err(err) = self.logging.log_message(&name, message) {
            warn!(error = %err, "failed to write transcript log");
        }
    }

    /// Close the session, consuming the app.
    pub fn close(self) {
        self.session.close();
    }
}

fn panel_space_of(session: &ChatSession, panel: &PanelState) -> SpaceId {
    let directory = session.directory();
    directory.entries()[panel.space_index % directory.len()].id
}
