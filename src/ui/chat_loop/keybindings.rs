//! Keyboard mapping for the chat screen.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::AppAction;

const PAGE_SCROLL_LINES: u16 = 10;

/// Translate a key press into an app action, if it has one.
pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => Some(AppAction::Quit),
        KeyCode::Char('n') if ctrl => Some(AppAction::NextSpace),
        KeyCode::Char('p') if ctrl => Some(AppAction::PreviousSpace),
        KeyCode::Right if ctrl => Some(AppAction::NextSpace),
        KeyCode::Left if ctrl => Some(AppAction::PreviousSpace),
        KeyCode::Tab => Some(AppAction::FocusNext),
        KeyCode::BackTab => Some(AppAction::FocusPrevious),
        KeyCode::Enter => Some(AppAction::Submit),
        KeyCode::Backspace => Some(AppAction::Backspace),
        KeyCode::Up => Some(AppAction::ScrollUp(1)),
        KeyCode::Down => Some(AppAction::ScrollDown(1)),
        KeyCode::PageUp => Some(AppAction::ScrollUp(PAGE_SCROLL_LINES)),
        KeyCode::PageDown => Some(AppAction::ScrollDown(PAGE_SCROLL_LINES)),
        KeyCode::Char(ch) if !ctrl && !alt => Some(AppAction::InsertChar(ch)),
        _ => None,
    }
}

/// Actions for pasted text; line breaks become spaces.
pub fn paste_actions(text: &str) -> Vec<AppAction> {
    text.chars()
        .filter(|ch| *ch != '\r')
        .map(|ch| {
            if ch == '\n' || ch == '\t' {
                AppAction::InsertChar(' ')
            } else {
                AppAction::InsertChar(ch)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_keys_map_to_navigation() {
        let cases = [
            (key(KeyCode::Char('c'), KeyModifiers::CONTROL), AppAction::Quit),
            (key(KeyCode::Right, KeyModifiers::CONTROL), AppAction::NextSpace),
            (key(KeyCode::Left, KeyModifiers::CONTROL), AppAction::PreviousSpace),
            (key(KeyCode::Char('n'), KeyModifiers::CONTROL), AppAction::NextSpace),
            (key(KeyCode::Char('p'), KeyModifiers::CONTROL), AppAction::PreviousSpace),
            (key(KeyCode::Tab, KeyModifiers::NONE), AppAction::FocusNext),
            (key(KeyCode::BackTab, KeyModifiers::SHIFT), AppAction::FocusPrevious),
            (key(KeyCode::PageUp, KeyModifiers::NONE), AppAction::ScrollUp(10)),
            (key(KeyCode::Down, KeyModifiers::NONE), AppAction::ScrollDown(1)),
        ];
        for (event, expected) in cases {
            assert_eq!(map_key_event(event), Some(expected), "key {event:?}");
        }
    }

    #[test]
    fn plain_characters_are_inserted() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Some(AppAction::InsertChar('x'))
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(AppAction::InsertChar('X'))
        );
    }

    #[test]
    fn unbound_chords_are_ignored() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(map_key_event(key(KeyCode::Left, KeyModifiers::NONE)), None);
        assert_eq!(map_key_event(key(KeyCode::Esc, KeyModifiers::NONE)), None);
    }

    #[test]
    fn pasted_newlines_become_spaces() {
        assert_eq!(
            paste_actions("a\r\nb"),
            vec![
                AppAction::InsertChar('a'),
                AppAction::InsertChar(' '),
                AppAction::InsertChar('b')
            ]
        );
    }
}
