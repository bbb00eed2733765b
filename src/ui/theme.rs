use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub pending_text_style: Style,
    pub error_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub caption_style: Style,
    pub border_style: Style,
    pub focused_border_style: Style,
    pub busy_indicator_style: Style,

    // Input area
    pub input_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            pending_text_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            error_text_style: Style::default().fg(Color::LightRed),

            title_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            caption_style: Style::default().fg(Color::DarkGray),
            border_style: Style::default().fg(Color::DarkGray),
            focused_border_style: Style::default().fg(Color::Cyan),
            busy_indicator_style: Style::default().fg(Color::Yellow),

            input_text_style: Style::default().fg(Color::White),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
