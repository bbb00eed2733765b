use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::app::{App, Focus};
use crate::core::message::TranscriptRole;
use crate::core::session::ChatSession;
use crate::core::spaces::SpaceId;
use crate::ui::theme::Theme;

const HELP_TEXT: &str =
    "Tab: next panel • Ctrl+←/→: change project • Enter: send • PgUp/PgDn: scroll • Ctrl+C: quit";

pub fn ui(f: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + caption
            Constraint::Min(8),    // panels
            Constraint::Length(4), // broadcast
            Constraint::Length(1), // status
        ])
        .split(f.area());

    render_header(f, app, theme, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, app.panels.len() as u32);
            app.panels.len()
        ])
        .split(chunks[1]);
    for (panel, area) in columns.iter().enumerate() {
        render_panel(f, app, theme, panel, *area);
    }

    render_broadcast(f, app, theme, chunks[2]);
    render_status(f, app, theme, chunks[3]);
}

fn render_header(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            format!(
                "💬 Slangit Multi-Space Chat v{} • Logging: {}",
                env!("CARGO_PKG_VERSION"),
                app.logging.get_status_string()
            ),
            theme.title_style,
        )),
        Line::from(Span::styled(
            "🚀 Chat with multiple Slangit spaces simultaneously",
            theme.caption_style,
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn border_style(theme: &Theme, focused: bool) -> Style {
    if focused {
        theme.focused_border_style
    } else {
        theme.border_style
    }
}

fn render_panel(f: &mut Frame, app: &App, theme: &Theme, panel: usize, area: Rect) {
    let focused = app.focus == Focus::Panel(panel);
    let space = app.panel_space(panel);
    let name = app.session.display_name(space);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let selector = Paragraph::new(Line::from(format!("◀ {name} ▶"))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(theme, focused))
            .title("Select Project"),
    );
    f.render_widget(selector, rows[0]);

    let inner_width = rows[1].width.saturating_sub(2);
    let inner_height = rows[1].height.saturating_sub(2);
    // Wrapped here so the row count used for scrolling is the one drawn.
    let lines = prewrap_lines(
        &build_transcript_lines(&app.session, space, theme),
        inner_width,
    );
    let total_rows = lines.len().min(u16::MAX as usize) as u16;
    let offset = scroll_offset(
        total_rows,
        inner_height,
        app.panels[panel].scroll_from_bottom,
    );
    let transcript = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(theme, focused))
                .title(name.clone()),
        )
        .scroll((offset, 0));
    f.render_widget(transcript, rows[1]);

    render_input(
        f,
        theme,
        &app.panels[panel].input,
        &format!("Chat with {name}"),
        focused,
        rows[2],
    );
}

fn render_broadcast(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let focused = app.focus == Focus::Broadcast;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3)])
        .split(area);

    let names: Vec<String> = app
        .selected_spaces()
        .into_iter()
        .map(|space| app.session.display_name(space))
        .collect();
    let caption = Paragraph::new(Line::from(Span::styled(
        format!("Selected Projects: {}", names.join(", ")),
        theme.caption_style,
    )));
    f.render_widget(caption, rows[0]);

    render_input(
        f,
        theme,
        &app.broadcast_input,
        "💬 Ask all selected spaces",
        focused,
        rows[1],
    );
}

fn render_input(f: &mut Frame, theme: &Theme, input: &str, title: &str, focused: bool, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    // Leave one cell for the cursor.
    let visible = visible_tail(input, inner_width.saturating_sub(1));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        visible.to_string(),
        theme.input_text_style,
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(theme, focused))
            .title(title.to_string()),
    );
    f.render_widget(paragraph, area);

    if focused && area.width > 2 && area.height > 2 {
        let x = area.x + 1 + visible.width() as u16;
        f.set_cursor_position((x, area.y + 1));
    }
}

fn render_status(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let line = match (&app.in_flight, &app.status) {
        (Some(turn), status) => {
            let elapsed = turn.started.elapsed();
            let symbol = match (elapsed.as_millis() / 250) % 4 {
                0 => "○",
                1 => "◔",
                2 => "◑",
                _ => "●",
            };
            Line::from(vec![
                Span::styled(format!("{symbol} "), theme.busy_indicator_style),
                Span::raw(status.clone().unwrap_or_default()),
                Span::styled(
                    format!(" ({}s)", elapsed.as_secs()),
                    theme.caption_style,
                ),
            ])
        }
        (None, Some(status)) => Line::from(Span::raw(status.clone())),
        (None, None) => Line::from(Span::styled(HELP_TEXT, theme.caption_style)),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Lines for one space's transcript, including a streaming preview.
pub fn build_transcript_lines(
    session: &ChatSession,
    space: SpaceId,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in session.transcript(space) {
        match message.role {
            TranscriptRole::User => {
                let mut content_lines = message.content.lines();
                lines.push(Line::from(vec![
                    Span::styled("You: ", theme.user_prefix_style),
                    Span::styled(
                        content_lines.next().unwrap_or_default().to_string(),
                        theme.user_text_style,
                    ),
                ]));
                for line in content_lines {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        theme.user_text_style,
                    )));
                }
            }
            TranscriptRole::Assistant => {
                push_styled_lines(&mut lines, &message.content, theme.assistant_text_style)
            }
            TranscriptRole::AppError => {
                push_styled_lines(&mut lines, &message.content, theme.error_text_style)
            }
        }
        lines.push(Line::from(""));
    }

    if let Some(pending) = session.pending_reply(space) {
        push_styled_lines(&mut lines, &format!("{pending} …"), theme.pending_text_style);
    }

    lines
}

fn push_styled_lines(lines: &mut Vec<Line<'static>>, content: &str, style: Style) {
    if content.is_empty() {
        lines.push(Line::from(Span::styled(String::new(), style)));
        return;
    }
    for line in content.lines() {
        lines.push(Line::from(Span::styled(line.to_string(), style)));
    }
}

/// Wrap lines to `width` columns at spaces. A word wider than a row is
/// broken across rows. Span styles carry over to the wrapped rows.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let cells: Vec<(char, Style)> = line
            .spans
            .iter()
            .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
            .collect();
        if width == 0 {
            let mut row = RowBuilder::default();
            for &(ch, style) in &cells {
                row.push(ch, style);
            }
            row.emit(&mut out);
            continue;
        }
        wrap_cells(&cells, width, &mut out);
    }
    out
}

fn wrap_cells(cells: &[(char, Style)], width: usize, out: &mut Vec<Line<'static>>) {
    let first_row = out.len();
    let mut row = RowBuilder::default();
    let mut index = 0;

    while index < cells.len() {
        let gap_start = index;
        while index < cells.len() && cells[index].0 == ' ' {
            index += 1;
        }
        let word_start = index;
        while index < cells.len() && cells[index].0 != ' ' {
            index += 1;
        }
        let gap = &cells[gap_start..word_start];
        let word = &cells[word_start..index];

        if row.width + cells_width(gap) + cells_width(word) <= width {
            row.extend(gap);
            row.extend(word);
        } else if row.is_empty() {
            // Leading indentation is kept, even when it has to break.
            row.extend_breaking(gap, width, out);
            row.place_word(word, width, out);
        } else {
            // The gap at a row break is dropped.
            row.emit(out);
            row.place_word(word, width, out);
        }
    }

    if !row.is_empty() || out.len() == first_row {
        row.emit(out);
    }
}

fn cells_width(cells: &[(char, Style)]) -> usize {
    cells.iter().map(|(ch, _)| ch.width().unwrap_or(0)).sum()
}

#[derive(Default)]
struct RowBuilder {
    spans: Vec<Span<'static>>,
    width: usize,
}

impl RowBuilder {
    fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    fn push(&mut self, ch: char, style: Style) {
        self.width += ch.width().unwrap_or(0);
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push(ch),
            _ => self.spans.push(Span::styled(ch.to_string(), style)),
        }
    }

    fn extend(&mut self, cells: &[(char, Style)]) {
        for &(ch, style) in cells {
            self.push(ch, style);
        }
    }

    fn extend_breaking(
        &mut self,
        cells: &[(char, Style)],
        width: usize,
        out: &mut Vec<Line<'static>>,
    ) {
        for &(ch, style) in cells {
            if !self.is_empty() && self.width + ch.width().unwrap_or(0) > width {
                self.emit(out);
            }
            self.push(ch, style);
        }
    }

    fn place_word(
        &mut self,
        word: &[(char, Style)],
        width: usize,
        out: &mut Vec<Line<'static>>,
    ) {
        let word_width = cells_width(word);
        if self.width + word_width <= width {
            self.extend(word);
        } else if word_width <= width {
            self.emit(out);
            self.extend(word);
        } else {
            self.extend_breaking(word, width, out);
        }
    }

    fn emit(&mut self, out: &mut Vec<Line<'static>>) {
        out.push(Line::from(std::mem::take(&mut self.spans)));
        self.width = 0;
    }
}

/// Top offset that shows the bottom of the content, moved up by `from_bottom`.
pub fn scroll_offset(total_rows: u16, visible_rows: u16, from_bottom: u16) -> u16 {
    total_rows
        .saturating_sub(visible_rows)
        .saturating_sub(from_bottom)
}

/// Longest suffix of `input` that fits in `width` columns.
pub fn visible_tail(input: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = input.len();
    for (index, ch) in input.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = index;
    }
    &input[start..]
}
