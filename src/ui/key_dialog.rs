use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};

use crate::app::App;
use crate::ui::{components, utils};

/// Modal for entering or replacing the API key
pub fn render_key_dialog(f: &mut Frame, app: &App) {
    let area = utils::centered_fixed(64, 12, f.area());
    f.render_widget(Clear, area);

    let title = if app.pending_key_request.is_some() {
        "Select an API key to continue"
    } else {
        "API key"
    };
    let block = components::panel(title).border_style(Style::default().fg(Color::Magenta));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3), Constraint::Length(1)])
        .split(inner);
    let [help, input, keys] = &chunks[..] else {
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        "Paste a Gemini API key. It is stored in config.toml.",
        Style::default().fg(Color::White),
    ))];
    if app.pending_key_request.is_some() {
        lines.push(Line::from(Span::styled(
            "The service could not find the requested model for the current key.",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "API_KEY and GEMINI_API_KEY take precedence when set.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), *help);

    let masked = mask(app.key_input.content());
    components::render_text_input(
        f,
        *input,
        components::TextInputConfig::new(&masked, " Key ")
            .with_placeholder("AIza...")
            .with_cursor_position(app.key_input.cursor_position()),
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " Enter save   Esc dismiss",
            Style::default().fg(Color::DarkGray),
        ))),
        *keys,
    );
}

/// Keeps the last four characters readable.
fn mask(key: &str) -> String {
    let count = key.chars().count();
    key.chars()
        .enumerate()
        .map(|(index, character)| if index + 4 < count { '•' } else { character })
        .collect()
}
