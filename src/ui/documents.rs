use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, DOCUMENTS};
use crate::ui::components;

pub fn render_documents_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    if let [header, body, footer] = &chunks[..] {
        let detail = app
            .selected_document()
            .map_or("", |document| document.summary);
        components::render_header(f, *header, "Documents", detail);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(*body);
        if let [list, reader] = &columns[..] {
            render_document_list(f, app, *list);
            render_document_body(f, app, *reader);
        }

        components::render_navigation_footer(
            f,
            *footer,
            app.router.screen().label(),
            &[
                ("↑↓", "document"),
                ("PgUp/PgDn", "scroll"),
                ("i/v", "image/video"),
                ("s", "studio"),
                ("Esc", "home"),
            ],
            app.status_toast_message(),
        );
    }
}

fn render_document_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = DOCUMENTS
        .iter()
        .enumerate()
        .map(|(index, document)| {
            let selected = index == app.document_selected_index;
            ListItem::new(Line::from(Span::styled(
                format!(" {} ", document.title),
                components::selection_style(selected),
            )))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.document_selected_index));
    f.render_stateful_widget(
        List::new(items).block(components::panel("Guides")),
        area,
        &mut state,
    );
}

fn render_document_body(f: &mut Frame, app: &App, area: Rect) {
    let Some(document) = app.selected_document() else {
        return;
    };
    let lines: Vec<Line> = document
        .text()
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(Color::White))))
        .collect();

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.document_scroll, 0))
            .block(components::panel(document.title)),
        area,
    );
}
