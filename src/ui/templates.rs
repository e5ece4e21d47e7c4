use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, templates_for};
use crate::ui::components;

pub fn render_templates_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Catalog and preview
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let [header, body, footer] = &chunks[..] else {
        return;
    };

    let filter = match app.template_filter {
        None => "all templates".to_string(),
        Some(mode) => format!("{} only", mode),
    };
    components::render_header(f, *header, "Templates", &filter);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(*body);
    if let [list, preview] = &columns[..] {
        render_template_list(f, app, *list);
        render_template_preview(f, app, *preview);
    }

    components::render_navigation_footer(
        f,
        *footer,
        app.router.screen().label(),
        &[
            ("Enter", "use"),
            ("Tab", "filter"),
            ("i/v", "image/video"),
            ("s", "studio"),
            ("↑↓", "navigate"),
            ("Esc", "home"),
        ],
        app.status_toast_message(),
    );
}

fn render_template_list(f: &mut Frame, app: &App, area: Rect) {
    let templates = templates_for(app.template_filter);
    let items: Vec<ListItem> = templates
        .iter()
        .enumerate()
        .map(|(index, template)| {
            let selected = index == app.template_selected_index;
            ListItem::new(Line::from(vec![
                Span::styled(
                    if selected { " > " } else { "   " },
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(template.title, components::selection_style(selected)),
                Span::raw("  "),
                Span::styled(
                    format!("{} · {}", template.category, template.mode.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if !templates.is_empty() {
        state.select(Some(app.template_selected_index.min(templates.len() - 1)));
    }
    f.render_stateful_widget(
        List::new(items).block(components::panel("Catalog")),
        area,
        &mut state,
    );
}

fn render_template_preview(f: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected_template() {
        Some(template) => vec![
            Line::from(Span::styled(
                template.title,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} {}", template.category, template.mode.label()),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                template.prompt,
                Style::default().fg(Color::White),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "No templates match this filter.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(components::panel("Prompt")),
        area,
    );
}
