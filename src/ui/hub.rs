use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};

use crate::app::{App, HUB_ITEMS, HubAction};
use crate::ui::components;

pub fn render_hub_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Tools
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    if let [header, body, footer] = &chunks[..] {
        components::render_header(f, *header, "Studio", "choose a tool");
        render_tool_list(f, app, *body);
        components::render_navigation_footer(
            f,
            *footer,
            app.router.screen().label(),
            &[("Enter", "open"), ("↑↓", "navigate"), ("Esc", "home")],
            app.status_toast_message(),
        );
    }
}

fn render_tool_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = HUB_ITEMS
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let selected = index == app.hub_selected_index;
            let badge = match item.action {
                HubAction::Tool(mode) => mode.label(),
                HubAction::Open(_) => "Guide",
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        if selected { " > " } else { "   " },
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(item.title, components::selection_style(selected)),
                    Span::raw("  "),
                    Span::styled(badge, Style::default().fg(Color::Blue)),
                ]),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.hub_selected_index));
    f.render_stateful_widget(
        List::new(items).block(components::panel("Tools")),
        area,
        &mut state,
    );
}
