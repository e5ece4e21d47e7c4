use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, LANDING_BLOCKS, LANDING_NAV};
use crate::ui::components;

pub fn render_landing_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Navigation bar
            Constraint::Min(0),    // Page
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    if let [nav, page, footer] = &chunks[..] {
        render_landing_nav(f, app, *nav);
        render_landing_page(f, app, *page);
        components::render_navigation_footer(
            f,
            *footer,
            app.router.screen().label(),
            &[
                ("Enter", "get started"),
                ("←→", "menu"),
                ("Space", "open"),
                ("↑↓", "scroll"),
                ("^K", "api key"),
                ("^C", "quit"),
            ],
            app.status_toast_message(),
        );
    }
}

fn render_landing_nav(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            "Shotcraft",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    for (index, item) in LANDING_NAV.iter().enumerate() {
        let style = if index == app.landing_nav_index {
            components::selection_style(true)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", item.label), style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn render_landing_page(f: &mut Frame, app: &App, area: Rect) {
    // Line layout must match `LandingBlock::height`: heading, body, blank.
    let mut lines = Vec::new();
    for (index, block) in LANDING_BLOCKS.iter().enumerate() {
        let heading_style = if index == 0 {
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        };
        let mut heading = vec![Span::styled(block.heading, heading_style)];
        if let Some(section) = block.section {
            heading.push(Span::styled(
                format!("  #{}", section.anchor()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(heading));
        for body in block.lines {
            lines.push(Line::from(Span::styled(
                *body,
                Style::default().fg(Color::White),
            )));
        }
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .padding(ratatui::widgets::Padding::horizontal(2)),
            )
            .scroll((app.landing_scroll, 0)),
        area,
    );
}
