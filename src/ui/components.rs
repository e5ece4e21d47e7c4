use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = "  ";

/// Configuration for text input rendering
pub struct TextInputConfig<'a> {
    pub content: &'a str,
    pub title: &'a str,
    pub placeholder: Option<&'a str>,
    pub focused: bool,
    pub cursor_position: Option<usize>,
}

impl<'a> TextInputConfig<'a> {
    pub fn new(content: &'a str, title: &'a str) -> Self {
        Self {
            content,
            title,
            placeholder: None,
            focused: true,
            cursor_position: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Unfocused inputs hide the cursor and dim the border.
    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Character index
    pub fn with_cursor_position(mut self, cursor_position: usize) -> Self {
        self.cursor_position = Some(cursor_position);
        self
    }
}

/// Renders a bordered single-line input that scrolls to keep the cursor visible
pub fn render_text_input(frame: &mut Frame, area: Rect, config: TextInputConfig) {
    let cursor = Span::styled(
        if config.focused { "█" } else { "" },
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::SLOW_BLINK),
    );
    let prompt_style = if config.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = if config.content.is_empty() {
        let mut spans = vec![Span::styled("> ", prompt_style), cursor];
        if let Some(placeholder) = config.placeholder {
            spans.push(Span::styled(
                placeholder,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        Line::from(spans)
    } else {
        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor_width = usize::from(config.focused);
        let available_width = inner_width.saturating_sub(2 + cursor_width).max(1);
        let cursor_index = config
            .cursor_position
            .unwrap_or_else(|| config.content.chars().count());
        let (start, end) = visible_window(config.content, cursor_index, available_width);
        let visible = slice_by_chars(config.content, start, end);
        let split = cursor_index.saturating_sub(start).min(visible.chars().count());
        let text_style = Style::default().fg(Color::White);

        Line::from(vec![
            Span::styled("> ", prompt_style),
            Span::styled(slice_by_chars(&visible, 0, split), text_style),
            cursor,
            Span::styled(
                slice_by_chars(&visible, split, visible.chars().count()),
                text_style,
            ),
        ])
    };

    let border_color = if config.focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(config.title, Style::default().fg(Color::White)))
                .border_style(Style::default().fg(border_color)),
        ),
        area,
    );
}

fn visible_window(content: &str, cursor: usize, width: usize) -> (usize, usize) {
    let length = content.chars().count();
    let cursor = cursor.min(length);
    if length <= width {
        return (0, length);
    }
    let mut start = cursor.saturating_sub(width.saturating_sub(1));
    if start + width > length {
        start = length.saturating_sub(width);
    }
    (start, start + width)
}

fn slice_by_chars(value: &str, start: usize, end: usize) -> String {
    value
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Brand line with the current screen name
pub fn render_header(f: &mut Frame, area: Rect, screen: &str, detail: &str) {
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                "Shotcraft",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(screen, Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(detail, Style::default().fg(Color::DarkGray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Left),
        area,
    );
}

/// Footer with mode badge and keybindings; a toast, if any, sits on the right
pub fn render_navigation_footer(
    f: &mut Frame,
    area: Rect,
    mode: &str,
    keybindings: &[(&str, &str)],
    toast: Option<&str>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", mode),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    for &(key, desc) in keybindings {
        spans.push(Span::raw(SEPARATOR));
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::White),
        ));
    }

    let toast_width = toast.map_or(0, |message| {
        u16::try_from(message.width() + 4).unwrap_or(u16::MAX)
    });
    let left = Rect {
        width: inner.width.saturating_sub(toast_width),
        ..inner
    };
    f.render_widget(Paragraph::new(Line::from(spans)), left);

    if let Some(message) = toast {
        let toast_area = Rect {
            x: inner.x + inner.width.saturating_sub(toast_width),
            width: toast_width.min(inner.width),
            ..inner
        };
        render_status_toast(f, toast_area, message);
    }
}

pub fn render_status_toast(frame: &mut Frame, area: Rect, message: &str) {
    let toast = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {} ", message),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Right);

    frame.render_widget(toast, area);
}

/// Row style for list items
pub fn selection_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(Color::DarkGray))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_follows_cursor() {
        assert_eq!(visible_window("short", 5, 10), (0, 5));
        assert_eq!(visible_window("abcdefghij", 10, 4), (6, 10));
        assert_eq!(visible_window("abcdefghij", 0, 4), (0, 4));
    }

    #[test]
    fn test_slice_by_chars_handles_multibyte() {
        assert_eq!(slice_by_chars("naïve", 2, 4), "ïv");
    }
}
