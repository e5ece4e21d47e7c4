use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered area with an exact size, clipped to `r`.
pub fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(r.height))])
        .flex(Flex::Center)
        .areas(r);
    let [area] = Layout::horizontal([Constraint::Length(width.min(r.width))])
        .flex(Flex::Center)
        .areas(row);
    area
}
