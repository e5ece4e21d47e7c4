use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::app::{App, GeneratorField, GeneratorForm};
use crate::ui::components::{self, TextInputConfig};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render_generator_view(f: &mut Frame, app: &App) {
    let form = &app.generator;
    let takes_photo = form.model.capabilities.supports_input_image;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                              // Header
            Constraint::Length(3),                              // Prompt
            Constraint::Length(5),                              // Model settings
            Constraint::Length(if takes_photo { 3 } else { 0 }), // Product photo
            Constraint::Min(0),                                 // Result
            Constraint::Length(3),                              // Footer
        ])
        .split(f.area());

    let [header, prompt, settings, photo, result, footer] = &chunks[..] else {
        return;
    };

    let detail = format!("{} · {}", form.mode.label(), form.model.label);
    components::render_header(f, *header, "Generator", &detail);

    let placeholder = match form.mode {
        crate::models::GenerationMode::Image => "a marble countertop at golden hour...",
        crate::models::GenerationMode::Video => "slow orbit around the product, soft studio light...",
    };
    components::render_text_input(
        f,
        *prompt,
        TextInputConfig::new(form.prompt.content(), " Scene ")
            .with_placeholder(placeholder)
            .with_focus(form.focus == GeneratorField::Prompt)
            .with_cursor_position(form.prompt.cursor_position()),
    );

    render_settings(f, form, *settings);

    if takes_photo {
        let title = format!(
            " Product photo ({} attached) ",
            app.generation.original_images.len()
        );
        components::render_text_input(
            f,
            *photo,
            TextInputConfig::new(form.image_path.content(), &title)
                .with_placeholder("path to a PNG, JPEG or WebP, Enter to attach")
                .with_focus(form.focus == GeneratorField::ImagePath)
                .with_cursor_position(form.image_path.cursor_position()),
        );
    }

    render_result(f, app, *result);

    let escape = if app.generation.is_loading {
        ("Esc", "cancel")
    } else {
        ("Esc", "back")
    };
    components::render_navigation_footer(
        f,
        *footer,
        app.router.screen().label(),
        &[
            ("^G", "generate"),
            ("Tab", "field"),
            ("←→", "change"),
            ("^T", "mode"),
            ("^S", "save"),
            ("^Y", "copy link"),
            ("^X", "clear photos"),
            escape,
        ],
        app.status_toast_message(),
    );
}

fn render_settings(f: &mut Frame, form: &GeneratorForm, area: Rect) {
    let fields = form.fields();
    let mut lines = Vec::new();
    for field in [
        GeneratorField::Model,
        GeneratorField::AspectRatio,
        GeneratorField::Resolution,
    ] {
        if !fields.contains(&field) {
            continue;
        }
        let value = match field {
            GeneratorField::Model => form.model.label,
            GeneratorField::AspectRatio => form.aspect_ratio,
            GeneratorField::Resolution => form.resolution,
            GeneratorField::Prompt | GeneratorField::ImagePath => continue,
        };
        let focused = form.focus == field;
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<14}", field.label()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                if focused { "◀ " } else { "  " },
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(value, components::selection_style(focused)),
            Span::styled(
                if focused { " ▶" } else { "" },
                Style::default().fg(Color::Cyan),
            ),
        ]));
    }
    lines.push(Line::from(Span::styled(
        form.model.description,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(
        Paragraph::new(lines).block(components::panel("Settings")),
        area,
    );
}

fn render_result(f: &mut Frame, app: &App, area: Rect) {
    let state = &app.generation;
    let mut lines = Vec::new();

    if state.is_loading {
        let frame = SPINNER
            .get(usize::from(app.loading_frame) % SPINNER.len())
            .copied()
            .unwrap_or("|");
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", frame), Style::default().fg(Color::Yellow)),
            Span::styled(
                state.progress_message.clone(),
                Style::default().fg(Color::Yellow),
            ),
        ]));
    } else if !state.progress_message.is_empty() {
        lines.push(Line::from(Span::styled(
            state.progress_message.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    if let Some(image) = &state.generated_image {
        let kib = image.len() * 3 / 4 / 1024;
        lines.push(Line::from(Span::styled(
            format!("Image ready (~{} KiB)", kib),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(uri) = &state.generated_video_uri {
        lines.push(Line::from(Span::styled(
            "Video ready",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            uri.clone(),
            Style::default().fg(Color::Blue),
        )));
    }
    if state.has_result() && state.saved_path.is_none() {
        lines.push(Line::from(Span::styled(
            "Ctrl+S saves the result, Ctrl+Y copies its link.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(path) = &state.saved_path {
        lines.push(Line::from(vec![
            Span::styled("Saved to ", Style::default().fg(Color::DarkGray)),
            Span::styled(path.display().to_string(), Style::default().fg(Color::White)),
        ]));
    }

    if lines.is_empty() {
        let hint = if state.original_images.is_empty()
            && app.generator.mode == crate::models::GenerationMode::Video
        {
            "Attach a product photo, describe the scene and press Ctrl+G."
        } else {
            "Describe the scene and press Ctrl+G."
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(components::panel("Result")),
        area,
    );
}
