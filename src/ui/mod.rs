mod components;
mod documents;
mod generator;
mod hub;
mod key_dialog;
mod landing;
mod templates;
mod utils;

use crate::app::{App, AppView};
use ratatui::Frame;

pub fn render(f: &mut Frame, app: &App) {
    match app.router.view() {
        AppView::Landing => landing::render_landing_view(f, app),
        AppView::Hub => hub::render_hub_view(f, app),
        AppView::Generator { .. } => generator::render_generator_view(f, app),
        AppView::Templates => templates::render_templates_view(f, app),
        AppView::Documents => documents::render_documents_view(f, app),
    }

    // Key dialog overlays whatever screen is active
    if app.key_dialog_open {
        key_dialog::render_key_dialog(f, app);
    }
}
