// Defensive programming lints - prevent panics and unsafe patterns
#![deny(clippy::indexing_slicing)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::fallible_impl_from)]
#![warn(clippy::wildcard_enum_match_arm)]
#![warn(clippy::fn_params_excessive_bools)]
// Idiomatic Rust lints
#![warn(clippy::needless_return)]
#![warn(clippy::let_and_return)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::explicit_iter_loop)]

mod app;
mod config;
mod error;
mod logging;
mod models;
mod services;
mod ui;

use app::{App, Screen};
use color_eyre::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{
    io,
    time::{Duration, Instant},
};

fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    // Load config
    let config = config::Config::load()?;

    // Check for command-line arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        return handle_cli_args(&args);
    }

    let _log_guard = logging::init(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and initialize services
    let mut app = App::new();
    app.init_services(&config);
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "ui loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn handle_cli_args(args: &[String]) -> Result<()> {
    let cmd = args
        .get(1)
        .ok_or_else(|| color_eyre::eyre::eyre!("No command provided"))?;
    let program_name = args.first().map_or("shotcraft", String::as_str);

    match cmd.as_str() {
        "--help" | "-h" | "help" => print_help(program_name),
        "--version" | "-v" => println!("Shotcraft v{}", env!("CARGO_PKG_VERSION")),
        "models" => print_models(),
        cmd_str => {
            eprintln!("Unknown command: {}", cmd_str);
            eprintln!("Run with --help for available commands.");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn print_help(program_name: &str) {
    println!("Shotcraft - product photos and videos for marketing");
    println!();
    println!("Usage: {} [command]", program_name);
    println!();
    println!("Commands:");
    println!("  models     - List the available generation models");
    println!("  --help     - Show this help");
    println!("  --version  - Show version");
    println!();
    println!("Run without arguments to start the studio.");
    println!("The API key is read from API_KEY or GEMINI_API_KEY, then config.toml.");
}

fn print_models() {
    for mode in [models::GenerationMode::Image, models::GenerationMode::Video] {
        println!("{}:", mode.label());
        for model in models::models_for_mode(mode) {
            let caps = model.capabilities;
            let mut flags = Vec::new();
            if caps.supports_input_image {
                flags.push("photo");
            }
            if caps.supports_resolution {
                flags.push("resolution");
            }
            if caps.supports_quantity {
                flags.push("batch");
            }
            println!(
                "  {:<32} {:<28} {:<5} {}",
                model.id,
                model.label,
                model.default_aspect_ratio,
                flags.join(", ")
            );
        }
        println!();
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Results, progress and key requests from background tasks
        app.check_generation_events();
        tick_loading_animation(app);
        app.apply_due_scroll(Instant::now());
        app.clear_expired_status_toast();

        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit {
            break;
        }

        // Poll for events with a timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle KeyPress events to avoid duplicate handling
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl && key.code == KeyCode::Char('c') {
                        app.should_quit = true;
                        continue;
                    }

                    if app.key_dialog_open {
                        handle_key_dialog(app, key.code);
                        continue;
                    }
                    if ctrl && key.code == KeyCode::Char('k') {
                        app.open_key_dialog(None);
                        continue;
                    }

                    match app.router.screen() {
                        Screen::Landing => handle_landing_mode(app, key.code),
                        Screen::Hub => handle_hub_mode(app, key.code),
                        Screen::Generator => {
                            handle_generator_mode(app, key.code, key.modifiers);
                        }
                        Screen::Templates => handle_templates_mode(app, key.code),
                        Screen::Documents => handle_documents_mode(app, key.code),
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                Event::Paste(paste) => handle_paste(app, &paste),
                Event::FocusGained | Event::FocusLost | Event::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

fn tick_loading_animation(app: &mut App) {
    if !app.generation.is_loading {
        app.loading_frame = 0;
        app.last_loading_tick = None;
        return;
    }

    let now = Instant::now();
    let should_tick = app
        .last_loading_tick
        .is_none_or(|last_tick| now.duration_since(last_tick) >= Duration::from_millis(200));

    if should_tick {
        app.loading_frame = app.loading_frame.wrapping_add(1);
        app.last_loading_tick = Some(now);
    }
}

fn handle_landing_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Enter => app.start(),
        KeyCode::Char(' ') => app.follow_landing_nav(),
        KeyCode::Left => app.previous_landing_nav(),
        KeyCode::Right | KeyCode::Tab => app.next_landing_nav(),
        KeyCode::Up => app.scroll_landing(-1),
        KeyCode::Down => app.scroll_landing(1),
        KeyCode::PageUp => app.scroll_landing(-10),
        KeyCode::PageDown => app.scroll_landing(10),
        KeyCode::Home => app.scroll_landing(i32::MIN),
        KeyCode::Esc
        | KeyCode::Backspace
        | KeyCode::End
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Char(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_hub_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.back(),
        KeyCode::Up => app.previous_hub_item(),
        KeyCode::Down | KeyCode::Tab => app.next_hub_item(),
        KeyCode::Enter => app.activate_hub_item(),
        KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Char(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_templates_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.back(),
        KeyCode::Char(character) => {
            app.catalog_shortcut(character);
        }
        KeyCode::Up => app.previous_template(),
        KeyCode::Down => app.next_template(),
        KeyCode::Tab => app.cycle_template_filter(),
        KeyCode::Enter => app.use_selected_template(),
        KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_documents_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.back(),
        KeyCode::Char(character) => {
            app.catalog_shortcut(character);
        }
        KeyCode::Up => app.previous_document(),
        KeyCode::Down | KeyCode::Tab => app.next_document(),
        KeyCode::PageUp => app.scroll_document(-10),
        KeyCode::PageDown => app.scroll_document(10),
        KeyCode::Enter
        | KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_generator_mode(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(character) = key_code {
            match character {
                'g' => app.run_generation(),
                't' => app.toggle_generator_mode(),
                's' => app.save_result(),
                'y' => app.copy_result_link(),
                'x' => app.clear_images(),
                _ => {}
            }
        }
        return;
    }

    match key_code {
        KeyCode::Esc => {
            if app.generation.is_loading {
                app.cancel_generation();
            } else {
                app.back();
            }
        }
        KeyCode::Enter => app.submit_generator_field(),
        KeyCode::Tab | KeyCode::Down => app.generator.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.generator.focus_previous(),
        KeyCode::Left => app.generator.cycle_focused(false),
        KeyCode::Right => app.generator.cycle_focused(true),
        KeyCode::Home => {
            if let Some(input) = app.generator.focused_input() {
                input.move_to_start();
            }
        }
        KeyCode::End => {
            if let Some(input) = app.generator.focused_input() {
                input.move_to_end();
            }
        }
        KeyCode::Char(character) => app.add_generator_char(character),
        KeyCode::Backspace => app.remove_generator_char(),
        KeyCode::Delete => app.delete_generator_char(),
        KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_key_dialog(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.close_key_dialog(),
        KeyCode::Enter => app.submit_key_dialog(),
        KeyCode::Char(character) => app.add_key_char(character),
        KeyCode::Backspace => app.remove_key_char(),
        KeyCode::Delete => app.key_input.delete_char(),
        KeyCode::Left => app.key_input.move_left(),
        KeyCode::Right => app.key_input.move_right(),
        KeyCode::Home => app.key_input.move_to_start(),
        KeyCode::End => app.key_input.move_to_end(),
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    let delta = match mouse.kind {
        MouseEventKind::ScrollUp => -3,
        MouseEventKind::ScrollDown => 3,
        MouseEventKind::Down(_)
        | MouseEventKind::Up(_)
        | MouseEventKind::Drag(_)
        | MouseEventKind::Moved
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => return,
    };
    if app.key_dialog_open {
        return;
    }
    match app.router.screen() {
        Screen::Landing => app.scroll_landing(delta),
        Screen::Documents => app.scroll_document(delta),
        Screen::Hub | Screen::Generator | Screen::Templates => {}
    }
}

fn handle_paste(app: &mut App, paste: &str) {
    let text = paste.trim_end_matches(['\n', '\r']);
    if text.is_empty() {
        return;
    }

    if app.key_dialog_open {
        app.key_input.insert_str(text.trim());
        return;
    }
    if app.router.screen() == Screen::Generator {
        if let Some(input) = app.generator.focused_input() {
            input.insert_str(text);
        }
    }
}
