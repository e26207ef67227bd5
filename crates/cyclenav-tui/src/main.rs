//! CycleNav, a terminal journey planner built with ratatui.
//!
//! This binary initialises the terminal, runs the main event loop,
//! and restores the terminal on exit or panic.

mod app;
mod background;
mod input;
mod render;
mod ui;

use std::io;
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cyclenav_core::config::keymap::Keymap;
use cyclenav_core::config::settings::Config;
use cyclenav_core::config::theme::Theme;
use cyclenav_core::{
    ApiClient, Controller, Effect, FileBackend, HttpApiClient, LocalRouting, MemoryBackend,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{App, AppMode, Preferences, TerminalMap};
use crate::background::{config_dir, default_preferences_path, spawn_request, ApiMessage};
use crate::input::{handle_key, InputAction};
use crate::render::render;

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Opens the preferences file, falling back to memory if it cannot be read.
fn open_preferences(config: &Config) -> Preferences {
    let path = config
        .storage
        .preferences_path
        .clone()
        .unwrap_or_else(default_preferences_path);
    match FileBackend::open(&path) {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "preferences kept in memory");
            Box::new(MemoryBackend::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file; the terminal belongs to the UI
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(std::env::temp_dir().join("cyclenav.log"))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let cfg_dir = config_dir();
    let config = Config::load(&cfg_dir.join("default.toml")).unwrap_or_else(|e| {
        tracing::info!(error = %e, "using default configuration");
        Config::default()
    });
    let keymap = Keymap::load(&cfg_dir.join("keymap.toml")).unwrap_or_default();
    let theme = Theme::load(&cfg_dir.join("theme.toml")).unwrap_or_default();

    let client: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(&config.api)?);
    let controller = Controller::new(
        &config,
        TerminalMap::new(&config.map.options(), config.map.max_zoom),
        LocalRouting::new(config.map.center()),
        open_preferences(&config),
    )?;
    let app = App::new(controller, keymap, theme);

    install_panic_hook();

    let mut terminal = setup_terminal()?;

    let result = run_app(&mut terminal, app, client).await;

    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    client: Arc<dyn ApiClient>,
) -> anyhow::Result<()> {
    let (api_tx, mut api_rx) = mpsc::unbounded_channel::<ApiMessage>();

    let (app, effects) = app.startup();
    let mut app = perform(app, effects, &client, &api_tx);

    loop {
        // 1. Apply finished requests
        while let Ok(msg) = api_rx.try_recv() {
            app = match msg {
                ApiMessage::Completed { request, result } => {
                    app.complete(request, result, Instant::now())
                }
            };
        }

        // 2. Advance the notification clock
        app = app.tick(Instant::now());

        // 3. Draw
        terminal.draw(|f| render(f, &app))?;

        if app.should_quit() {
            break;
        }

        // 4. Poll for crossterm events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = handle_key(key, app.mode(), app.keymap());
                let (next, effects) = apply(app, action, Instant::now());
                app = perform(next, effects, &client, &api_tx);
            }
        }
    }

    Ok(())
}

fn idle(app: App) -> (App, Vec<Effect>) {
    (app, Vec::new())
}

/// Applies one input action to the app.
fn apply(app: App, action: InputAction, now: Instant) -> (App, Vec<Effect>) {
    match action {
        InputAction::Command(cmd) => app.with_clear_status().dispatch(cmd, now),
        InputAction::EnterMode(AppMode::Browse(_)) => app.open_browse(now),
        InputAction::EnterMode(mode) => idle(app.with_mode(mode)),
        InputAction::Quit => idle(app.with_quit()),
        InputAction::ToggleDrawer => app.toggle_drawer(now),
        InputAction::CursorDown => idle(app.with_cursor_down()),
        InputAction::CursorUp => idle(app.with_cursor_up()),
        InputAction::Select => app.with_clear_status().select(now),
        InputAction::EditField => idle(app.with_clear_status().edit_field()),
        InputAction::SaveForm => app.save_form(now),
        InputAction::StartWizard => app.with_clear_status().start_wizard(now),
        InputAction::MapClick => app.map_click(now),
        InputAction::OpenPopup => app.open_popup(now),
        InputAction::Pan { dx, dy } => idle(app.pan(dx, dy)),
        InputAction::Zoom(steps) => idle(app.zoom(steps)),
        InputAction::DeactivateLayer => app.deactivate_layer(now),
        InputAction::EditChar(c) => app.edit_push_char(c, now),
        InputAction::EditBackspace => app.edit_pop_char(now),
        InputAction::EditConfirm => app.edit_confirm(now),
        InputAction::EditCancel => idle(app.edit_cancel()),
        InputAction::BrowseChar(c) => idle(app.browse_push_char(c)),
        InputAction::BrowseBackspace => idle(app.browse_pop_char()),
        InputAction::BrowseSubmit => app.browse_submit(now),
        InputAction::BrowseCancel => app.browse_cancel(now),
        InputAction::None => idle(app),
    }
}

/// Carries out the effects the core handed back.
fn perform(
    mut app: App,
    effects: Vec<Effect>,
    client: &Arc<dyn ApiClient>,
    tx: &mpsc::UnboundedSender<ApiMessage>,
) -> App {
    for effect in effects {
        match effect {
            Effect::Request(request) => spawn_request(Arc::clone(client), request, tx.clone()),
            Effect::Share { title, text, url } => app = app.with_share(&title, &text, &url),
        }
    }
    app
}
