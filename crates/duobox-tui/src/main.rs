//! duobox: a dual-panel terminal browser for a remote archive.
//!
//! This binary connects to the remote (or builds the demo archive),
//! initialises the terminal, runs the main event loop, and restores the
//! terminal on exit or panic.

mod app;
mod input;
mod render;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use duobox_core::config::keymap::Keymap;
use duobox_core::config::settings::Config;
use duobox_core::config::theme::Theme;
use duobox_core::event::FetchEvent;
use duobox_core::nav::{NavigationController, NavigationOptions};
use duobox_core::remote::{DropboxClient, DropboxConfig, MemoryArchive, RemoteDirectoryClient};
use duobox_core::{CoreError, CoreResult, RemotePath};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::{config_dir, App};
use crate::input::{handle_key, InputAction, InputState};
use crate::render::{panel_rows, render};

/// Browse a Dropbox archive in two side-by-side panels.
#[derive(Debug, Parser)]
#[command(name = "duobox", version, about)]
struct Args {
    /// Folder opened in the left panel (defaults to `general.left_path`).
    path: Option<String>,

    /// Folder opened in the right panel (defaults to `general.right_path`).
    #[arg(long)]
    right: Option<String>,

    /// Directory holding default.toml, keymap.toml and theme.toml.
    #[arg(long, value_name = "DIR")]
    config: Option<PathBuf>,

    /// Browse a built-in sample archive instead of Dropbox.
    #[arg(long)]
    demo: bool,
}

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

/// Logs to a file so output never lands on the alternate screen.
fn init_tracing() -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join("duobox.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    Ok(path)
}

/// Reads `default.toml`; a missing file means defaults, anything else is fatal.
fn load_config(dir: &std::path::Path) -> anyhow::Result<Config> {
    match Config::load(&dir.join("default.toml")) {
        Ok(config) => Ok(config),
        Err(CoreError::NotFound(_)) => Ok(Config::default()),
        Err(e) => Err(e).context("failed to load default.toml"),
    }
}

/// Falls back to defaults for an optional config file, logging why unless
/// the file is simply absent.
fn or_default<T: Default>(loaded: CoreResult<T>, file: &str) -> T {
    match loaded {
        Ok(value) => value,
        Err(CoreError::NotFound(_)) => T::default(),
        Err(error) => {
            tracing::warn!(file, %error, "ignoring config file, using defaults");
            T::default()
        }
    }
}

async fn connect(args: &Args, config: &Config) -> anyhow::Result<Arc<dyn RemoteDirectoryClient>> {
    if args.demo {
        tracing::info!("using demo archive");
        return Ok(Arc::new(MemoryArchive::demo()));
    }
    let client = DropboxClient::connect(DropboxConfig {
        access_token: config.remote.resolved_token(),
        page_size: config.remote.page_size,
        timeout: Duration::from_secs(config.remote.timeout_secs),
    })
    .await
    .context("could not connect to Dropbox (set DROPBOX_ACCESS_TOKEN or use --demo)")?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_path = init_tracing()?;

    let cfg_dir = args.config.clone().unwrap_or_else(config_dir);
    let config = load_config(&cfg_dir)?;
    let keymap = or_default(Keymap::load(&cfg_dir.join("keymap.toml")), "keymap.toml");
    let theme = or_default(Theme::load(&cfg_dir.join("theme.toml")), "theme.toml");
    tracing::info!(config_dir = %cfg_dir.display(), log = %log_path.display(), "starting duobox");

    let client = connect(&args, &config).await?;

    let left = RemotePath::parse(args.path.as_deref().unwrap_or(&config.general.left_path));
    let right = RemotePath::parse(args.right.as_deref().unwrap_or(&config.general.right_path));

    let (tx, rx) = mpsc::unbounded_channel::<FetchEvent>();
    let mut controller = NavigationController::new(client, tx, NavigationOptions::from(&config));
    controller.start(left, right);
    let app = App::new(controller, &config, keymap, theme);

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let result = run_app(&mut terminal, app, rx).await;

    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut fetch_rx: mpsc::UnboundedReceiver<FetchEvent>,
) -> anyhow::Result<()> {
    let mut input_state = InputState::new();

    loop {
        // 1. Drain finished remote calls
        while let Ok(event) = fetch_rx.try_recv() {
            app = app.with_fetch_event(event);
        }

        // 2. Keep the controller's page size in step with the terminal
        let size = terminal.size()?;
        app = app.with_viewport(panel_rows(size.height));

        // 3. Render
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
                let (action, new_input_state) =
                    handle_key(key, app.mode(), &input_state, app.keymap());
                input_state = new_input_state;

                app = match action {
                    InputAction::Dispatch(action) => app.dispatch(action),
                    InputAction::EnterMode(mode) => app.with_mode(mode),
                    InputAction::Quit => app.with_quit(),
                    InputAction::None => app,
                };
            }
        }
    }

    Ok(())
}
