mod app;
mod config;
mod document;
mod gallery;
mod icons;
mod overlay;
mod pagination;
mod preferences;
mod theme;
mod tombstone;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Direction};
use config::Config;
use icons::{IconLoader, IconSource};
use preferences::{FileStore, MemoryStore, PreferenceStore};
use theme::{IconRequest, IconResult};
use tombstone::Site;
use ui::ImageManager;

/// Upper bound on how long the loop waits for input
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Log directive used when `RUST_LOG` is unset; targets this binary's modules
const DEFAULT_LOG_FILTER: &str = concat!(env!("CARGO_CRATE_NAME"), "=info");

#[derive(Parser, Debug)]
#[command(name = "cemetery")]
#[command(about = "Paginated memorial gallery for the terminal")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "~/.config/cyber-cemetery/config.toml")]
    config: String,

    /// Site root (overrides site.root)
    #[arg(long)]
    site: Option<PathBuf>,

    /// Page to open first
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Keep the theme choice for this session only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    let mut config = Config::load(&cli.config)?;
    if let Some(site) = cli.site {
        config.site.root = site;
    }

    let site = Site::load(&config.tombstones_dir(), config.site.per_page)?;
    let store = open_store(&config, cli.no_persist);
    let loader = IconLoader::new(IconSource::from_base(&config.icon_base()));

    // Graphics detection queries stdio, so it runs before raw mode
    let images = config
        .icons
        .enabled
        .then(|| Arc::new(Mutex::new(ImageManager::new(config.icons.size, config.site_root()))));

    let mut app = App::new(config, site, store);
    let (icon_tx, mut icon_rx) = unbounded_channel();
    let request = app.start(cli.page);
    spawn_icon_load(&loader, request, &icon_tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &mut app,
        images.as_ref(),
        &loader,
        &icon_tx,
        &mut icon_rx,
    )
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn init_logging(log_file: Option<&std::path::Path>) -> Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(log_file.is_none()),
        )
        .init();
    Ok(())
}

/// File-backed store, or an in-memory one when persistence is off or the
/// file cannot be read
fn open_store(config: &Config, no_persist: bool) -> Box<dyn PreferenceStore> {
    if no_persist {
        return Box::new(MemoryStore::default());
    }

    let path = config
        .preferences_path()
        .unwrap_or_else(FileStore::default_path);
    match FileStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(
                "Preferences at {} unavailable, theme will not persist: {:#}",
                path.display(),
                e
            );
            Box::new(MemoryStore::default())
        }
    }
}

/// Load a glyph in the background; the result carries the request's generation
fn spawn_icon_load(loader: &IconLoader, request: IconRequest, tx: &UnboundedSender<IconResult>) {
    let loader = loader.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let glyph = loader.load(request.kind).await;
        let _ = tx.send(IconResult {
            generation: request.generation,
            glyph,
        });
    });
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    images: Option<&Arc<Mutex<ImageManager>>>,
    loader: &IconLoader,
    icon_tx: &UnboundedSender<IconResult>,
    icon_rx: &mut UnboundedReceiver<IconResult>,
) -> Result<()> {
    loop {
        while let Ok(result) = icon_rx.try_recv() {
            let glyph = result.glyph.clone();
            if app.apply_icon(result) {
                if let Some(images) = images {
                    let theme = app.config().resolve_theme(app.document().light_theme);
                    images.lock().set_theme_icon(&glyph, theme.icon);
                }
            }
        }

        app.tick(Instant::now());
        terminal.draw(|f| ui::draw(f, app, images))?;

        if app.should_quit() {
            return Ok(());
        }

        // Wake up in time to settle a pending overlay close
        let timeout = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));

        if !event::poll(timeout)? {
            continue;
        }

        let request = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                app.click(mouse.column, mouse.row, Instant::now())
            }
            _ => None,
        };

        if let Some(request) = request {
            spawn_icon_load(loader, request, icon_tx);
        }
    }
}

/// Apply a key press. Returns an icon request when the theme was toggled.
fn handle_key(app: &mut App, key: KeyEvent) -> Option<IconRequest> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return None;
    }

    // The overlay is modal: only closing, quitting and the theme get through
    let modal = app.document().overlay.displayed;

    match key.code {
        KeyCode::Esc => app.escape(Instant::now()),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('t') => return Some(app.toggle_theme()),
        _ if modal => {}
        KeyCode::Enter => app.activate_focused(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char('n') => app.follow("Next"),
        KeyCode::Char('p') => app.follow("Previous"),
        KeyCode::Up | KeyCode::Char('k') => app.navigate(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => app.navigate(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => app.navigate(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => app.navigate(Direction::Right),
        KeyCode::Home | KeyCode::Char('g') => app.navigate(Direction::Home),
        KeyCode::End | KeyCode::Char('G') => app.navigate(Direction::End),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_matches_crate() {
        let target = DEFAULT_LOG_FILTER.split('=').next();
        assert_eq!(target, Some(module_path!()));
        assert_eq!(DEFAULT_LOG_FILTER, "cemetery=info");
    }
}
