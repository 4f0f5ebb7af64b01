use std::{fs::File, io::stdout, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::EnableMouseCapture,
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use policylens::event_source::KeyboardEventSource;
use policylens::panic_handler::{initialize_panic_handler, restore_terminal};
use policylens::rag::BackendClient;
use policylens::settings::{BACKEND_URL_ENV, BackendConfig, load_settings};
use policylens::{App, run_app_with_event_source};

/// Read a health insurance policy PDF and ask questions about it
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PDF to open on startup
    file: Option<PathBuf>,

    /// Base URL of the RAG backend
    #[arg(long)]
    backend_url: Option<String>,

    /// Log verbosity written to policylens.log
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = args.log_level.parse().unwrap_or(LevelFilter::Info);
    WriteLogger::init(
        level,
        Config::default(),
        File::create("policylens.log")?,
    )?;
    initialize_panic_handler();

    info!("Starting PolicyLens");

    let settings = load_settings();
    let env_url = std::env::var(BACKEND_URL_ENV).ok();
    let backend_config =
        BackendConfig::resolve(args.backend_url.as_deref(), env_url.as_deref(), &settings);
    let client = BackendClient::new(&backend_config)?;
    info!("Using backend at {}", client.base_url());

    let mut app = App::new(Arc::new(client));
    app.set_theme(settings.theme_id());
    if let Some(path) = &args.file {
        // opened as soon as the viewer is ready
        app.open_document(path);
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    restore_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down PolicyLens");
    Ok(())
}
