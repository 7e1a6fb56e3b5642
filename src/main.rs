use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::sync::Arc;
use std::{error::Error, fs, io};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod actions;
mod api;
mod app;
mod auth;
mod config;
mod input;
mod models;
mod reconciler;
mod runtime;
mod store;
mod ui;

use api::HttpGateway;
use app::App;
use config::Config;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load();
    fs::create_dir_all(&config.data.data_path)?;

    // Stderr belongs to the TUI, so logs go to a file in the data dir.
    let file_appender = tracing_appender::rolling::never(&config.data.data_path, "taskpad.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskpad=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    info!(base_url = %config.api.base_url, "starting taskpad");

    let gateway = Arc::new(HttpGateway::new(&config.api)?);
    let mut app = App::new(config, gateway);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        runtime::tick(app);

        terminal.draw(|f| ui::ui(f, app))?;

        if crossterm::event::poll(std::time::Duration::from_millis(250))? {
            let event = crossterm::event::read()?;
            input::handle_event(app, event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
