mod api;
mod app;
mod logging;
mod terminal;
mod ui;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use api::ApiClient;
use app::App;

/// Reelfeed - a terminal client for the movie review feed
#[derive(Parser)]
#[command(name = "reelfeed")]
#[command(about = "A terminal-based social movie review feed")]
#[command(version)]
struct Cli {
    /// Server URL to connect to
    #[arg(long, short, env = "REELFEED_SERVER_URL")]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env lets REELFEED_SERVER_URL be set without command-line args
    let _ = dotenv::dotenv();

    logging::init_logging(cli.verbose)?;

    let api_client = match cli.server {
        Some(server) => ApiClient::new(server),
        None => ApiClient::default(),
    };

    let mut terminal = terminal::init()?;
    let mut app = App::new(api_client);
    app.load_test_users().await;

    let result = run_app(&mut terminal, &mut app).await;

    terminal::restore()?;
    result
}

async fn run_app(terminal: &mut terminal::Tui, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Short poll keeps the tick responsive without spinning
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key).await?;
                }
            }
        }

        app.on_tick().await;
    }
    Ok(())
}
