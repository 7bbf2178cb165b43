//! seatguard - terminal client for a session-limited account.
//!
//! Signs a user in, checks how many sessions their account holds, and
//! blocks the dashboard behind a device chooser once the limit is reached.

mod app;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use seatguard_core::{ApiClient, Config};

use app::{App, Screen};
use ui::input::handle_input;
use ui::render::render;

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "seatguard.log";

/// Initialize file logging. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr while it runs.
fn init_tracing() -> Option<WorkerGuard> {
    // RUST_LOG controls the level (e.g. RUST_LOG=seatguard_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match Config::log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: {}", e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

fn load_config() -> Config {
    match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let config = load_config();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--signup") => return signup(&config).await,
        Some("--debug-sessions") => return dump_sessions(&config).await,
        Some("--clear-sessions") => {
            let identity_id = args
                .get(2)
                .context("Usage: seatguard --clear-sessions <user_id>")?;
            return clear_sessions(&config, Some(identity_id.as_str())).await;
        }
        Some("--clear-all-sessions") => return clear_sessions(&config, None).await,
        Some(other) if other.starts_with("--") => {
            anyhow::bail!("Unknown option: {}", other);
        }
        _ => {}
    }

    info!("seatguard starting");

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Tab teardown: nothing survives the process
    app.close();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("seatguard shutting down");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Create an account interactively
async fn signup(config: &Config) -> Result<()> {
    println!("\n=== seatguard sign-up ===\n");

    let name = prompt("Name: ")?;
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ")?;

    if email.is_empty() || password.is_empty() {
        anyhow::bail!("Email and password are required");
    }

    let client = ApiClient::new(&config.api_url)?;
    match client.signup(&email, &password, &name).await {
        Ok(account) => {
            println!("Account created for {} ({}). Start seatguard to sign in.", account.email, account.id);
            Ok(())
        }
        Err(e) => {
            let message = e.user_message("Signup failed");
            anyhow::bail!(message)
        }
    }
}

/// Print every open session in the registry as JSON
async fn dump_sessions(config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.api_url)?;
    let entries = client.registry_entries().await?;
    eprintln!("{} open sessions", entries.len());
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Clear the sessions of one identity, or of everyone
async fn clear_sessions(config: &Config, identity_id: Option<&str>) -> Result<()> {
    let client = ApiClient::new(&config.api_url)?;
    let cleared = match identity_id {
        Some(id) => client.clear_identity_sessions(id).await?,
        None => client.clear_all_sessions().await?,
    };
    println!("{}", serde_json::to_string_pretty(&cleared)?);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so guard results get picked up
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Apply finished guard evaluations
        app.check_background_tasks();

        if matches!(app.screen, Screen::Quitting) {
            return Ok(());
        }
    }
}
