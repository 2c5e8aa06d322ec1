mod app;
mod handler;
mod tui;
mod ui;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use app::App;
use pantry_core::{parse_ingredients, parse_recipe, BackendClient, Config};
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "pantry-chef")]
#[command(about = "Turn the ingredients you have into a recipe", version)]
struct Cli {
    /// Recipe backend root, e.g. http://localhost:8000
    #[arg(long, global = true, env = "PANTRY_BACKEND_URL")]
    backend_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "PANTRY_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Save --backend-url to the config file
    #[arg(long, global = true)]
    remember: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the backend is reachable
    Check,
    /// Ask for a single recipe and print it
    Generate {
        /// Comma-separated ingredients
        #[arg(required = true, num_args = 1..)]
        ingredients: Vec<String>,
        /// Print the backend text without parsing it
        #[arg(long)]
        raw: bool,
    },
}

/// Daily rolling log file under `data_dir/logs`.
fn log_file_appender(data_dir: &Path) -> Result<RollingFileAppender> {
    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Could not create log directory {}", logs_dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pantry-chef.log")
        .build(&logs_dir)
        .with_context(|| format!("Could not open log file in {}", logs_dir.display()))
}

/// Logging goes to a file only; the TUI owns the terminal. Without a usable
/// log directory the app still runs, just unlogged.
fn init_logging(data_dir: &Path) -> Option<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pantry_core=debug,pantry_chef=debug"));

    let (file_layer, guard) = match log_file_appender(data_dir) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pantry-chef");
    let _guard = init_logging(&data_dir);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "pantry-chef exited with an error");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load().unwrap_or_else(|e| {
        info!(error = %e, "using default config");
        Config::new()
    });

    if cli.remember {
        match &cli.backend_url {
            Some(url) => {
                Config::save_backend_url(url)?;
                info!(url = %url, "backend url saved");
            }
            None => bail!("--remember needs --backend-url"),
        }
    }

    let base_url = config.resolve_backend_url(cli.backend_url.as_deref());
    let timeout = config.resolve_timeout(cli.timeout);
    let client = BackendClient::with_timeout(&base_url, timeout)?;
    info!(backend = %client.base_url(), timeout_secs = timeout.as_secs(), "backend configured");

    match cli.command {
        None => {
            run_tui(client).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Check) => check_backend(&client).await,
        Some(Commands::Generate { ingredients, raw }) => {
            generate_once(&client, &ingredients.join(" "), raw).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tui(client: BackendClient) -> Result<()> {
    let mut terminal = tui::init()?;
    tui::install_panic_hook();

    let mut app = App::new(client);
    let mut events = EventHandler::new();
    app.check_connection();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn check_backend(client: &BackendClient) -> Result<ExitCode> {
    println!("Backend: {}", client.base_url());

    match client.health().await {
        Ok(health) => {
            println!("Status:  {}", health.status.as_deref().unwrap_or("ok"));
            if let Some(model) = &health.model {
                println!("Model:   {}", model);
            }
        }
        Err(e) => {
            println!("Status:  offline ({:#})", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    // The root document is optional; older backends only expose /health
    if let Ok(backend) = client.info().await {
        if let Some(message) = &backend.message {
            println!("Message: {}", message);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn generate_once(client: &BackendClient, input: &str, raw: bool) -> Result<()> {
    let ingredients = parse_ingredients(input);
    if ingredients.is_empty() {
        bail!("No ingredients given. Try: pantry-chef generate \"chicken, rice, garlic\"");
    }

    eprintln!("Cooking with {}...", ingredients.join(", "));
    let text = client.generate_recipe(&ingredients).await?;

    if raw {
        println!("{}", text);
    } else {
        print!("{}", parse_recipe(&text));
    }
    Ok(())
}
