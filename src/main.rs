use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use resume_scorer::config::{API_BASE_URL_ENV, Config};
use resume_scorer::state::{ResumeFile, UploadState, DEFAULT_TARGET_ROLE};
use resume_scorer::{handler, tui, ui, view, AnalyzeError, App, ScoringClient};

#[derive(Parser)]
#[command(name = "resume-scorer", version)]
#[command(about = "Score a resume PDF against a target role")]
struct Cli {
    /// Scoring service base URL (overrides env and config file)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Target role to start with
    #[arg(short, long, global = true)]
    role: Option<String>,

    /// Resume PDF to pre-select in the TUI
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one resume without the TUI
    Analyze {
        /// Resume PDF to upload
        file: PathBuf,
        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the scoring service is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // load .env if present; ignore if missing
    let cli = Cli::parse();

    init_logging(cli.command.is_none());

    let config = Config::load().unwrap_or_else(|err| {
        warn!("Ignoring config file: {:#}", err);
        Config::new()
    });

    let env_url = std::env::var(API_BASE_URL_ENV).ok();
    let api = config.api_config(cli.api_base_url.clone(), env_url);
    let client = ScoringClient::new(api);
    info!("Using scoring service at {}", client.base_url());

    let role = cli
        .role
        .clone()
        .or_else(|| config.default_role.clone())
        .unwrap_or_else(|| DEFAULT_TARGET_ROLE.to_string());

    match cli.command {
        None => {
            let picker_dir = match config.resume_dir.clone() {
                Some(dir) => dir,
                None => std::env::current_dir().context("Could not determine working directory")?,
            };
            run_tui(client, role, picker_dir, cli.file).await
        }
        Some(Commands::Analyze { file, json }) => {
            if let Err(err) = analyze_once(&client, role, file, json).await {
                eprintln!("Error: {}", err.display_message());
                std::process::exit(exit_code(&err));
            }
            Ok(())
        }
        Some(Commands::Health) => {
            let status = client
                .check_health()
                .await
                .with_context(|| format!("Scoring service at {} is unreachable", client.base_url()))?;
            println!("{}: {}", client.base_url(), status);
            Ok(())
        }
    }
}

async fn run_tui(
    client: ScoringClient,
    role: String,
    picker_dir: PathBuf,
    file: Option<PathBuf>,
) -> Result<()> {
    let mut app = App::new(client, role, picker_dir);
    if let Some(path) = file {
        app.load_file(&path);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let outcome = async {
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
    outcome
}

async fn analyze_once(
    client: &ScoringClient,
    role: String,
    path: PathBuf,
    json: bool,
) -> Result<(), AnalyzeError> {
    let mut upload = UploadState::new(role);
    upload.set_file(Some(ResumeFile::load(&path)?));

    let request = upload.begin_analysis()?;
    let result = client.analyze(&request).await?;

    if json {
        println!("{}", result.to_pretty_json());
    } else {
        for line in view::report_lines(&result, &client.base_url()) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// 2 for problems with the input file, 1 for everything past the upload.
fn exit_code(err: &AnalyzeError) -> i32 {
    if err.is_user_input() {
        2
    } else {
        1
    }
}

/// The TUI owns stderr, so it logs to a file; subcommands log to stderr.
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("resume-scorer"))
        .and_then(|dir| fs::create_dir_all(&dir).ok().map(|_| dir.join("resume-scorer.log")))
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}
