mod app;
mod backend;
mod config;
mod export;
mod notice;
mod render;
mod shell;
mod store;
mod upload;

pub const USER_AGENT: &str = concat!("tributos/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use app::App;
use backend::HttpBackend;
use config::Config;
use render::TerminalPresenter;
use upload::UploadState;

/// TCP connection establishment timeout. Requests themselves are not time-limited.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "tributos")]
#[command(about = "Upload a PDF, find tax terms in it, filter the matches, and export them as CSV")]
#[command(version)]
struct Cli {
    /// Analysis service base URL (overrides TRIBUTOS_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Directory for exported CSV files (overrides TRIBUTOS_OUTPUT_DIR)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a PDF once and print the matches
    Analyze {
        /// PDF file to analyze (max 50MB)
        pdf: PathBuf,

        /// Tax terms to search for, e.g. "ICMS, ISS"
        #[arg(short, long)]
        tributos: String,

        /// Keep only matches of this exact tributo
        #[arg(long)]
        tributo: Option<String>,

        /// Keep only matches mentioning this company (case-insensitive)
        #[arg(long)]
        empresa: Option<String>,

        /// Print the context of the n-th filtered match
        #[arg(long)]
        context: Option<usize>,

        /// Save the filtered matches as CSV
        #[arg(long)]
        export: bool,
    },

    /// Interactive session reading commands from stdin
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "tributos=debug" } else { "tributos=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    let config = Config::load(cli.url, cli.output_dir)?;
    info!(url = %config.base_url, "using analysis service");

    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let backend = HttpBackend::new(http, &config.base_url);
    let mut app = App::new(backend, TerminalPresenter::stdout(), config.output_dir);

    match cli.command {
        Commands::Analyze {
            pdf,
            tributos,
            tributo,
            empresa,
            context,
            export,
        } => {
            if !app.select_file(&pdf).await {
                return Ok(ExitCode::FAILURE);
            }
            app.set_terms(&tributos);
            if !matches!(app.submit_upload().await, UploadState::Succeeded { .. }) {
                return Ok(ExitCode::FAILURE);
            }
            if tributo.is_some() || empresa.is_some() {
                app.apply_filters(tributo.as_deref(), empresa.as_deref().unwrap_or_default());
            }
            if let Some(index) = context
                && app.show_context(index).is_none()
            {
                return Ok(ExitCode::FAILURE);
            }
            if export && app.export().await.is_none() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            if let Err(e) = shell::run(&mut app, stdin).await {
                app.report_unexpected(&e);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
