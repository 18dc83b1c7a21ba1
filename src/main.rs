use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::{info, warn};

mod cli;

use clap::{CommandFactory, FromArgMatches};
use cli::Cli;
use ytsum::config::{Config, config_path};
use ytsum::summarize::Credentials;
use ytsum::{CaptionClient, LlmSummarizer, TranscriptService};

fn setup_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let default_filter = if verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(path)?);
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    if let Some(path) = log_file {
        info!("Logging initialized: {}", path.display());
    }
    Ok(())
}

/// Default location suggested for `--log-file`
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn load_config(cli: &Cli) -> Config {
    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut config = Config::load_from(&path).unwrap_or_else(|e| {
        warn!("Failed to load config file {}: {e}. Using defaults.", path.display());
        Config::default()
    });

    // CLI flags take priority over the config file
    if let Some(ref bind) = cli.bind {
        config.bind = bind.clone();
    }
    if let Some(ref model) = cli.model {
        config.model = model.clone();
    }
    if let Some(ref lang) = cli.lang {
        config.lang = lang.clone();
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let after_help = format!("Suggested log location: {}", log_dir().join("ytsum.log").display());
    let cmd = Cli::command().after_help(after_help);
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    setup_logging(cli.log_file.as_deref(), cli.verbose)?;

    // Non-fatal: a missing .env just means keys come from the real environment
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let config = load_config(&cli);
    info!("Configuration loaded: {config:?}");

    let credentials = Credentials::from_env();
    if credentials.openai_api_key.is_none() && credentials.anthropic_api_key.is_none() {
        warn!("Neither OPENAI_API_KEY nor ANTHROPIC_API_KEY is set; summarization requests will fail");
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .wrap_err("failed to build HTTP client")?;

    let fetcher = CaptionClient::new(client.clone(), &config.lang).with_base_url(&config.youtube_base_url);
    let summarizer = LlmSummarizer::new(client, credentials)
        .with_model(&config.model)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature)
        .with_max_input_chars(config.max_input_chars)
        .with_openai_base_url(&config.openai_base_url)
        .with_anthropic_base_url(&config.anthropic_base_url);
    info!("Summarizing with model {}", summarizer.model());

    let service = Arc::new(TranscriptService::new(fetcher, summarizer).with_retry(config.retry));
    let app = ytsum::http::create_router(service);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
