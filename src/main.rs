use std::path::PathBuf;
use std::sync::Arc;

use eyre::Result;
use log::{debug, info};

mod cli;

use cli::Cli;
use ytsum::config::Config;
use ytsum::metadata::DataApiClient;
use ytsum::orchestrator::Orchestrator;
use ytsum::summarize::LlmSummarizer;
use ytsum::youtube::CaptionClient;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();

    // CLI flags take priority
    if cli.host.is_some() {
        config.host = cli.host.clone();
    }
    if cli.port.is_some() {
        config.port = cli.port;
    }
    if cli.static_dir.is_some() {
        config.static_dir = cli.static_dir.clone();
    }
    if cli.model.is_some() {
        config.model = cli.model.clone();
    }
    Ok(config)
}

fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let client = reqwest::Client::new();

    let metadata = DataApiClient::new(client.clone(), config.youtube_api_key()?);
    let transcripts = CaptionClient::new(client.clone(), config.lang());
    let mut summarizer = LlmSummarizer::new(
        client,
        config.summarizer_backend()?,
        config.model(),
        config.max_tokens(),
    );
    if let Some(base_url) = &config.llm_base_url {
        summarizer = summarizer.with_base_url(base_url.as_str());
    }
    debug!("Summarizer model: {}", summarizer.model());

    Ok(
        Orchestrator::new(Arc::new(metadata), Arc::new(transcripts), Arc::new(summarizer))
            .with_comment_count(config.comment_count()),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = <Cli as clap::Parser>::parse();
    let config = load_config(&cli)?;

    if cli.verbose {
        let config_path = cli.config.clone().unwrap_or_else(ytsum::config::config_path);
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Model: {}", config.model());
        eprintln!("Logs: {}", log_dir().join("ytsum.log").display());
    }

    let orchestrator = build_orchestrator(&config)?;

    if let Some((url, options)) = cli.one_shot()? {
        // The command line also takes a bare video ID
        let payload = if ytsum::is_video_id(url) {
            orchestrator.summarize_video(url, options).await?
        } else {
            orchestrator.summarize_url(url, options).await?
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let addr = config.bind_addr()?;
    let static_dir = config.static_dir();
    if cli.verbose {
        eprintln!("Serving http://{addr} (static files from {})", static_dir.display());
    }

    let app = ytsum::server::router(Arc::new(orchestrator), &static_dir);
    ytsum::server::serve(addr, app).await
}
