use clap::Parser;
use eyre::Result;
use std::path::PathBuf;

use ytsum::orchestrator::{DEFAULT_CHUNK_SIZE, DEFAULT_DEPTH, SummaryOptions};

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize a YouTube video's description, transcript and top comments",
    version,
)]
pub struct Cli {
    /// Summarize this URL (or bare video ID) once and print the JSON result instead of serving HTTP
    pub url: Option<String>,

    /// Transcript chunk size in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub summary_length: usize,

    /// Number of transcript chunks to summarize
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    pub summary_depth: usize,

    /// Config file (default: ~/.config/ytsum/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the front-end page
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// LLM model for summarization
    #[arg(short, long)]
    pub model: Option<String>,

    /// Show configuration details on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// URL and chunking options for one-shot mode; `None` when serving HTTP
    pub fn one_shot(&self) -> Result<Option<(&str, SummaryOptions)>> {
        let Some(url) = self.url.as_deref() else {
            return Ok(None);
        };
        let options = SummaryOptions::new(self.summary_length, self.summary_depth)?;
        Ok(Some((url.trim(), options)))
    }
}
