use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "HTTP service that fetches YouTube transcripts and summarizes them",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Address to listen on [default: 127.0.0.1:5000]
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Config file [default: ~/.config/ytsum/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// LLM model for summarization [default: gpt-3.5-turbo]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Preferred caption language [default: en]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}
