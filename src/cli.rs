use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Override the configured bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}
