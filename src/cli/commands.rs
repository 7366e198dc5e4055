use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "muxpick")]
#[command(about = "Pick a git project and a layout, then open it in tmux", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Skip project selection and use this directory
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,
    /// Skip layout selection and use this layout
    #[arg(short, long, global = true)]
    pub layout: Option<String>,
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Write logs to this file instead of the picker footer
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write the default config and install the bundled layout scripts
    Init,
    /// List available layouts
    Layouts,
}
