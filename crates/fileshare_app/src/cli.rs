use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fileshare_engine::ProgressMode;
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(author, version, about = "Command line client for the fileshare server")]
pub struct Cli {
    /// Settings file; `fileshare.ron` in the working directory when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Server API root, e.g. http://localhost:6061/api/
    #[arg(long, global = true)]
    pub server: Option<String>,
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    pub log: LogDestination,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the files stored on the server
    List,
    /// Upload local files
    Upload(UploadArgs),
    /// Download files by name, one by one or as a single zip
    Download(DownloadArgs),
    /// Delete files on the server
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Progress reporting: a fixed midpoint or streamed byte counts
    #[arg(long, value_enum)]
    pub progress: Option<ProgressChoice>,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[arg(required_unless_present = "all")]
    pub names: Vec<String>,
    /// Select every file the server lists
    #[arg(long, conflicts_with = "names")]
    pub all: bool,
    /// Fetch the selection as one zip archive
    #[arg(long)]
    pub zip: bool,
    /// Directory downloads are written to
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(required_unless_present = "all")]
    pub names: Vec<String>,
    #[arg(long, conflicts_with = "names")]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ProgressChoice {
    Coarse,
    Streaming,
}

impl From<ProgressChoice> for ProgressMode {
    fn from(choice: ProgressChoice) -> Self {
        match choice {
            ProgressChoice::Coarse => ProgressMode::Coarse,
            ProgressChoice::Streaming => ProgressMode::Streaming,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
