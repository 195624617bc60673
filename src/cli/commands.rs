use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tt", about = concat!("treetable v", env!("CARGO_PKG_VERSION"), " - hierarchical task table"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: treetable.toml next to the task file)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the task tree
    Tree(TreeArgs),
    /// Toggle selections and print the selection payload
    Select(SelectArgs),
    /// Reorder a task within its sibling group
    Mv(MvArgs),
    /// Report records that were dropped and structural problems
    Check(CheckArgs),
    /// Interactive session that follows the task file as it changes
    Session(SessionArgs),
}

#[derive(Args)]
pub struct TreeArgs {
    /// Task file (JSON array of tasks)
    pub file: PathBuf,
    /// Expand every node
    #[arg(long)]
    pub expand_all: bool,
    /// Expand these task IDs
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,
    /// Toggle these task IDs before rendering
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Task file
    pub file: PathBuf,
    /// Task IDs to toggle, in order
    #[arg(required_unless_present = "all")]
    pub ids: Vec<String>,
    /// Toggle "select all" instead
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

#[derive(Args)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["up", "down", "onto"])))]
pub struct MvArgs {
    /// Task file
    pub file: PathBuf,
    /// Task ID to move
    pub id: String,
    /// Move one step up
    #[arg(long)]
    pub up: bool,
    /// Move one step down
    #[arg(long)]
    pub down: bool,
    /// Drop at this sibling's position
    #[arg(long)]
    pub onto: Option<String>,
    /// Apply the changes to the task file
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Task file
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SessionArgs {
    /// Task file
    pub file: PathBuf,
    /// Don't watch the file; only `reload` re-reads it
    #[arg(long)]
    pub no_watch: bool,
}
