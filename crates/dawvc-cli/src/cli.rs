use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "daw",
    about = "DAW Version Control: track project state across commits",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a repository in the current directory
    Init,
    /// Stage project snapshots
    Add(AddArgs),
    /// Commit staged snapshots
    Commit(CommitArgs),
    /// Show staged and working-copy changes of a project
    Status(ProjectArgs),
    /// Show changes of a project against its last commit
    Diff(DiffArgs),
    /// Show commit history
    Log(LogArgs),
    /// Show a commit and what it changed
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(required = true)]
    pub projects: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CommitArgs {
    pub message: String,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    pub project: PathBuf,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    pub project: PathBuf,
    /// Compare the staged snapshot instead of the working copy
    #[arg(long)]
    pub staged: bool,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Only the most recent N commits
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Include timestamps and committed paths
    #[arg(long)]
    pub full: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub hash: String,
}
