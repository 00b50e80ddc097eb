use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tw", about = concat!("twig v", env!("CARGO_PKG_VERSION"), " - a nested todo list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Operate on a specific page (default: the last active page)
    #[arg(short = 'p', long = "page", global = true)]
    pub page: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the active page (default when no command is given)
    Show,
    /// Add a top-level task
    Add(AddArgs),
    /// Add a subtask under an existing task
    Sub(SubArgs),
    /// Edit a task's description and/or deadline
    Edit(EditArgs),
    /// Toggle a task's completed state
    Done(IdArg),
    /// Collapse or expand a task's subtasks
    Fold(IdArg),
    /// Delete a task and its subtasks (undo with `tw undo`)
    Rm(IdArg),
    /// Move a task to another task's position within its sibling group
    Mv(MvArgs),
    /// Undo the last delete
    Undo,
    /// Toggle whether completed tasks are shown
    Completed,
    /// List all pages
    Pages,
    /// Manage pages
    Page(PageCmd),
    /// Export the active page (or all pages with --all)
    Export(ExportArgs),
    /// Import a page snapshot (or a full backup with --all)
    Import(ImportArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task description
    pub description: String,
    /// Deadline as YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task id (e.g. 3 or 3.2)
    pub parent: String,
    /// Subtask description
    pub description: String,
    /// Deadline as YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id
    pub id: String,
    /// New description (unchanged if omitted)
    #[arg(long)]
    pub description: Option<String>,
    /// New deadline as YYYY-MM-DD (unchanged if omitted)
    #[arg(long, conflicts_with = "clear_deadline")]
    pub deadline: Option<String>,
    /// Remove the deadline
    #[arg(long)]
    pub clear_deadline: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Task id
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Id of the task to move
    pub dragged: String,
    /// Id of the sibling whose position it should take
    pub target: String,
}

#[derive(Args)]
pub struct PageCmd {
    #[command(subcommand)]
    pub action: PageAction,
}

#[derive(Subcommand)]
pub enum PageAction {
    /// Create a new empty page
    Add { name: String },
    /// Delete a page and its tasks
    Rm { name: String },
    /// Rename a page
    Rename { old: String, new: String },
    /// Switch to a page
    Use { name: String },
    /// Switch to the next page (wraps around)
    Next,
    /// Switch to the previous page (wraps around)
    Prev,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Export every page as a backup bundle
    #[arg(long)]
    pub all: bool,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to read (use `-` for stdin)
    pub file: String,
    /// Treat the file as a backup bundle and replace every page
    #[arg(long)]
    pub all: bool,
    /// Import into this page instead of the active one
    #[arg(long, conflicts_with = "all")]
    pub into: Option<String>,
}
