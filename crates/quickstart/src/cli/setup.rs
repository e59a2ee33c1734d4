use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "quickstart",
    bin_name = "quickstart",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Notes, todos and workspaces from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to QUICKSTART_DATA_DIR or the platform data dir)
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory and report migration results
    #[command(display_order = 1)]
    Init,

    /// Work with notes in a workspace
    #[command(subcommand, alias = "n", display_order = 2)]
    Notes(NotesCommands),

    /// Manage workspaces
    #[command(subcommand, alias = "workspace", display_order = 3)]
    Ws(WsCommands),

    /// Daily todo lists
    #[command(subcommand, alias = "t", display_order = 4)]
    Todos(TodosCommands),

    /// Read or change UI settings stored in config.json
    #[command(subcommand, display_order = 5)]
    Config(ConfigCommands),

    /// Storage locations and bulk clearing
    #[command(subcommand, display_order = 6)]
    Storage(StorageCommands),
}

/// Workspace selection shared by note commands.
#[derive(Args, Debug, Clone, Default)]
pub struct WsArg {
    /// Workspace id (defaults to the active workspace)
    #[arg(long = "ws", value_name = "ID")]
    pub ws: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum NotesCommands {
    /// List notes
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        ws: WsArg,

        /// Include deleted notes
        #[arg(long)]
        deleted: bool,
    },

    /// Create or update a note (content from argument or stdin)
    Save {
        #[command(flatten)]
        ws: WsArg,

        /// Update the note with this id instead of creating one
        #[arg(long)]
        id: Option<String>,

        /// Title (defaults to the first content line)
        #[arg(short, long)]
        title: Option<String>,

        /// Tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Status icon
        #[arg(long)]
        icon: Option<String>,

        /// Content; read from stdin when omitted
        content: Option<String>,
    },

    /// Print a note's content
    #[command(alias = "v")]
    Show {
        #[command(flatten)]
        ws: WsArg,
        id: String,
    },

    /// Soft-delete a note
    #[command(alias = "rm")]
    Delete {
        #[command(flatten)]
        ws: WsArg,
        id: String,
    },

    /// Bring back a deleted note
    Restore {
        #[command(flatten)]
        ws: WsArg,
        id: String,
    },

    /// Set or clear a note's status icon
    Icon {
        #[command(flatten)]
        ws: WsArg,
        id: String,
        /// Icon to set; omit to clear
        icon: Option<String>,
    },

    /// Copy a file into the workspace's attachments
    Attach {
        #[command(flatten)]
        ws: WsArg,
        path: PathBuf,
        /// Stored name (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Export notes as Markdown (one note with --id, or a date range)
    Export {
        #[command(flatten)]
        ws: WsArg,

        /// Export a single note
        #[arg(long, conflicts_with_all = ["from", "to"])]
        id: Option<String>,

        /// First day (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WsCommands {
    /// List workspaces (the active one is marked)
    #[command(alias = "ls")]
    List,

    /// Create a workspace
    Create {
        name: String,
        #[arg(long, default_value = "#6366f1")]
        color: String,
    },

    /// Rename a workspace (moves its folder)
    Rename {
        id: String,
        name: String,
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove a workspace from the registry (files stay on disk)
    #[command(alias = "rm")]
    Delete { id: String },

    /// Make a workspace the active one
    Use { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TodosCommands {
    /// Show the todos of a day (default: today)
    Show { date: Option<String> },

    /// Per-day counts for a month (default: this month)
    Summary { month: Option<String> },

    /// Add a todo
    Add {
        /// Day (default: today)
        #[arg(long)]
        date: Option<String>,
        content: String,
    },

    /// Export the todos of a date range as Markdown task lists
    Export {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Mark a todo as done
    Done {
        id: String,
        /// Day (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config, or a single key
    Get { key: Option<String> },

    /// Set a UI setting (VALUE is parsed as JSON, falling back to a string)
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
pub enum StorageCommands {
    /// Show or change the workspaces root
    Root {
        /// New root directory
        #[arg(conflicts_with = "reset")]
        path: Option<PathBuf>,
        /// Go back to the default location
        #[arg(long)]
        reset: bool,
        /// Move existing workspaces along
        #[arg(long)]
        migrate: bool,
    },

    /// Show or change the global todos directory
    #[command(name = "todos-path")]
    TodosPath {
        #[arg(conflicts_with = "reset")]
        path: Option<PathBuf>,
        #[arg(long)]
        reset: bool,
        #[arg(long)]
        migrate: bool,
    },

    /// Archive and remove all notes of a workspace
    #[command(name = "clear-notes")]
    ClearNotes {
        #[command(flatten)]
        ws: WsArg,
        /// Required: confirms the operation
        #[arg(long)]
        yes: bool,
    },

    /// Archive and remove all todos
    #[command(name = "clear-todos")]
    ClearTodos {
        #[arg(long)]
        yes: bool,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
