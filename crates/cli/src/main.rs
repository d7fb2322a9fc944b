use anyhow::Result;
use binary_bookmarks::commands::{
    add_binary_command, add_bookmark_command, export_bookmarks_command, goto_bookmark_command,
    init_project_command, list_binaries_command, list_bookmarks_command, project_info_command,
    remove_bookmark_command, rename_bookmark_command, ExportFormat,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Address bookmarks for binaries under analysis.
///
/// This CLI is a thin wrapper around `bookmark-core` (exposed in code as `bookmark_core`).
/// It plays the part of a disassembler host: each bookmark command opens the
/// binary in a headless view, attaches the bookmarks panel, and drives it.
#[derive(Parser, Debug)]
#[command(
    name = "binary-bookmarks",
    version,
    about = "Address bookmarks for binaries under analysis",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new bookmarks project at the given root.
    ///
    /// This will:
    /// - Create a `.bookmarks` metadata directory and an `exports` directory.
    /// - Write a `.bookmarks/project.json` config file.
    /// - Create the project database.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Register a binary in the project database.
    ///
    /// Bookmarks are stored per registered binary, keyed by its name.
    AddBinary {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the binary to register.
        #[arg(long)]
        path: String,

        /// Optional human-friendly name. Defaults to the file name.
        #[arg(long)]
        name: Option<String>,

        /// Optional architecture hint (e.g., armv7, x86_64).
        #[arg(long)]
        arch: Option<String>,

        /// Optional precomputed hash. Computed as SHA-256 unless `--skip-hash` is set.
        #[arg(long)]
        hash: Option<String>,

        /// Skip hash computation (stores no hash).
        #[arg(long, default_value_t = false)]
        skip_hash: bool,
    },

    /// List all binaries registered in the project database.
    ListBinaries {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the bookmarks of a binary with their symbol context.
    List {
        #[arg(long, default_value = ".")]
        root: String,

        /// Registered binary name.
        #[arg(long)]
        binary: String,

        /// Emit JSON (rows with colored spans) instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Bookmark an address.
    Add {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        binary: String,

        /// Address as 0x-prefixed hex or decimal.
        #[arg(long)]
        address: String,

        #[arg(long)]
        label: String,
    },

    /// Rename the bookmark at a row.
    Rename {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        binary: String,

        /// Zero-based row as shown by `list`.
        #[arg(long)]
        row: usize,

        #[arg(long)]
        label: String,
    },

    /// Remove the bookmark at a row.
    Remove {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        binary: String,

        #[arg(long)]
        row: usize,
    },

    /// Jump to the bookmark at a row.
    Goto {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        binary: String,

        #[arg(long)]
        row: usize,
    },

    /// Export a binary's bookmarks to JSON or YAML.
    Export {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        binary: String,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Output file. Defaults to `exports/<binary>.bookmarks.<ext>`.
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::AddBinary { root, path, name, arch, hash, skip_hash } => {
            add_binary_command(&root, &path, name, arch, hash, skip_hash)?
        }
        Command::ListBinaries { root, json } => list_binaries_command(&root, json)?,
        Command::List { root, binary, json } => list_bookmarks_command(&root, &binary, json)?,
        Command::Add { root, binary, address, label } => {
            add_bookmark_command(&root, &binary, &address, &label)?
        }
        Command::Rename { root, binary, row, label } => {
            rename_bookmark_command(&root, &binary, row, &label)?
        }
        Command::Remove { root, binary, row } => remove_bookmark_command(&root, &binary, row)?,
        Command::Goto { root, binary, row } => goto_bookmark_command(&root, &binary, row)?,
        Command::Export { root, binary, format, output } => {
            export_bookmarks_command(&root, &binary, format, output)?
        }
    }

    Ok(())
}
