//! Lakewatch command line entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use lakewatch::cli;
use lakewatch_logging::{init_logging, LogConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lakewatch", about = "Incremental recursive listing for data-lake trees")]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "LAKEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Filesystem prefix remote paths resolve under
    #[arg(long, global = true, default_value = "/", env = "LAKEWATCH_STORE_ROOT")]
    store_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a listing cycle and emit new files as JSON lines
    Scan {
        /// Remote directory to list (overrides the config root)
        #[arg(short, long)]
        root: Option<String>,

        /// Full-match regex applied to file names
        #[arg(short, long)]
        filter: Option<String>,

        /// Descend into subdirectories
        #[arg(long, action = clap::ArgAction::Set)]
        recurse: Option<bool>,

        /// Keep polling on the configured interval
        #[arg(short, long)]
        watch: bool,

        /// Variable for ${name} references in the root path, name=value
        #[arg(long = "var", value_parser = cli::scan::parse_var)]
        vars: Vec<(String, String)>,
    },

    /// Fetch a remote file's content
    Fetch {
        /// Remote path of the file
        path: String,

        /// Local destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a file into a remote directory
    Put {
        /// Remote directory to write into
        directory: String,

        /// Local file to upload (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Name of the created file (defaults to the input file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Inspect or clear stored listing progress
    Cursor {
        #[command(subcommand)]
        action: CursorAction,
    },
}

#[derive(Subcommand, Debug)]
enum CursorAction {
    /// Show the stored watermark
    Status,
    /// Discard stored progress so the next scan lists everything
    Reset,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_logging(LogConfig {
        app_name: "lakewatch",
        verbose: args.verbose,
    })?;

    let mut config = cli::load_config(args.config.as_ref())?;

    match args.command {
        Commands::Scan {
            root,
            filter,
            recurse,
            watch,
            vars,
        } => {
            if let Some(root) = root {
                config.root_path = root;
            }
            if let Some(filter) = filter {
                config.filter_pattern = filter;
            }
            if let Some(recurse) = recurse {
                config.recurse = recurse;
            }
            cli::scan::run(cli::scan::ScanArgs {
                config,
                store_root: args.store_root,
                vars,
                watch,
            })
        }
        Commands::Fetch { path, output } => cli::transfer::fetch(cli::transfer::FetchArgs {
            store_root: args.store_root,
            path,
            output,
        }),
        Commands::Put {
            directory,
            input,
            name,
        } => cli::transfer::put(cli::transfer::PutArgs {
            store_root: args.store_root,
            directory,
            name,
            input,
        }),
        Commands::Cursor { action } => {
            let args = cli::cursor::CursorArgs { config };
            match action {
                CursorAction::Status => cli::cursor::status(args),
                CursorAction::Reset => cli::cursor::reset(args),
            }
        }
    }
}
