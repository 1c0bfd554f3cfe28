//! Command-line interface for acp-editor
//!
//! Exit status: 0 on success and for `--help`/`--version`, 1 when loading,
//! analyzing or writing fails, 2 for invalid command-line input.

#[cfg(feature = "cli")]
use clap::{ArgAction, CommandFactory, Parser};

#[cfg(feature = "cli")]
use std::io::IsTerminal;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use tracing::{error, info};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use acp_editor::{AcpEditor, Error, Result};

#[cfg(feature = "cli")]
const EXIT_FAILURE: i32 = 1;
#[cfg(feature = "cli")]
const EXIT_USAGE: i32 = 2;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "acp-editor")]
#[command(author, version, about = "Analyze and edit Alfresco ACP XML exports", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Show help
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    help: Option<bool>,

    /// The ACP xml file to use [REQUIRED]
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<String>,

    /// Print RENDITIONS count, USERS and CUSTOMCONTENT_MODELS (runs before any other operation)
    #[arg(short, long)]
    analyze: bool,

    /// Purge all rendition elements (often thumbnails). Some USERS may only appear in renditions.
    /// The original file is kept as a timestamped backup
    #[arg(short, long)]
    purge: bool,

    /// Rename a user, e.g. 'olduser:newuser', or '*:newuser' for every user.
    /// The original file is kept as a timestamped backup
    #[arg(short, long, value_name = "OLD:NEW")]
    rename: Option<String>,

    /// Print the analysis as JSON
    #[arg(short, long, requires = "analyze")]
    json: bool,
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            error!("Failed to parse command line arguments: {:?}", e.kind());
            eprintln!("{}", e);
            eprint!("{}", Cli::command().render_help());
            std::process::exit(EXIT_USAGE);
        }
    };

    if let Err(e) = run(cli) {
        error!("{}", e);
        let code = match e {
            Error::Validation(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        };
        std::process::exit(code);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<()> {
    let path = required_file(cli.file.as_deref())?;
    let rename = cli.rename.as_deref().map(parse_rename).transpose()?;

    let mut editor = AcpEditor::open(&path)?;

    if cli.analyze {
        let report = editor.analyze();
        if cli.json {
            println!("{}", report.to_json_pretty()?);
        } else {
            print!("{}", report);
        }
    }

    if cli.purge {
        // Purge first so the rename has less to walk
        let summary = editor.purge_renditions();
        info!(
            "Removed {} rendition and {} renditioned elements",
            summary.renditions, summary.renditioned
        );
    }

    if let Some((old_name, new_name)) = &rename {
        let renamed = editor.rename_user(old_name, new_name);
        info!("Renamed {} creator/modifier values to '{}'", renamed, new_name);
    }

    if cli.purge || rename.is_some() {
        let backup = editor.write()?;
        info!("Backup written to {}", backup.display());
    }

    Ok(())
}

/// The `--file` value, rejecting a missing or too-short path
#[cfg(feature = "cli")]
fn required_file(file: Option<&str>) -> Result<PathBuf> {
    match file {
        Some(file) if file.chars().count() >= 2 => Ok(PathBuf::from(file)),
        _ => Err(Error::Validation(
            "Missing --file <arg>, required.".to_string(),
        )),
    }
}

/// Split an `old:new` rename argument on its first colon.
///
/// An empty old name is allowed and matches creators/modifiers with no text.
#[cfg(feature = "cli")]
fn parse_rename(value: &str) -> Result<(String, String)> {
    let malformed = || {
        Error::Validation(
            "The -r requires an argument like 'olduser:newuser' without apostrophes.".to_string(),
        )
    };

    if value.chars().count() < 2 {
        return Err(malformed());
    }
    match value.split_once(':') {
        Some((old, new)) if !new.is_empty() => {
            Ok((old.to_string(), new.to_string()))
        }
        _ => Err(malformed()),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
