use anyhow::Result;
use clap::{Args, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

use cadenza_library::{config, CollisionPolicy, Config, Transfer};

mod commands;
mod logging;
mod progress;

#[derive(Debug, Parser)]
#[command(name = "cadenza", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.config/cadenza/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Where to find the files to work on.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Source directory (default: the `source` setting)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// How deep to look for files; 1 means only the source directory itself
    #[arg(long)]
    pub depth: Option<usize>,
}

/// Where files go in the library.
#[derive(Debug, Clone, Default, Args)]
pub struct DestArgs {
    /// Destination (library) directory (default: the `destination` setting)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// What to do when the file already exists in the library
    #[arg(long, value_enum)]
    pub on_collision: Option<CollisionArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    Skip,
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Skip => Self::Skip,
            CollisionArg::Overwrite => Self::Overwrite,
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Embed artist artwork into music files
    ///
    /// For every MP3 under the source directory, reads the artist tag, cuts
    /// it down to the lead artist ("A & B ft. C" becomes "A") and looks that
    /// artist up on Discogs. The artist's primary image becomes the file's
    /// front cover; an existing front cover is replaced.
    ///
    /// Each artist is looked up once per run, so all tracks by the same
    /// artist get identical artwork. Files without an artist tag, or whose
    /// artist has no image, are skipped with a warning.
    ///
    /// Requires Discogs credentials: set discogs_token in the config file or
    /// CADENZA_DISCOGS_TOKEN in the environment.
    Art {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Set artist and title tags from file names
    ///
    /// Files must be named "Artist - Title.mp3". Before parsing, featuring
    /// markers are normalized ("feat.", "featuring", "Ft" all become "ft.")
    /// and the file is renamed if its name changed.
    ///
    /// Names without exactly one " - " separator, with an empty side, or
    /// matching the invalid_pattern setting are skipped. With
    /// quarantine_invalid on (the default) they are moved into
    /// <source>/_invalid.
    ///
    /// Running id3 twice leaves the files unchanged.
    Id3 {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Copy music files into the library
    ///
    /// Each file is copied to <destination>/<artist>/<file name>, where the
    /// artist comes from the file's tag. The source file and its
    /// modification time are kept. The destination directory must exist.
    ///
    /// By default existing files are left alone; use --on-collision
    /// overwrite to replace them.
    Copy {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        dest: DestArgs,
    },

    /// Move music files into the library
    ///
    /// Like copy, but the source file is removed once it is in place.
    #[command(name = "move")]
    Move {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        dest: DestArgs,
    },

    /// Run id3, art and copy in sequence
    ///
    /// Each step only handles the files the previous step accepted.
    All {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        dest: DestArgs,
    },

    /// List or copy library files modified after a date
    ///
    /// Finds MP3 files under the library (or --root) whose modification
    /// time is strictly later than midnight UTC of the given date. The date
    /// is written dd/mm/yy or YYYY-MM-DD.
    ///
    /// Without --copy-to the files are listed relative to the root. With
    /// --copy-to they are copied there, laid out by artist like the library.
    Uploads {
        /// Threshold date (dd/mm/yy or YYYY-MM-DD)
        #[arg(long)]
        since: String,

        /// Directory to search (default: the `destination` setting)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Copy the files into this directory instead of listing them
        #[arg(long)]
        copy_to: Option<PathBuf>,

        /// What to do when a file already exists in --copy-to
        #[arg(long, value_enum)]
        on_collision: Option<CollisionArg>,
    },

    /// Set the default source directory
    #[command(name = "set_source", visible_alias = "set-source")]
    SetSource {
        /// Directory holding new downloads
        path: Option<String>,
    },

    /// Set the default destination (library) directory
    #[command(name = "set_dest", visible_alias = "set-dest")]
    SetDest {
        /// Library root
        path: Option<String>,
    },

    /// Delete the debug log file
    Clear,

    /// Show debug log file information
    #[command(name = "log_info", visible_alias = "log-info")]
    LogInfo,

    /// Turn debug logging off
    #[command(name = "log_off", visible_alias = "log-off")]
    LogOff,

    /// Turn debug logging on
    #[command(name = "log_on", visible_alias = "log-on")]
    LogOn,

    /// Show all settings and log file information
    Settings,

    /// Show detailed help for art
    #[command(name = "art_help", visible_alias = "art-help")]
    ArtHelp,

    /// Show detailed help for id3
    #[command(name = "id3_help", visible_alias = "id3-help")]
    Id3Help,

    /// Show detailed help for copy
    #[command(name = "copy_help", visible_alias = "copy-help")]
    CopyHelp,

    /// Show detailed help for move
    #[command(name = "move_help", visible_alias = "move-help")]
    MoveHelp,

    /// Show detailed help for uploads
    #[command(name = "uploads_help", visible_alias = "uploads-help")]
    UploadsHelp,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Create the config file with commented defaults
    Init,
    /// Show the config file path
    Path,
    /// Print an example config file
    Example,
    /// Set a config value
    Set {
        /// Config key (e.g. discogs_token, on_collision)
        key: String,
        /// New value
        value: String,
    },
    /// Remove a config value so its default applies again
    Unset {
        /// Config key
        key: String,
    },
}

/// Print the long help of one subcommand.
fn print_command_help(name: &str) -> Result<()> {
    let mut cli = Cli::command();
    match cli.find_subcommand_mut(name) {
        Some(sub) => sub.print_long_help()?,
        None => anyhow::bail!("No such command: {name}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::config_file_path);

    match &cli.command {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Init => commands::config::init_config(&config_path),
                ConfigAction::Path => commands::config::show_path(&config_path),
                ConfigAction::Example => commands::config::show_example(),
                ConfigAction::Set { key, value } => {
                    commands::config::set_config(&config_path, key, value)
                }
                ConfigAction::Unset { key } => commands::config::unset_config(&config_path, key),
            };
        }
        Commands::ArtHelp => return print_command_help("art"),
        Commands::Id3Help => return print_command_help("id3"),
        Commands::CopyHelp => return print_command_help("copy"),
        Commands::MoveHelp => return print_command_help("move"),
        Commands::UploadsHelp => return print_command_help("uploads"),
        Commands::SetSource { path: None } => return print_command_help("set_source"),
        Commands::SetDest { path: None } => return print_command_help("set_dest"),
        _ => {}
    }

    let config = Config::load_from(&config_path)?;
    logging::init(&config)?;
    log::debug!("Loaded configuration from {}", config_path.display());

    match cli.command {
        Commands::Art { source } => commands::artwork::run_art(&config, &source)?,
        Commands::Id3 { source } => commands::retag::run_id3(&config, &source)?,
        Commands::Copy { source, dest } => {
            commands::organize::run_transfer(&config, &source, &dest, Transfer::Copy)?;
        }
        Commands::Move { source, dest } => {
            commands::organize::run_transfer(&config, &source, &dest, Transfer::Move)?;
        }
        Commands::All { source, dest } => commands::organize::run_all(&config, &source, &dest)?,
        Commands::Uploads {
            since,
            root,
            copy_to,
            on_collision,
        } => commands::uploads::run_uploads(
            &config,
            &since,
            root.as_deref(),
            copy_to.as_deref(),
            on_collision,
        )?,
        Commands::SetSource { path: Some(path) } => {
            commands::settings::set_dir(&config_path, "source", &path)?;
        }
        Commands::SetDest { path: Some(path) } => {
            commands::settings::set_dir(&config_path, "destination", &path)?;
        }
        Commands::Clear => commands::logfile::clear(&config)?,
        Commands::LogInfo => commands::logfile::show_info(&config),
        Commands::LogOff => commands::logfile::set_enabled(&config_path, false)?,
        Commands::LogOn => commands::logfile::set_enabled(&config_path, true)?,
        Commands::Settings => commands::settings::show_settings(&config, &config_path)?,
        Commands::Config { .. }
        | Commands::ArtHelp
        | Commands::Id3Help
        | Commands::CopyHelp
        | Commands::MoveHelp
        | Commands::UploadsHelp
        | Commands::SetSource { path: None }
        | Commands::SetDest { path: None } => {}
    }

    Ok(())
}
