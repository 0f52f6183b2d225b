//! retro-props CLI
//!
//! Command-line interface for inspecting the headers of disc and cartridge
//! images.

mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use retro_props_lib::{Platform, Settings, create_context};

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "retro-props", version)]
#[command(about = "Show header properties of disc and cartridge images", long_about = None)]
struct Cli {
    /// Show debug output (detection decisions, container geometry)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode and print the properties of one or more images
    Analyze {
        /// Image files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Quick mode: skip whole-file checksum passes
        #[arg(short, long)]
        quick: bool,

        /// Do not decode the ISO-9660 volume embedded in Xbox discs
        #[arg(long)]
        no_recurse_iso: bool,

        /// Skip auto-detection and use this console's analyzer (e.g., snes, gc, xbox)
        #[arg(short, long)]
        console: Option<Platform>,

        /// Print one JSON report per file instead of the field tree
        #[arg(long)]
        json: bool,
    },

    /// List all supported formats in detection order
    List,

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective settings
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with default values if none exists
    Init,
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            files,
            quick,
            no_recurse_iso,
            console,
            json,
        } => {
            let ctx = create_context();
            let settings = load_settings();
            let mut options = settings.analysis_options();
            if quick {
                options = options.quick(true);
            }
            if no_recurse_iso {
                options = options.recurse_iso(false);
            }
            commands::analyze::run_analyze(&ctx, &files, console, &options, json)
        }
        Commands::List => {
            commands::list::run_list(&create_context());
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::Init => commands::config::run_config_init(),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

/// Load settings, falling back to defaults if the file is unreadable.
fn load_settings() -> Settings {
    match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Ignoring settings file: {}", e);
            Settings::default()
        }
    }
}
