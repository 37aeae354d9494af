//! notedeck - A terminal viewer for a fixed, ordered deck of markdown notes.
//!
//! # Usage
//!
//! ```bash
//! notedeck notes/Intro.md notes/Setup.md notes/Usage.md
//! notedeck --manifest deck.txt --root notes
//! notedeck --default-theme dark --export-dir ~/Downloads --save
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use notedeck::app::App;
use notedeck::catalog::Catalog;
use notedeck::config::{
    ConfigFlags, ThemeMode, clear_config_flags, default_log_path, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, preferences_path,
    save_config_flags,
};
use notedeck::pipeline::FsFetcher;
use notedeck::prefs::{FileStorage, MemoryStorage, Preferences};

/// A terminal viewer for a fixed, ordered deck of markdown notes
#[derive(Parser, Debug)]
#[command(name = "notedeck", version, about, long_about = None)]
struct Cli {
    /// Documents to show, in deck order
    #[arg(value_name = "FILE", required_unless_present_any = ["manifest", "save", "clear"])]
    files: Vec<String>,

    /// Read the deck from a file, one identifier per line
    #[arg(long, value_name = "PATH", conflicts_with = "files")]
    manifest: Option<PathBuf>,

    /// Directory identifiers are resolved against
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Theme used until one is chosen in the viewer
    #[arg(long, value_enum, value_name = "MODE")]
    default_theme: Option<ThemeMode>,

    /// Directory exported images and PDFs are written to
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Write logs to this file instead of the config directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Keep theme and sidebar width for this session only
    #[arg(long)]
    no_persist: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_catalog(cli: &Cli) -> Result<Catalog> {
    match &cli.manifest {
        Some(manifest) => Catalog::from_manifest(manifest)
            .with_context(|| format!("Failed to load manifest {}", manifest.display())),
        None => Catalog::new(cli.files.iter().cloned()).context("Invalid document list"),
    }
}

/// Identifiers in a manifest are relative to the manifest unless `--root` says otherwise.
fn document_root(cli: &Cli) -> PathBuf {
    if let Some(root) = &cli.root {
        return root.clone();
    }
    cli.manifest
        .as_deref()
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }
    if cli.files.is_empty() && cli.manifest.is_none() {
        return Ok(());
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let log_path = effective.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    let catalog = load_catalog(&cli)?;
    let root = document_root(&cli);
    tracing::info!(documents = catalog.len(), root = %root.display(), "starting");

    let preferences = if effective.no_persist {
        Preferences::new(MemoryStorage::default())
    } else {
        Preferences::new(FileStorage::open(preferences_path()))
    };

    let mut app = App::new(catalog, Arc::new(FsFetcher::new(root)))
        .with_preferences(preferences)
        .with_export_dir(effective.export_dir.unwrap_or_else(|| PathBuf::from(".")))
        .with_default_theme(effective.default_theme.and_then(ThemeMode::theme))
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
