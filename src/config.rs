//! Configuration management for the notebook file tool.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional user config file (`~/.config/nbfile/config.toml`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::document::Width;

/// Command-line arguments for `nbfile`
#[derive(Debug, Parser)]
#[command(name = "nbfile")]
#[command(about = "Create, rename, copy and configure notebook files")]
#[command(version)]
pub struct Args {
    /// Width for notebooks created from scratch
    #[arg(long, global = true, help = "Default width (compact, medium, full, columns)")]
    pub width: Option<Width>,

    /// Alternate config file
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty notebook
    New { path: String },
    /// Print the notebook file as stored on disk
    Show { path: PathBuf },
    /// Print the notebook as it would be generated from memory
    Preview { path: PathBuf },
    /// Move a notebook, converting formats when the extension changes
    Rename { from: PathBuf, to: String },
    /// Copy a notebook file
    Copy { source: PathBuf, destination: PathBuf },
    /// Update app config keys, e.g. `width=full` or `css_file=null`
    Config {
        path: PathBuf,
        #[arg(required = true)]
        settings: Vec<String>,
    },
    /// Print the side files a notebook references
    Assets { path: PathBuf },
}

/// Contents of the user config file
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub notebook: NotebookSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotebookSection {
    pub default_width: Option<Width>,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Width for new notebooks: CLI, then config file, then unset
    pub default_width: Option<Width>,
    /// Log level
    pub log_level: String,
    /// Config file that was consulted, if any existed
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<(Self, Command)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args.command))
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: &Args) -> Result<Self> {
        let candidate = args.config.clone().or_else(default_config_path);

        let (file, config_path) = match candidate {
            Some(path) if path.exists() => (load_config_file(&path)?, Some(path)),
            _ => (ConfigFile::default(), None),
        };

        Ok(Config {
            default_width: args.width.or(file.notebook.default_width),
            log_level: args.log_level.clone(),
            config_path,
        })
    }

    pub fn has_config_file(&self) -> bool {
        self.config_path.is_some()
    }
}

/// `<config dir>/nbfile/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nbfile").join("config.toml"))
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
