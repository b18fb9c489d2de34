use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use notebook_files::config::{Command, Config};
use notebook_files::{paths, CellConfig, FileManager, FileManagerError, SaveRequest};

fn main() -> ExitCode {
    let (config, command) = match Config::from_args_and_env() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if let Some(path) = &config.config_path {
        log::debug!("Using config file {}", path.display());
    }

    match run(&config, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<FileManagerError>() {
                Some(err) => eprintln!("error ({}): {:#}", err.status().code(), e),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::New { path } => {
            let target = paths::canonicalize(&path);
            if target.exists() {
                bail!("{} already exists", target.display());
            }
            let mut manager = FileManager::new(config.default_width);
            manager.save(SaveRequest {
                codes: vec![String::new()],
                names: vec!["__".to_string()],
                configs: vec![CellConfig::default()],
                filename: path,
                persist: true,
                ..SaveRequest::default()
            })?;
            println!("{}", target.display());
        }
        Command::Show { path } => {
            let manager = open_named(&path, config)?;
            println!("{}", manager.read_raw()?);
        }
        Command::Preview { path } => {
            let manager = FileManager::load(Some(path.as_path()), config.default_width);
            print!("{}", manager.to_text());
        }
        Command::Rename { from, to } => {
            let mut manager = open_named(&from, config)?;
            manager.rename(&to)?;
            if let Some(path) = manager.filename() {
                println!("{}", path.display());
            }
        }
        Command::Copy {
            source,
            destination,
        } => {
            let name = FileManager::default().copy(&source, &destination)?;
            println!("{}", name);
        }
        Command::Config { path, settings } => {
            let partial = parse_settings(&settings)?;
            let mut manager = open_named(&path, config)?;
            manager.update_config(&partial)?;
            log::info!("Updated {} config keys in {}", partial.len(), path.display());
        }
        Command::Assets { path } => {
            let manager = open_named(&path, config)?;
            let app_config = &manager.document().config;

            print_asset("css", app_config.css_file.as_deref(), manager.read_css_file().is_some());
            print_asset(
                "html head",
                app_config.html_head_file.as_deref(),
                manager.read_html_head_file().is_some(),
            );
            print_asset(
                "layout",
                app_config.layout_file.as_deref(),
                manager.read_layout_config().is_some(),
            );
        }
    }
    Ok(())
}

fn open_named(path: &Path, config: &Config) -> Result<FileManager> {
    let manager = FileManager::load(Some(path), config.default_width);
    if !manager.is_named() {
        bail!("{} is not a notebook", path.display());
    }
    Ok(manager)
}

/// `key=value` pairs; values are JSON, falling back to plain strings
fn parse_settings(settings: &[String]) -> Result<Map<String, Value>> {
    let mut partial = Map::new();
    for setting in settings {
        let (key, raw) = setting
            .split_once('=')
            .with_context(|| format!("Expected key=value, got '{}'", setting))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        partial.insert(key.trim().to_string(), value);
    }
    Ok(partial)
}

fn print_asset(label: &str, reference: Option<&str>, found: bool) {
    match reference {
        Some(name) if found => println!("{}: {}", label, name),
        Some(name) => println!("{}: {} (missing)", label, name),
        None => println!("{}: -", label),
    }
}
