// Command handlers

use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::core::config::default_config_file;
use crate::core::{launch, LayoutStore, ProjectFinder, TmuxGateway};
use crate::tui::{run_picker, Discovery, PickerOutcome, PickerState};
use crate::utils::path::canonicalize_path;
use crate::utils::tui_writer::LogEntry;
use crate::{Config, Result};

pub struct PickParams {
    pub config: Config,
    pub path: Option<PathBuf>,
    pub layout: Option<String>,
    pub log_rx: mpsc::UnboundedReceiver<LogEntry>,
}

/// Pick a project and layout, then create or attach the tmux session.
/// Does not return on a successful attach.
pub async fn pick_and_launch(params: PickParams) -> Result<()> {
    let PickParams {
        config,
        path,
        layout,
        log_rx,
    } = params;

    if which::which("tmux").is_err() {
        anyhow::bail!("tmux is not installed or not on PATH");
    }

    let project = match path {
        Some(path) => {
            let project = canonicalize_path(&path)?;
            if !project.is_dir() {
                anyhow::bail!("Project path {} is not a directory", project.display());
            }
            Some(project)
        }
        None => None,
    };

    let layouts = LayoutStore::new(&config.layouts_dir);
    let discovery = Discovery {
        finder: ProjectFinder::new(config.scan_paths.clone(), config.exclude_patterns.clone()),
        layouts: layouts.clone(),
    };
    let state = PickerState::new(project, layout, Some(config.default_layout.clone()));

    let (project, layout) = match run_picker(state, &discovery, log_rx).await? {
        PickerOutcome::Selected { project, layout } => (project, layout),
        PickerOutcome::Cancelled => {
            tracing::debug!("Picker cancelled");
            return Ok(());
        }
        PickerOutcome::Failed(message) => anyhow::bail!(message),
    };

    tracing::info!("Launching {} with layout {}", project.display(), layout);
    let gateway = TmuxGateway::from_config(&config.tmux)?;
    match launch(&gateway, &layouts, &project, &layout) {
        Ok(never) => match never {},
        Err(e) => Err(e.into()),
    }
}

/// Write the config (unless one exists) and install the default layouts
pub async fn init(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path
        .or_else(default_config_file)
        .ok_or_else(|| anyhow::anyhow!("Could not determine a config directory"))?;

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        config.save_to(&config_path)?;
        println!("Wrote config to {}", config_path.display());
    }

    let store = LayoutStore::new(&config.layouts_dir);
    let installed = store.install_defaults()?;
    if installed.is_empty() {
        println!("Default layouts already present in {}", store.dir().display());
    } else {
        println!(
            "Installed layouts {} in {}",
            installed.join(", "),
            store.dir().display()
        );
    }
    Ok(())
}

pub async fn list_layouts(config: Config) -> Result<()> {
    let layouts = LayoutStore::new(&config.layouts_dir).list()?;

    if layouts.is_empty() {
        println!("No layouts found. Run 'muxpick init' to install the default layouts.");
        return Ok(());
    }

    println!("Available layouts:");
    for layout in layouts {
        let marker = if layout.name == config.default_layout {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}\t{}", layout.name, marker, layout.path.display());
    }
    Ok(())
}
