use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::expand_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan_paths: Vec<PathBuf>,
    pub exclude_patterns: Vec<String>,
    pub default_layout: String,
    pub layouts_dir: PathBuf,
    pub tmux: TmuxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmuxConfig {
    /// Command used to attach from outside tmux; the session name is appended
    pub attach_command: String,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        TmuxConfig {
            attach_command: "tmux attach -t".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let layouts_dir = config_dir()
            .map(|dir| dir.join("layouts"))
            .unwrap_or_else(|| PathBuf::from(".muxpick/layouts"));

        let exclude_patterns = [
            "Library",
            "Applications",
            ".Trash",
            ".cache",
            ".npm",
            ".yarn",
            "node_modules",
            ".svn",
            "dist",
            "build",
            "target",
            "vendor",
            ".venv",
            "__pycache__",
        ]
        .iter()
        .map(|p| p.to_string())
        .collect();

        Config {
            scan_paths: vec![home],
            exclude_patterns,
            default_layout: "editor-agent".to_string(),
            layouts_dir,
            tmux: TmuxConfig::default(),
        }
    }
}

/// Directory holding `config.toml` and, by default, the layout scripts
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "muxpick", "muxpick")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of the config file
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

impl Config {
    /// Load from the default location, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        match default_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config.expanded())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // `~/` is accepted in hand-written configs
    fn expanded(mut self) -> Self {
        self.scan_paths = self.scan_paths.iter().map(|p| expand_home(p)).collect();
        self.layouts_dir = expand_home(&self.layouts_dir);
        self
    }
}
