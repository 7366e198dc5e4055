//! Error types for discovery and session launch

use std::path::PathBuf;

/// Errors raised while enumerating projects or layouts
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No search tool available (install fd or find)")]
    NoSearchTool,

    /// A single scan root could not be searched; the other roots still count
    #[error("Search of {root} failed: {reason}")]
    DiscoveryFailed { root: PathBuf, reason: String },

    #[error("Failed to read layout directory {path}: {source}")]
    LayoutDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that abort a launch after selection has finished
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Layout '{name}' not found in {dir}")]
    LayoutNotFound { name: String, dir: PathBuf },

    #[error("Layout '{name}' is not executable ({path})")]
    LayoutNotExecutable { name: String, path: PathBuf },

    #[error("Failed to create session '{session}': {reason}")]
    SessionCreateFailed { session: String, reason: String },

    #[error("Failed to attach to session '{session}': {reason}")]
    AttachFailed { session: String, reason: String },
}
