// muxpick library
// Fuzzy project/layout picker that creates or attaches tmux sessions

pub mod cli;
pub mod core;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use self::core::{Config, DiscoveryError, LaunchError, Layout, LayoutStore, ProjectFinder};
pub use tui::{PickerOutcome, PickerState};

// Error handling
pub use anyhow::{Error, Result};
