pub mod list;
pub mod runtime;
pub mod state;
pub mod view;

pub use runtime::{Discovery, PickerTui};
pub use state::{Effect, PickerEvent, PickerOutcome, PickerState, Step};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::utils::tui_writer::LogEntry;

/// Run the interactive picker and report what was chosen.
///
/// When `state` needs no input (everything pre-selected) this returns at once
/// without touching the terminal or starting any discovery.
pub async fn run_picker(
    mut state: PickerState,
    discovery: &Discovery,
    log_rx: mpsc::UnboundedReceiver<LogEntry>,
) -> Result<PickerOutcome> {
    if state.is_finished() {
        return Ok(state.outcome());
    }

    {
        let mut tui = PickerTui::new()?;
        tui.run(&mut state, discovery, log_rx).await?;
        // Terminal is restored here, before anything else writes to it
    }

    Ok(state.outcome())
}
