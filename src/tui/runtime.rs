use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::sync::mpsc;
use tokio::time::Duration;

use super::state::{Effect, PickerEvent, PickerState};
use super::view;
use crate::core::{LayoutStore, ProjectFinder};
use crate::utils::tui_writer::LogEntry;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Where discovery work is sent
#[derive(Debug, Clone)]
pub struct Discovery {
    pub finder: ProjectFinder,
    pub layouts: LayoutStore,
}

impl Discovery {
    /// Run `effect` in the background; its result arrives as one event on `tx`
    pub fn dispatch(&self, effect: Effect, tx: &mpsc::UnboundedSender<PickerEvent>) {
        match effect {
            Effect::LoadProjects => {
                let finder = self.finder.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let event = match finder.find_projects().await {
                        Ok(projects) => PickerEvent::ProjectsLoaded(projects),
                        Err(e) => PickerEvent::Error(e.to_string()),
                    };
                    // The picker may have exited already
                    let _ = tx.send(event);
                });
            }
            Effect::LoadLayouts => {
                let layouts = self.layouts.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let event = match tokio::task::spawn_blocking(move || layouts.list()).await {
                        Ok(Ok(layouts)) => PickerEvent::LayoutsLoaded(layouts),
                        Ok(Err(e)) => PickerEvent::Error(e.to_string()),
                        Err(e) => PickerEvent::Error(format!("Layout discovery panicked: {}", e)),
                    };
                    let _ = tx.send(event);
                });
            }
            Effect::None | Effect::Exit => {}
        }
    }
}

/// Full-screen terminal owned by the picker for the duration of a run
pub struct PickerTui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl PickerTui {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(PickerTui { terminal })
    }

    /// Drive `state` until it finishes. Events are handled one at a time.
    pub async fn run(
        &mut self,
        state: &mut PickerState,
        discovery: &Discovery,
        mut log_rx: mpsc::UnboundedReceiver<LogEntry>,
    ) -> Result<()> {
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let mut event_stream = EventStream::new();
        let mut tick = tokio::time::interval(TICK_RATE);

        if let Ok(size) = self.terminal.size() {
            state.update(PickerEvent::Resize(size.width, size.height));
        }
        discovery.dispatch(state.initial_effect(), &result_tx);

        loop {
            self.terminal.draw(|f| view::draw(f, state))?;
            if state.is_finished() {
                tracing::debug!("Picker finished at {:?}", state.step());
                break;
            }

            let event = tokio::select! {
                biased; // Keys first so cancel stays responsive
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => PickerEvent::Key(key),
                    Some(Ok(Event::Resize(width, height))) => PickerEvent::Resize(width, height),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => PickerEvent::Error(format!("Terminal input error: {}", e)),
                    None => PickerEvent::Error("Terminal input closed".to_string()),
                },
                Some(result) = result_rx.recv() => result,
                Some(entry) = log_rx.recv() => PickerEvent::Log(entry),
                _ = tick.tick() => PickerEvent::Tick,
            };

            let effect = state.update(event);
            discovery.dispatch(effect, &result_tx);
        }

        Ok(())
    }

    fn cleanup(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for PickerTui {
    fn drop(&mut self) {
        self.cleanup();
    }
}
