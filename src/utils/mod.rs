pub mod path;
pub mod tui_writer;

pub use path::{canonicalize_path, expand_home, shorten_path_for_display, tildify};
pub use tui_writer::{LogEntry, LogLevel, TuiWriter};
