use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ERROR" => LogLevel::Error,
            "WARN" => LogLevel::Warn,
            "INFO" => LogLevel::Info,
            "DEBUG" => LogLevel::Debug,
            "TRACE" => LogLevel::Trace,
            _ => LogLevel::Info, // Default fallback
        }
    }

    /// Worth showing to the user while the picker is on screen
    pub fn is_notable(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Warn)
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Captures tracing output while the picker owns the terminal.
///
/// Lines are parsed and sent to the picker loop. Once the receiving side is
/// gone the raw line goes to stderr instead.
pub struct TuiWriter {
    sender: mpsc::UnboundedSender<LogEntry>,
}

impl TuiWriter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogEntry>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (TuiWriter { sender }, receiver)
    }
}

impl io::Write for TuiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let log_text = String::from_utf8_lossy(buf);

        let forwarded = match parse_tracing_line(&log_text) {
            Some(parsed) => self.sender.send(parsed).is_ok(),
            None => true,
        };
        if !forwarded {
            io::stderr().write_all(buf)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for TuiWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Clone for TuiWriter {
    fn clone(&self) -> Self {
        TuiWriter {
            sender: self.sender.clone(),
        }
    }
}

// Expected format: "2025-08-24T16:43:07.498408Z  WARN muxpick::core::finder: message"
fn parse_tracing_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let simple = || LogEntry {
        level: LogLevel::Info,
        message: line.to_string(),
        timestamp: chrono::Utc::now(),
    };

    let Some((timestamp_str, rest)) = line.split_once(' ') else {
        return Some(simple());
    };

    // Parse timestamp - if it fails, treat the whole line as a simple message
    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(timestamp_str) else {
        return Some(simple());
    };
    let timestamp = parsed.with_timezone(&chrono::Utc);

    // Levels are right-aligned, so the separator may be several spaces
    let rest = rest.trim_start();
    let (level_str, message_part) = rest.split_once(' ').unwrap_or((rest, ""));
    let level = LogLevel::parse(level_str);

    // Clean up message (remove module path if present)
    let message_part = message_part.trim_start();
    let message = match message_part.find(": ") {
        Some(colon_pos) if !message_part[..colon_pos].contains(' ') => {
            message_part[colon_pos + 2..].to_string()
        }
        _ => message_part.to_string(),
    };

    Some(LogEntry {
        level,
        message,
        timestamp,
    })
}
