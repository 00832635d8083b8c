//! Chat transcript logging to disk.
//!
//! When enabled, writes received chat lines to daily log files organized by
//! channel or query partner. Files are named `<target>_<date>.log` and stored
//! in the configured log directory (default: `~/.local/share/crabline/logs/`).

use crabline::config::LoggingConfig;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Message,
    Notice,
    Join,
}

/// Writes chat lines to per-channel/query daily log files.
///
/// File handles are cached for the lifetime of the logger. A file that cannot
/// be opened is remembered as unavailable and its lines are dropped.
pub struct ChatLogger {
    enabled: bool,
    log_dir: PathBuf,
    log_channels: bool,
    log_queries: bool,
    file_handles: HashMap<String, Option<fs::File>>,
}

impl ChatLogger {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            log_dir: expand_home(&config.log_dir),
            log_channels: config.log_channels,
            log_queries: config.log_queries,
            file_handles: HashMap::new(),
        }
    }

    /// Append one line to the log for `target`. `target` is a channel or, for
    /// private traffic, the other party's nickname. No-op if logging is
    /// disabled or that kind of target is not configured for logging.
    pub fn log(&mut self, target: &str, kind: EntryKind, sender: &str, text: &str) {
        if !self.enabled {
            return;
        }
        let is_channel = target.starts_with(['#', '&']);
        if (is_channel && !self.log_channels) || (!is_channel && !self.log_queries) {
            return;
        }

        let now = chrono::Local::now();
        let timestamp = now.format("%H:%M:%S");
        let line = match kind {
            EntryKind::Message => format!("[{}] <{}> {}", timestamp, sender, text),
            EntryKind::Notice => format!("[{}] -{}- {}", timestamp, sender, text),
            EntryKind::Join => format!("[{}] *** {} {}", timestamp, sender, text),
        };

        let filename = format!("{}_{}.log", sanitize_target(target), now.format("%Y-%m-%d"));
        let log_dir = &self.log_dir;
        let handle = self.file_handles.entry(filename.clone()).or_insert_with(|| {
            let _ = fs::create_dir_all(log_dir);
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join(&filename))
            {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!("cannot open transcript {}: {}", filename, e);
                    None
                }
            }
        });

        if let Some(file) = handle {
            let _ = writeln!(file, "{}", line);
        }
    }
}

/// Make `target` safe to use as a file name.
fn sanitize_target(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(dir)),
        None => PathBuf::from(dir),
    }
}
