use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use simplelog::{CombinedLogger, Config, SharedLogger, WriteLogger};
use std::{
    collections::VecDeque,
    fs::File,
    path::Path,
    sync::{Arc, Mutex},
};

// diagnostics kept for the panel; older entries are dropped
const MAX_DIAGNOSTICS: usize = 500;

pub type Diagnostics = Arc<Mutex<VecDeque<String>>>;

/// `log` backend that feeds the diagnostics panel.
pub struct UiLogger {
    entries: Diagnostics,
    level: LevelFilter,
}

impl UiLogger {
    pub fn new(entries: Diagnostics, level: LevelFilter) -> Self {
        Self { entries, level }
    }
}

impl Log for UiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = format!(
            "{} {:<5} {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        );
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_back(entry);
            while entries.len() > MAX_DIAGNOSTICS {
                entries.pop_front();
            }
        }
    }

    fn flush(&self) {}
}

impl SharedLogger for UiLogger {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn config(&self) -> Option<&Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        Box::new(*self)
    }
}

/// Install the diagnostics logger, plus a file logger when `log_file` is set.
///
/// Returns the buffer the diagnostics panel reads from. If a logger is
/// already installed the buffer stays empty.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<Diagnostics> {
    let entries: Diagnostics = Arc::default();
    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![Box::new(UiLogger::new(entries.clone(), level))];

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Cannot create log file {}", path.display()))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }

    // the first installed logger wins
    let _ = CombinedLogger::init(loggers);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_bounded_and_filtered() {
        let entries: Diagnostics = Arc::default();
        let logger = UiLogger::new(entries.clone(), LevelFilter::Info);

        for i in 0..(MAX_DIAGNOSTICS + 10) {
            logger.log(
                &Record::builder()
                    .args(format_args!("message {}", i))
                    .level(log::Level::Info)
                    .build(),
            );
        }
        logger.log(
            &Record::builder()
                .args(format_args!("too chatty"))
                .level(log::Level::Debug)
                .build(),
        );

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), MAX_DIAGNOSTICS);
        assert!(entries.back().unwrap().ends_with("message 509"));
        assert!(!entries.iter().any(|e| e.contains("too chatty")));
    }
}
