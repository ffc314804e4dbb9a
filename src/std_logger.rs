use std::io::Write;
use chrono::Local;
use log::{max_level, LevelFilter, Metadata, Record, SetLoggerError};

/// Writes every record as one timestamped line on stdout.
pub struct StdLogger;

static LOGGER: StdLogger = StdLogger;

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

fn format_line(time_str: &str, record: &Record) -> String {
    format!("{0} {1:<8}: {2}", time_str, record.level(), record.args())
}

impl log::Log for StdLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let time_str = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
            println!("{}", format_line(&time_str, record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}
