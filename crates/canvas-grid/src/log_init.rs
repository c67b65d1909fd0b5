use log::{LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;

struct FileLogger {
    file_path: String,
    level: LevelFilter,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
            {
                let _ = writeln!(file, "[{}] {}", record.level(), record.args());
            }
        }
    }

    fn flush(&self) {}
}

/// Route `log` output to a file at debug level.
pub fn init_logger(path: &str) {
    init_logger_with_level(path, LevelFilter::Debug);
}

/// Route `log` output to a file at the given level. Safe to call more than
/// once; later calls lose the race and leave the first logger in place.
pub fn init_logger_with_level(path: &str, level: LevelFilter) {
    let logger = FileLogger {
        file_path: path.to_string(),
        level,
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}
