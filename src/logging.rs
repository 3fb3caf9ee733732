use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, ConfigError};

#[derive(Debug)]
struct FileLogger {
    log_file: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

pub fn default_log_dir() -> Result<PathBuf, ConfigError> {
    dir::home_dir()
        .map(|home| home.join("roleplay_bot").join("data"))
        .ok_or(ConfigError::NoHomeDir)
}

/// Send every `log` record at or above `level` to `<log_dir>/log.txt`.
pub fn init(log_dir: &Path, level: LevelFilter) -> Result<(), AppError> {
    create_dir_all(log_dir)?;

    let logger = FileLogger {
        log_file: log_dir.join("log.txt"),
        level,
    };
    let logger = LOGGER.try_insert(logger).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "logger already initialised")
    })?;
    install(logger, level)?;
    Ok(())
}

fn install(logger: &'static FileLogger, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(logger).map(|()| log::set_max_level(level))
}
