//! Logging setup: a console sink and a file sink, each with its own level

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::infrastructure::config::LoggerConfig;

/// Threshold of a log sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// `None` for empty or unknown names, which disables the sink
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warning" | "warn" => Some(LogLevel::Warning),
            "error" | "critical" | "crit" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    fn from_config(level: Option<&str>) -> Option<Self> {
        level.and_then(Self::parse)
    }
}

/// Keeps the file writer flushing until dropped
pub struct LogGuard {
    _file: Option<WorkerGuard>,
    /// File opened at startup
    pub file: Option<PathBuf>,
}

/// Log file whose name follows a strftime pattern.
///
/// Every write expands the pattern again; when the name changes the new file
/// gets a header and later lines go there.
pub struct DatedFile {
    pattern: String,
    current: Option<(PathBuf, File)>,
}

impl DatedFile {
    /// Fails on invalid strftime sequences in `pattern`
    pub fn new(pattern: impl Into<String>) -> io::Result<Self> {
        let pattern = pattern.into();
        expand_filename(&pattern, Local::now())?;
        Ok(Self { pattern, current: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(|(path, _)| path.as_path())
    }

    /// The file for `now`, opening it if the name changed since the last call
    pub fn file_at(&mut self, now: DateTime<Local>) -> io::Result<&mut File> {
        let path = expand_filename(&self.pattern, now)?;
        if self.path() != Some(path.as_path()) {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            write_file_header(&path, now)?;
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            self.current = Some((path, file));
        }

        match self.current.as_mut() {
            Some((_, file)) => Ok(file),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "log file is not open")),
        }
    }

    pub fn write_at(&mut self, now: DateTime<Local>, buf: &[u8]) -> io::Result<usize> {
        self.file_at(now)?.write(buf)
    }
}

impl Write for DatedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_at(Local::now(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.current.as_mut() {
            Some((_, file)) => file.flush(),
            None => Ok(()),
        }
    }
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level.as_tracing().into())
}

/// Installs the global subscriber
pub fn init(config: &LoggerConfig) -> io::Result<LogGuard> {
    let console = LogLevel::from_config(config.console.level.as_deref()).map(|level| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_filter(filter(level))
    });

    let mut guard = None;
    let mut file_path = None;
    let file = match LogLevel::from_config(config.file.level.as_deref()) {
        Some(level) => {
            let mut file = DatedFile::new(config.file.filename.as_str())?;
            file.file_at(Local::now())?;
            file_path = file.path().map(Path::to_path_buf);

            let (writer, worker) = tracing_appender::non_blocking(file);
            guard = Some(worker);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(filter(level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(LogGuard {
        _file: guard,
        file: file_path,
    })
}

/// Expands strftime sequences in the configured log filename
pub fn expand_filename(pattern: &str, now: DateTime<Local>) -> io::Result<PathBuf> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid date format in log filename `{pattern}`"),
        ));
    }

    Ok(PathBuf::from(now.format_with_items(items.into_iter()).to_string()))
}

/// Appends the `#Date` and `#Fields` header lines to the log file
pub fn write_file_header(path: &Path, now: DateTime<Local>) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "#Date: {}", now.format("%d.%m.%Y %H:%M:%S%.6f %z"))?;
    writeln!(file, "#Fields: time level component message")?;
    Ok(())
}
