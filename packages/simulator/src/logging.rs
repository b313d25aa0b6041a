use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "pix-simulator.log";

/// Keeps the file writer flushing until the simulation exits
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Where simulation runs are archived when `ENABLE_FILE_LOGS` is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogSettings {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub rotation: LogRotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    fn to_rotation(self) -> Rotation {
        match self {
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }
}

impl FileLogSettings {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `None` when file logging is disabled; blank values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let enabled = lookup("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if !enabled {
            return None;
        }

        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let rotation = match non_blank("SIMULATOR_LOG_ROTATION") {
            Some(raw) => LogRotation::parse(&raw).unwrap_or_else(|| {
                eprintln!("unknown SIMULATOR_LOG_ROTATION {raw:?}, using daily");
                LogRotation::Daily
            }),
            None => LogRotation::Daily,
        };

        Some(Self {
            directory: non_blank("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            file_prefix: non_blank("SIMULATOR_LOG_PREFIX")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string()),
            rotation,
        })
    }
}

/// Logs go to stderr; stdout carries the JSON report
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let file_writer = FileLogSettings::from_env().and_then(|settings| {
        if let Err(err) = std::fs::create_dir_all(&settings.directory) {
            eprintln!(
                "failed to create log directory {}: {err}",
                settings.directory.display()
            );
            return None;
        }
        let appender = RollingFileAppender::new(
            settings.rotation.to_rotation(),
            &settings.directory,
            &settings.file_prefix,
        );
        Some(tracing_appender::non_blocking(appender))
    });

    match file_writer {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
