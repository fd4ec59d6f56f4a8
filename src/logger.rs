use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use once_cell::sync::{Lazy, OnceCell};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use crate::error::Error;

pub const DEFAULT_ENVVAR: &str = "MOTPY_LOG_LEVEL";
pub const DEFAULT_LEVEL: &str = "INFO";

/// Target of every event emitted through a [`Logger`].
pub const LOGGER_TARGET: &str = "motpy";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

static GLOBAL_REGISTRY: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);
static GLOBAL_SINK: OnceCell<Option<Severity>> = OnceCell::new();

///
/// Message severity. The numeric values are the conventional ones
/// (`DEBUG=10` up to `CRITICAL=50`), so thresholds compare as integers.
/// `NotSet` lets every message through.
///
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    NotSet = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::NotSet => "NOTSET",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    fn from_value(value: u8) -> Self {
        match value {
            0 => Severity::NotSet,
            1..=10 => Severity::Debug,
            11..=20 => Severity::Info,
            21..=30 => Severity::Warning,
            31..=40 => Severity::Error,
            _ => Severity::Critical,
        }
    }

    /// `Critical` has no tracing counterpart and maps to `ERROR`.
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            Severity::NotSet => LevelFilter::TRACE,
            Severity::Debug => LevelFilter::DEBUG,
            Severity::Info => LevelFilter::INFO,
            Severity::Warning => LevelFilter::WARN,
            Severity::Error | Severity::Critical => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOTSET" => Ok(Severity::NotSet),
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" | "FATAL" => Ok(Severity::Critical),
            other => Err(Error::InvalidArgument(format!("unknown log level name {:?}", other))),
        }
    }
}

///
/// A named, leveled logger handle.
///
/// Messages below the threshold are dropped here; the rest are emitted as
/// `tracing` events with target [`LOGGER_TARGET`] and the fields `logger`
/// and `severity`. Without an installed subscriber they go nowhere.
///
#[derive(Debug)]
pub struct Logger {
    name: String,
    level: AtomicU8,
}

impl Logger {
    fn new(name: &str, level: Severity) -> Self {
        Self {
            name: name.to_owned(),
            level: AtomicU8::new(level.value()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn level(&self) -> Severity {
        Severity::from_value(self.level.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_level(&self, level: Severity) {
        self.level.store(level.value(), Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        severity >= self.level()
    }

    pub fn log<M: fmt::Display>(&self, severity: Severity, message: M) {
        if !self.is_enabled_for(severity) {
            return;
        }

        let logger = self.name.as_str();
        let name = severity.name();

        match severity {
            Severity::NotSet | Severity::Debug => tracing::debug!(target: LOGGER_TARGET, logger, severity = name, "{}", message),
            Severity::Info => tracing::info!(target: LOGGER_TARGET, logger, severity = name, "{}", message),
            Severity::Warning => tracing::warn!(target: LOGGER_TARGET, logger, severity = name, "{}", message),
            Severity::Error | Severity::Critical => {
                tracing::error!(target: LOGGER_TARGET, logger, severity = name, "{}", message)
            }
        }
    }

    #[inline]
    pub fn debug<M: fmt::Display>(&self, message: M) {
        self.log(Severity::Debug, message)
    }

    #[inline]
    pub fn info<M: fmt::Display>(&self, message: M) {
        self.log(Severity::Info, message)
    }

    #[inline]
    pub fn warning<M: fmt::Display>(&self, message: M) {
        self.log(Severity::Warning, message)
    }

    #[inline]
    pub fn error<M: fmt::Display>(&self, message: M) {
        self.log(Severity::Error, message)
    }

    #[inline]
    pub fn critical<M: fmt::Display>(&self, message: M) {
        self.log(Severity::Critical, message)
    }
}

///
/// Settings for one `setup` call.
///
/// level : explicit level name; when `None` the `envvar_name` variable is
///     consulted, then `INFO` is used.
/// is_main : also install the process-wide stdout sink.
///
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub name: String,
    pub level: Option<String>,
    pub is_main: bool,
    pub envvar_name: String,
}

impl LoggerConfig {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            level: None,
            is_main: false,
            envvar_name: DEFAULT_ENVVAR.to_string(),
        }
    }

    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_main(mut self, is_main: bool) -> Self {
        self.is_main = is_main;
        self
    }

    pub fn with_envvar_name<S: Into<String>>(mut self, envvar_name: S) -> Self {
        self.envvar_name = envvar_name.into();
        self
    }

    /// Explicit level, else the environment variable (announced on `notice`),
    /// else `INFO`. An empty variable counts as unset.
    fn resolve_level<F, W>(&self, lookup: F, notice: &mut W) -> Result<Severity, Error>
    where
        F: FnOnce(&str) -> Option<String>,
        W: Write,
    {
        let level = match &self.level {
            Some(level) => level.clone(),
            None => match lookup(&self.envvar_name).filter(|v| !v.is_empty()) {
                Some(level) => {
                    writeln!(notice, "[{}] envvar {} sets log level to {}", self.name, self.envvar_name, level)?;
                    level
                }
                None => DEFAULT_LEVEL.to_string(),
            },
        };

        level.parse()
    }
}

/// Name to logger map. `LoggerRegistry::global()` backs [`setup_logger`].
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn global() -> &'static LoggerRegistry {
        &GLOBAL_REGISTRY
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every logger. Handles already given out keep working.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Configures `config.name` from the process environment. The environment
    /// notice goes to stdout once setup is done, so no stdout lock is held
    /// while the registry is locked.
    pub fn setup(&self, config: &LoggerConfig) -> Result<Arc<Logger>, Error> {
        let mut notice = Vec::new();
        let result = self.setup_with_env(config, |key| std::env::var(key).ok(), &mut notice);

        if !notice.is_empty() {
            io::stdout().write_all(&notice)?;
        }

        result
    }

    pub fn setup_with_env<F, W>(&self, config: &LoggerConfig, lookup: F, notice: &mut W) -> Result<Arc<Logger>, Error>
    where
        F: FnOnce(&str) -> Option<String>,
        W: Write,
    {
        if config.name.is_empty() {
            return Err(Error::InvalidArgument("logger name must not be empty".to_string()));
        }

        let level = config.resolve_level(lookup, notice)?;
        let logger = self.get_or_create(&config.name, level);

        if config.is_main {
            install_global_sink(level);
        }

        Ok(logger)
    }

    fn get_or_create(&self, name: &str, level: Severity) -> Arc<Logger> {
        let (logger, created) = {
            let mut loggers = self.lock();

            match loggers.get(name) {
                Some(logger) => {
                    logger.set_level(level);
                    (logger.clone(), false)
                }
                None => {
                    let logger = Arc::new(Logger::new(name, level));
                    loggers.insert(name.to_owned(), logger.clone());
                    (logger, true)
                }
            }
        };

        // Emitted outside the registry lock: the event may block on the sink's writer.
        if created {
            tracing::debug!(name, level = level.name(), "registering logger");
        }

        logger
    }
}

///
/// Configures the logger `name` in the process-wide registry.
///
/// Parameters
///
/// level : explicit level name (`NOTSET`, `DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`).
/// is_main : install the stdout sink as the global subscriber (once per process).
/// envvar_name : variable read when `level` is `None`, normally [`DEFAULT_ENVVAR`].
///
/// Fails with `Error::InvalidArgument` on an unknown level name.
///
pub fn setup_logger(name: &str, level: Option<&str>, is_main: bool, envvar_name: &str) -> Result<Arc<Logger>, Error> {
    let mut config = LoggerConfig::new(name)
        .with_main(is_main)
        .with_envvar_name(envvar_name);

    if let Some(level) = level {
        config = config.with_level(level);
    }

    LoggerRegistry::global().setup(&config)
}

/// Level of the installed stdout sink. `None` when none was installed, also
/// when another global subscriber was already in place.
pub fn global_sink_level() -> Option<Severity> {
    GLOBAL_SINK.get().copied().flatten()
}

// First call wins; later calls and foreign global subscribers leave things as they are.
fn install_global_sink(level: Severity) {
    GLOBAL_SINK.get_or_init(|| {
        match line_subscriber(level, io::stdout).try_init() {
            Ok(()) => {
                tracing::debug!(level = level.name(), "stdout log sink installed");
                Some(level)
            }
            Err(err) => {
                tracing::debug!("global subscriber already set, keeping it: {}", err);
                None
            }
        }
    });
}

///
/// Subscriber writing one [`LineFormat`] line per event to `make_writer`.
///
/// [`Logger`] events are already filtered by their own threshold and always
/// pass; everything else is filtered at `level`.
///
pub fn line_subscriber<W>(level: Severity, make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let threshold = level.as_level_filter();

    tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(make_writer)
            .with_filter(filter_fn(move |meta| {
                meta.target() == LOGGER_TARGET || *meta.level() <= threshold
            })),
    )
}

/// `<timestamp>\t<thread>-<logger>:<LEVEL>:<message>`
#[derive(Debug, Default, Copy, Clone)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, _ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = LineFields {
            from_logger: meta.target() == LOGGER_TARGET,
            ..LineFields::default()
        };
        event.record(&mut fields);

        let thread = std::thread::current();
        let logger = fields.logger.as_deref().unwrap_or_else(|| meta.target());
        let severity = fields.severity.as_deref().unwrap_or_else(|| level_name(meta.level()));

        writeln!(
            writer,
            "{}\t{}-{}:{}:{}{}",
            Local::now().format(TIMESTAMP_FORMAT),
            thread.name().unwrap_or("unnamed"),
            logger,
            severity,
            fields.message,
            fields.extra,
        )
    }
}

fn level_name(level: &Level) -> &'static str {
    if *level == Level::ERROR {
        "ERROR"
    } else if *level == Level::WARN {
        "WARNING"
    } else if *level == Level::INFO {
        "INFO"
    } else if *level == Level::DEBUG {
        "DEBUG"
    } else {
        "TRACE"
    }
}

#[derive(Default)]
struct LineFields {
    from_logger: bool,
    message: String,
    logger: Option<String>,
    severity: Option<String>,
    extra: String,
}

impl Visit for LineFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "logger" if self.from_logger => self.logger = Some(value.to_owned()),
            "severity" if self.from_logger => self.severity = Some(value.to_owned()),
            _ => self.record_debug(field, &value),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        use std::fmt::Write as _;

        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.extra, " {}={:?}", field.name(), value);
        }
    }
}
