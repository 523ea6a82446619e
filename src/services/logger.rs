use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn from_env() -> Self {
        let raw = std::env::var("PICA_LOG_LEVEL")
            .or_else(|_| std::env::var("LOG_LEVEL"))
            .unwrap_or_else(|_| "info".to_string());
        Self::parse(&raw)
    }

    fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    fn allows(self, other: LogLevel) -> bool {
        other.rank() <= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: String,
    pub level: LogLevel,
    pub context: String,
    pub message: String,
    pub meta: Option<Value>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} [{}] {}",
            self.timestamp,
            self.level.as_str(),
            self.context,
            self.message
        )?;
        if let Some(meta) = &self.meta {
            write!(f, " {}", meta)?;
        }
        Ok(())
    }
}

/// Destination for log records. Stdout carries JSON-RPC, so nothing here may
/// write to it.
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

#[derive(Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, record: &LogRecord) {
        eprintln!("{}", record);
    }
}

/// Keeps rendered lines in memory. Used by tests and embedders that want to
/// inspect what the toolkit reported.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(record.to_string());
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("level", &self.level)
            .finish()
    }
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self::with_sink(context, Arc::new(StderrSink))
    }

    pub fn with_sink(context: &str, sink: Arc<dyn LogSink>) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::from_env(),
            sink,
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self {
            context,
            level: self.level,
            sink: self.sink.clone(),
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&Value>) {
        if !self.level.allows(level) {
            return;
        }
        let record = LogRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            context: self.context.clone(),
            message: message.to_string(),
            meta: meta.filter(|m| !m.is_null()).cloned(),
        };
        self.sink.write(&record);
    }

    pub fn error(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Debug, message, meta);
    }
}
