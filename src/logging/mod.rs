//! Structured logging via `tracing`.
//!
//! - Per-module level filters, overridable with `RUST_LOG`
//! - Idempotent initialization: the first call wins, later calls are no-ops

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs the subscriber while the app is being built
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: TracingConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// One `target=level` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFilter {
    pub target: String,
    pub level: LogLevel,
}

impl ModuleFilter {
    pub fn new(target: &str, level: LogLevel) -> Self {
        Self {
            target: target.to_string(),
            level,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<ModuleFilter>,
    pub show_targets: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ModuleFilter::new("lineage_core::combat", LogLevel::Debug),
                ModuleFilter::new("lineage_core::encounter", LogLevel::Info),
                ModuleFilter::new("lineage_core::hotreload", LogLevel::Info),
            ],
            show_targets: true,
        }
    }
}

impl TracingConfig {
    /// Same filters with a different base level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn to_env_filter_string(&self) -> String {
        std::iter::once(self.default_level.as_str().to_string())
            .chain(
                self.module_filters
                    .iter()
                    .map(|f| format!("{}={}", f.target, f.level.as_str())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

static TRACING_INIT: Once = Once::new();

pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// Install the global subscriber (first call wins). `RUST_LOG` replaces the
/// configured filters entirely when set.
pub fn init_tracing(config: &TracingConfig) {
    let directives = config.to_env_filter_string();
    let show_targets = config.show_targets;
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::builder().parse_lossy(&directives));

        // A host app or test harness may have installed one already
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(show_targets)
            .compact()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_env_filter_string() {
        let filter = TracingConfig::default().to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("lineage_core::combat=debug"));
        assert!(filter.contains("lineage_core::encounter=info"));
    }

    #[test]
    fn test_with_level() {
        let config = TracingConfig::default().with_level(LogLevel::Warn);
        assert!(config.to_env_filter_string().starts_with("warn"));
        assert_eq!(config.module_filters.len(), 3);
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing_default();
        init_tracing_default();
        init_tracing(&TracingConfig::default().with_level(LogLevel::Error));
    }
}
