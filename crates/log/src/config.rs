use crate::{CallLogError, CallLogResult};
use parking_lot::{const_rwlock, RwLock};
use serde::{Deserialize, Serialize};

/// Sequences and arrays with more elements than this are abbreviated.
pub const DEFAULT_THRESHOLD: usize = 10;
/// Column at which every printed section is wrapped.
pub const DEFAULT_WIDTH: usize = 90;

static GLOBAL_CONFIG: RwLock<LogConfig> = const_rwlock(LogConfig::DEFAULT);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub threshold: usize,
    pub width: usize,
}

impl LogConfig {
    pub const DEFAULT: LogConfig = LogConfig {
        threshold: DEFAULT_THRESHOLD,
        width: DEFAULT_WIDTH,
    };

    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn validate(&self) -> CallLogResult<()> {
        if self.width == 0 {
            return Err(CallLogError::InvalidConfig(
                "width must be at least one column".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a YAML document such as `threshold: 5`.
    /// Missing keys keep their defaults.
    pub fn from_yaml(s: &str) -> CallLogResult<Self> {
        let config: LogConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig::DEFAULT
    }
}

/// Replaces the process-wide config used by every logger without an override.
pub fn set_global_config(config: LogConfig) -> CallLogResult<()> {
    config.validate()?;
    *GLOBAL_CONFIG.write() = config;
    Ok(())
}

pub fn global_config() -> LogConfig {
    *GLOBAL_CONFIG.read()
}
