use serde::{Deserialize, Serialize};

/// Event layout written by the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the `structdoc` target.
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `"structdoc::format=trace"`.
    pub directives: Vec<String>,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directives: Vec::new(),
            format: LogFormat::default(),
            with_target: true,
            with_ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Directive string fed to `EnvFilter` when `RUST_LOG` is not set.
    pub fn build_filter_directive(&self) -> String {
        let mut directive = format!("structdoc={}", self.level);
        for extra in &self.directives {
            directive.push(',');
            directive.push_str(extra);
        }
        directive
    }
}
