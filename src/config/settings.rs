use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{codec::CodecOptions, error::ConfigError, logging::LoggingConfig};

/// Codec and logging settings.
///
/// Sources, lowest priority first: built-in defaults, an optional file,
/// then `STRUCTDOC__`-prefixed environment variables with `__` between
/// sections (`STRUCTDOC__CODEC__MAX_DEPTH=32`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub codec: CodecOptions,
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None::<&Path>)
    }

    pub fn load_from<P: AsRef<Path>>(file: Option<P>) -> Result<Self, ConfigError> {
        Self::build(file, Environment::with_prefix("STRUCTDOC"))
    }

    fn build<P: AsRef<Path>>(
        file: Option<P>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("codec.max_depth", defaults.codec.max_depth as u64)?
            .set_default("codec.lob_binding", "inline")?
            .set_default("logging.level", defaults.logging.level)?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path.as_ref()).required(true));
        }
        let settings: Self = builder
            .add_source(
                env.prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("logging.directives"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "codec.max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;
    use crate::{codec::LobBinding, logging::LogFormat};

    fn env_of(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("STRUCTDOC").source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let s = Settings::build(None::<&Path>, env_of(&[])).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_environment_overrides() {
        let s = Settings::build(
            None::<&Path>,
            env_of(&[
                ("STRUCTDOC__CODEC__MAX_DEPTH", "8"),
                ("STRUCTDOC__CODEC__LOB_BINDING", "native"),
                ("STRUCTDOC__LOGGING__FORMAT", "json"),
            ]),
        )
        .unwrap();
        assert_eq!(s.codec.max_depth, 8);
        assert_eq!(s.codec.lob_binding, LobBinding::Native);
        assert_eq!(s.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_directives_from_environment() {
        let s = Settings::build(
            None::<&Path>,
            env_of(&[(
                "STRUCTDOC__LOGGING__DIRECTIVES",
                "structdoc::format=trace,structdoc::scalar=debug",
            )]),
        )
        .unwrap();
        assert_eq!(
            s.logging.directives,
            vec!["structdoc::format=trace", "structdoc::scalar=debug"]
        );

        let s = Settings::build(
            None::<&Path>,
            env_of(&[("STRUCTDOC__LOGGING__DIRECTIVES", "structdoc=warn")]),
        )
        .unwrap();
        assert_eq!(s.logging.directives, vec!["structdoc=warn"]);
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[codec]\nmax_depth = 16\n\n[logging]\nlevel = \"debug\"").unwrap();
        let s = Settings::build(Some(file.path()), env_of(&[])).unwrap();
        assert_eq!(s.codec.max_depth, 16);
        assert_eq!(s.logging.level, "debug");
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = Settings::build(
            None::<&Path>,
            env_of(&[("STRUCTDOC__CODEC__MAX_DEPTH", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
