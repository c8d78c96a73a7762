use std::env;

use tracing_subscriber::EnvFilter;

use super::config::LoggingConfig;

/// `RUST_LOG` wins; otherwise the configured directive, falling back to
/// `info` when it does not parse.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    filter_from(env::var(EnvFilter::DEFAULT_ENV).ok(), config)
}

fn filter_from(
    env_directive: Option<String>,
    config: &LoggingConfig,
) -> EnvFilter {
    if let Some(filter) = env_directive.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }
    let directive = config.build_filter_directive();
    match EnvFilter::try_new(&directive) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid log filter directive '{directive}': {e}; falling back to 'info'");
            EnvFilter::new("info")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;
    use crate::{
        codec::CodecContext,
        format::json::JsonTranscoder,
        schema::{ScalarMapping, SchemaDescriptor, SqlTypeCode},
    };

    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> fmt::MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured(
        filter: EnvFilter,
        f: impl FnOnce(),
    ) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(VecMakeWriter(buffer.clone()))
            .with_filter(filter);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        let out = buffer.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_invalid_env_directive_uses_config() {
        let cfg = LoggingConfig {
            level: "warn".into(),
            ..Default::default()
        };
        let filter = filter_from(Some("this_is_invalid=directive=!!".into()), &cfg);
        assert_eq!(filter.to_string(), "structdoc=warn");
    }

    #[test]
    fn test_invalid_config_directive_falls_back_to_info() {
        let cfg = LoggingConfig {
            level: "loud!!".into(),
            ..Default::default()
        };
        assert_eq!(filter_from(None, &cfg).to_string(), "info");
    }

    /// Decode failures are reported at debug level only.
    #[test]
    fn test_codec_errors_logged_at_debug() {
        let schema = SchemaDescriptor::builder("Point")
            .scalar("x", ScalarMapping::of(SqlTypeCode::Integer))
            .build()
            .unwrap();
        let decode = || {
            let ctx = CodecContext::default();
            let _ = JsonTranscoder::new(&ctx).deserialize(&schema, r#"{"q":1}"#, true);
        };

        let info = captured(EnvFilter::new("structdoc=info"), decode);
        assert!(!info.contains("unknown selectable"));

        let debug = captured(EnvFilter::new("structdoc=debug"), decode);
        assert!(debug.contains("unknown selectable"));
        assert!(debug.contains("name=\"q\"") || debug.contains("name=q"));
    }
}
