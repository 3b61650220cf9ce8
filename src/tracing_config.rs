use std::{env, io};

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::ConfigPaths;

const DAYS_TO_KEEP: usize = 7;

/// Initialize tracing for short-lived command line invocations
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "warn" so
/// command output stays clean. Logs go to stderr, formatted as JSON when
/// NITROSHARE_LOG_FORMAT is "json".
///
/// # Errors
/// Returns error if tracing subscriber initialization fails
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output_layer(json_requested(), io::stderr, true))
        .try_init()?;

    Ok(())
}

/// Initialize tracing for the daemon
///
/// Logs at info level unless RUST_LOG says otherwise. Every event goes to a
/// daily rotated file in the nitroshare logs directory and, in the same
/// format `init` uses, to stderr. Stdout is left alone.
///
/// # Errors
/// Returns error if file creation or tracing subscriber initialization fails
pub fn init_with_file() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = ConfigPaths::log_dir()?;
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("nitroshare")
        .filename_suffix("log")
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json = json_requested();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(output_layer(json, io::stderr, true))
        .with(output_layer(json, non_blocking, false))
        .try_init()?;

    // The writer thread must outlive every log call.
    std::mem::forget(guard);

    Ok(())
}

fn json_requested() -> bool {
    env::var("NITROSHARE_LOG_FORMAT").is_ok_and(|format| format == "json")
}

/// One formatting layer: JSON with targets, or compact lines without them.
fn output_layer<S, W>(json: bool, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_level(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::{fs, sync::Mutex};

    use tempfile::TempDir;
    use tracing::info;

    use super::*;

    fn capture(json: bool, emit: impl FnOnce()) -> String {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let file = fs::File::create(&path).unwrap();

        let subscriber =
            tracing_subscriber::registry().with(output_layer(json, Mutex::new(file), false));
        tracing::subscriber::with_default(subscriber, emit);

        fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn json_layer_writes_one_object_per_event() {
        let output = capture(true, || info!(key = "a", "Config value changed"));

        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["message"], "Config value changed");
        assert_eq!(line["fields"]["key"], "a");
    }

    #[test]
    fn compact_layer_without_ansi_is_plain_text() {
        let output = capture(false, || info!("Device identity ready"));

        assert!(output.contains("INFO"));
        assert!(output.contains("Device identity ready"));
        assert!(!output.contains('\u{1b}'));
    }
}
