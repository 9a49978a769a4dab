use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// Keeps logging alive and lets the level follow the booth config.
///
/// Logging is installed before the config is read, so `debug_mode` is applied
/// afterwards through [`LoggingGuard::set_debug_mode`].
pub struct LoggingGuard {
    _worker: WorkerGuard,
    level: LogLevelHandle,
}

impl LoggingGuard {
    pub fn set_debug_mode(&self, debug_mode: bool) -> Result<()> {
        self.level.set_debug_mode(debug_mode)
    }
}

struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    // RUST_LOG wins over the config
    from_env: bool,
}

impl LogLevelHandle {
    fn set_debug_mode(&self, debug_mode: bool) -> Result<()> {
        if self.from_env {
            tracing::debug!("RUST_LOG is set, ignoring debug_mode={}", debug_mode);
            return Ok(());
        }

        self.handle
            .reload(level_filter(debug_mode))
            .map_err(|e| anyhow!("Failed to change log level: {}", e))?;
        tracing::info!("Log level set to {}", level_name(debug_mode));
        Ok(())
    }
}

/// Setup logging to a daily rotating file only.
///
/// # Arguments
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_prefix` - Prefix for log files (e.g., "my4cuts")
/// * `debug_mode` - If true, use debug level; otherwise use info level
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(log_dir: &str, log_prefix: &str, debug_mode: bool) -> Result<LoggingGuard> {
    setup_logging_with_console(log_dir, log_prefix, debug_mode, false)
}

/// Setup logging with optional console output.
///
/// `RUST_LOG` takes precedence over `debug_mode` when it is set.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging_with_console(
    log_dir: &str,
    log_prefix: &str,
    debug_mode: bool,
    console_output: bool,
) -> Result<LoggingGuard> {
    ensure_log_dir(Utf8Path::new(log_dir))?;

    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    // Option<Layer> is itself a layer, so the console output can be toggled
    let console_layer = console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
    });

    let (initial, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (level_filter(debug_mode), false),
    };
    let (filter, handle) = reload::Layer::new(initial);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        log_dir,
        log_prefix,
        debug_mode,
        console_output
    );

    Ok(LoggingGuard {
        _worker: guard,
        level: LogLevelHandle { handle, from_env },
    })
}

fn level_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::new(level_name(debug_mode))
}

fn level_name(debug_mode: bool) -> &'static str {
    if debug_mode { "debug" } else { "info" }
}

fn ensure_log_dir(log_dir: &Utf8Path) -> Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_setup_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let log_dir = log_dir.to_str().unwrap();

        // Only one global subscriber per process; a second install just errors
        let _ = setup_logging(log_dir, "test", false);

        assert!(Utf8PathBuf::from(log_dir).exists());
    }

    #[test]
    fn test_ensure_log_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = Utf8PathBuf::try_from(temp_dir.path().join("nested/logs")).unwrap();

        ensure_log_dir(&log_dir).unwrap();
        ensure_log_dir(&log_dir).unwrap();

        assert!(log_dir.exists());
    }

    #[test]
    fn test_debug_mode_applies_after_install() {
        let (filter, handle) = reload::Layer::new(level_filter(false));
        let level = LogLevelHandle {
            handle,
            from_env: false,
        };
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden at info level");
            level.set_debug_mode(true).unwrap();
            tracing::debug!("shown at debug level");
        });

        let text = log.text();
        assert!(!text.contains("hidden at info level"));
        assert!(text.contains("shown at debug level"));
    }
}
