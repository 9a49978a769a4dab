use crate::models::{BoothConfig, BoothSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub mod permission_memory;

pub use permission_memory::FilePermissionMemory;

/// Prefix for environment overrides, e.g. `MY4CUTS__BOOTH__COUNTDOWN_SECONDS=5`.
pub const ENV_PREFIX: &str = "MY4CUTS";

const BOOTH_CONFIG_FILE: &str = "My4Cuts Config.yaml";
const PERMISSION_MEMORY_FILE: &str = "Permission Memory.yaml";

/// Configuration manager for the booth's YAML files.
///
/// Manages two files inside one directory:
/// - Booth config (`My4Cuts Config.yaml`): timings, camera and picker settings
/// - Permission memory (`Permission Memory.yaml`): remembered denials
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    booth_config_path: Utf8PathBuf,
    permission_memory_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager rooted at `config_dir`, creating it if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            booth_config_path: config_dir.join(BOOTH_CONFIG_FILE),
            permission_memory_path: config_dir.join(PERMISSION_MEMORY_FILE),
            config_dir,
        })
    }

    /// Load the booth configuration.
    ///
    /// Layers, lowest priority first: built-in defaults, the YAML file (if
    /// present), then `MY4CUTS__…` environment variables. The result is
    /// validated before it is returned.
    pub fn load_booth_config(&self) -> Result<BoothConfig> {
        self.load_layered(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_layered(&self, environment: config::Environment) -> Result<BoothConfig> {
        if !self.booth_config_path.exists() {
            tracing::warn!(
                "Booth config file not found at {}, using defaults",
                self.booth_config_path
            );
        }

        let layered = config::Config::builder()
            .add_source(
                config::File::from(self.booth_config_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read booth config: {}", self.booth_config_path))?;

        let mut booth_config: BoothConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse booth config: {}", self.booth_config_path))?;
        booth_config.booth = booth_config.booth.validated();

        tracing::info!("Loaded booth config from {}", self.booth_config_path);
        Ok(booth_config)
    }

    /// Save the booth configuration file.
    pub fn save_booth_config(&self, config: &BoothConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize booth config to YAML")?;

        fs::write(&self.booth_config_path, yaml_string)
            .with_context(|| format!("Failed to write booth config: {}", self.booth_config_path))?;

        tracing::info!("Saved booth config to {}", self.booth_config_path);
        Ok(())
    }

    /// Write a default config file if none exists yet.
    pub fn ensure_booth_config(&self) -> Result<()> {
        if self.booth_config_path.exists() {
            return Ok(());
        }
        self.save_booth_config(&BoothConfig {
            booth: BoothSettings::default(),
        })
    }

    /// Open the persisted permission memory.
    pub fn permission_memory(&self) -> Result<FilePermissionMemory> {
        FilePermissionMemory::open(&self.permission_memory_path)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn booth_config_path(&self) -> &Utf8Path {
        &self.booth_config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DevicePosition;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    fn no_env() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(Some(config::Map::new()))
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let config = manager.load_layered(no_env()).unwrap();
        assert_eq!(config.booth, BoothSettings::default());
    }

    #[test]
    fn test_save_and_load_booth_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = BoothConfig::default();
        config.booth.countdown_seconds = 10;
        config.booth.default_camera = DevicePosition::Front;
        manager.save_booth_config(&config).unwrap();

        let loaded = manager.load_layered(no_env()).unwrap();
        assert_eq!(loaded.booth.countdown_seconds, 10);
        assert_eq!(loaded.booth.default_camera, DevicePosition::Front);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (manager, _temp_dir) = create_test_config_manager();
        manager.ensure_booth_config().unwrap();

        let mut vars = config::Map::new();
        vars.insert("MY4CUTS__BOOTH__COUNTDOWN_SECONDS".to_string(), "5".to_string());
        vars.insert("MY4CUTS__BOOTH__SPLASH_DELAY_MS".to_string(), "10".to_string());
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars));

        let loaded = manager.load_layered(environment).unwrap();
        assert_eq!(loaded.booth.countdown_seconds, 5);
        assert_eq!(loaded.booth.splash_delay_ms, 10);
        assert_eq!(loaded.booth.processing_delay_ms, 2000);
    }

    #[test]
    fn test_invalid_values_are_validated() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(
            manager.booth_config_path(),
            "booth:\n  countdown_seconds: 7\n  max_selection: 12\n",
        )
        .unwrap();

        let loaded = manager.load_layered(no_env()).unwrap();
        assert_eq!(loaded.booth.countdown_seconds, 3);
        assert_eq!(loaded.booth.max_selection, 4);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_validation_warnings_reach_installed_logger() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.booth_config_path(), "booth:\n  countdown_seconds: 7\n").unwrap();

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        let loaded = tracing::subscriber::with_default(subscriber, || {
            manager.load_layered(no_env()).unwrap()
        });

        assert_eq!(loaded.booth.countdown_seconds, 3);
        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("WARN"));
        assert!(text.contains("Countdown of 7s"));
    }
}
