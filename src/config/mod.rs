//! Typed configuration.
//!
//! Built once at startup from defaults, an optional TOML file and
//! environment overrides, validated, then shared read-only as `Arc<Config>`.
//! Nothing in the crate reads process-wide settings after that point.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub dictionary: DictionaryConfig,
    pub pipeline: PipelineConfig,
    pub generation: GenerationConfig,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file. Parent directories are created on open.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Newline-separated seed words.
    pub path: PathBuf,
    /// Inclusive bounds on the trimmed word length.
    pub min_word_length: usize,
    pub max_word_length: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/usr/share/dict/words"),
            min_word_length: 4,
            max_word_length: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Generator worker count. `None` = available parallelism - 1, at least 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    pub batch_size: usize,
    pub channel_capacity: usize,
    /// Stop each worker after this many full passes over its chunk.
    /// `None` keeps workers running until cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_passes: Option<u64>,
    /// Seed for reproducible runs. Worker `i` shuffles with `seed + i`;
    /// enhancement choices depend on `seed` and the variant alone, and use 0
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Writer pop timeout, also the flush retry backoff.
    pub poll_interval_ms: u64,
    pub monitor_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            batch_size: 10_000,
            channel_capacity: 100_000,
            max_passes: None,
            seed: None,
            poll_interval_ms: 1_000,
            monitor_interval_ms: 1_000,
        }
    }
}

impl PipelineConfig {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Lowercase character -> replacement glyphs.
    pub substitutions: BTreeMap<String, Vec<String>>,
    pub numbers: Vec<char>,
    pub symbols: Vec<char>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let table: [(&str, &[&str]); 8] = [
            ("a", &["@", "4"]),
            ("b", &["8"]),
            ("e", &["3"]),
            ("g", &["9"]),
            ("i", &["1", "!"]),
            ("o", &["0"]),
            ("s", &["$", "5"]),
            ("t", &["7"]),
        ];
        let substitutions = table
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|g| g.to_string()).collect()))
            .collect();

        Self {
            substitutions,
            numbers: ('0'..='9').collect(),
            symbols: vec!['!', '@', '#', '$', '%', '&'],
        }
    }
}

impl GenerationConfig {
    /// Substitution table keyed by character. Assumes a validated config.
    pub fn substitution_table(&self) -> HashMap<char, Vec<String>> {
        self.substitutions
            .iter()
            .filter_map(|(key, glyphs)| key.chars().next().map(|c| (c, glyphs.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// OTLP endpoint (e.g. "http://localhost:4317"). Unset = stderr only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// Missing sections and keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("bad config file {}: {e}", path.display())))?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(path) = optional_var("LEETFORGE_DB_PATH") {
            self.storage.db_path = PathBuf::from(path);
        }
        if let Some(path) = optional_var("LEETFORGE_DICTIONARY") {
            self.dictionary.path = PathBuf::from(path);
        }
        if let Some(workers) = parsed_var("LEETFORGE_WORKERS")? {
            self.pipeline.workers = Some(workers);
        }
        if let Some(batch_size) = parsed_var("LEETFORGE_BATCH_SIZE")? {
            self.pipeline.batch_size = batch_size;
        }
        if let Some(capacity) = parsed_var("LEETFORGE_CHANNEL_CAPACITY")? {
            self.pipeline.channel_capacity = capacity;
        }
        if let Some(endpoint) = optional_var("OTEL_ENDPOINT") {
            self.telemetry.otel_endpoint = Some(endpoint);
        }
        if let Some(level) = optional_var("LOG_LEVEL") {
            self.telemetry.log_level = level;
        }
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        if pipeline.workers == Some(0) {
            return Err(invalid("pipeline.workers must be at least 1"));
        }
        if pipeline.batch_size == 0 {
            return Err(invalid("pipeline.batch_size must be at least 1"));
        }
        if pipeline.channel_capacity == 0 {
            return Err(invalid("pipeline.channel_capacity must be at least 1"));
        }
        if pipeline.max_passes == Some(0) {
            return Err(invalid("pipeline.max_passes must be at least 1 when set"));
        }
        if pipeline.poll_interval_ms == 0 || pipeline.monitor_interval_ms == 0 {
            return Err(invalid("pipeline intervals must be at least 1ms"));
        }

        let dictionary = &self.dictionary;
        if dictionary.min_word_length == 0 {
            return Err(invalid("dictionary.min_word_length must be at least 1"));
        }
        if dictionary.min_word_length > dictionary.max_word_length {
            return Err(Error::Config(format!(
                "dictionary.min_word_length ({}) exceeds max_word_length ({})",
                dictionary.min_word_length, dictionary.max_word_length
            )));
        }

        let generation = &self.generation;
        for (key, glyphs) in &generation.substitutions {
            if key.chars().count() != 1 {
                return Err(Error::Config(format!(
                    "substitution key {key:?} must be a single character"
                )));
            }
            // Words are lowercased before lookup, so an uppercase key never matches.
            if key.chars().any(char::is_uppercase) {
                return Err(Error::Config(format!(
                    "substitution key {key:?} must be lowercase"
                )));
            }
            if glyphs.is_empty() || glyphs.iter().any(|g| g.is_empty()) {
                return Err(Error::Config(format!(
                    "substitution {key:?} needs at least one non-empty glyph"
                )));
            }
        }
        if generation.numbers.is_empty() {
            return Err(invalid("generation.numbers must not be empty"));
        }
        if generation.symbols.is_empty() {
            return Err(invalid("generation.symbols must not be empty"));
        }

        Ok(())
    }

    /// Render the default configuration as TOML.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default())
            .map_err(|e| Error::Other(format!("serialize default config: {e}")))
    }
}

/// Available parallelism minus one for the writer, never below one.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "leetforge")
        .map(|dirs| dirs.data_dir().join("passwords.db"))
        .unwrap_or_else(|| PathBuf::from("passwords.db"))
}

fn invalid(message: &str) -> Error {
    Error::Config(message.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    optional_var(name)
        .map(|raw| {
            raw.parse()
                .map_err(|_| Error::Config(format!("environment variable {name}={raw:?} is invalid")))
        })
        .transpose()
}
