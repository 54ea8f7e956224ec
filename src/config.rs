//! Pipeline configuration loaded from a nested JSON file.
//!
//! ```json
//! {
//!   "general": { "worker_count": 4, "max_workers": 8, "chunk_size": 1000 },
//!   "hash": { "algorithm": "SHA256", "pbkdf2_iterations": 100000, "pbkdf2_salt_length": 32 },
//!   "input": { "csv_path": "data/sample_data.csv", "csv_encoding": "utf-8", "csv_delimiter": "," },
//!   "output": { "log_path": "logs/pipeline.log", "results_path": "logs/results.json", "verbose": false },
//!   "target": { "hash_to_find": "9f86d0..." }
//! }
//! ```
//!
//! Every section and key is optional and falls back to its default.

use crate::error::{PipelineError, Result};
use crate::hash::{Algorithm, DEFAULT_PBKDF2_ITERATIONS, DEFAULT_PBKDF2_SALT_LENGTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Worker pool sizing and chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Number of worker threads to spawn.
    pub worker_count: usize,
    /// Upper bound on workers hashing at the same time.
    pub max_workers: usize,
    /// Maximum number of candidates per chunk.
    pub chunk_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            max_workers: 8,
            chunk_size: 1000,
        }
    }
}

impl GeneralConfig {
    /// Workers allowed to hash concurrently: `min(worker_count, max_workers)`.
    pub fn concurrency_limit(&self) -> usize {
        self.worker_count.min(self.max_workers).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub algorithm: Algorithm,
    pub pbkdf2_iterations: u32,
    pub pbkdf2_salt_length: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            pbkdf2_salt_length: DEFAULT_PBKDF2_SALT_LENGTH,
        }
    }
}

/// Candidate corpus location and format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub csv_path: PathBuf,
    pub csv_encoding: String,
    pub csv_delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/sample_data.csv"),
            csv_encoding: "utf-8".to_string(),
            csv_delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub log_path: PathBuf,
    pub results_path: PathBuf,
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("logs/pipeline.log"),
            results_path: PathBuf::from("logs/results.json"),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Digest to search for. A run without a target still processes the corpus.
    pub hash_to_find: Option<String>,
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub general: GeneralConfig,
    pub hash: HashConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub target: TargetConfig,
}

impl PipelineConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!(
                "cannot read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&text)?;
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(text)
            .map_err(|e| PipelineError::config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every rule that must hold before a worker is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.general.worker_count < 1 {
            return Err(PipelineError::config("general.worker_count must be at least 1"));
        }
        if self.general.max_workers < 1 {
            return Err(PipelineError::config("general.max_workers must be at least 1"));
        }
        if self.general.chunk_size < 1 {
            return Err(PipelineError::config("general.chunk_size must be at least 1"));
        }
        if self.hash.pbkdf2_iterations < 1 {
            return Err(PipelineError::config("hash.pbkdf2_iterations must be at least 1"));
        }
        if self.hash.pbkdf2_salt_length < 1 {
            return Err(PipelineError::config("hash.pbkdf2_salt_length must be at least 1"));
        }

        let encoding = self.input.csv_encoding.to_ascii_lowercase().replace('_', "-");
        if encoding != "utf-8" && encoding != "utf8" {
            return Err(PipelineError::config(format!(
                "unsupported input.csv_encoding '{}': only utf-8 is supported",
                self.input.csv_encoding
            )));
        }

        Ok(())
    }

    /// The configured target digest, `None` when absent or blank.
    pub fn target_hash(&self) -> Option<&str> {
        self.target
            .hash_to_find
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.general.worker_count = worker_count;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.general.max_workers = max_workers;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.general.chunk_size = chunk_size;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.hash.algorithm = algorithm;
        self
    }

    pub fn with_pbkdf2(mut self, iterations: u32, salt_length: usize) -> Self {
        self.hash.pbkdf2_iterations = iterations;
        self.hash.pbkdf2_salt_length = salt_length;
        self
    }

    pub fn with_input(mut self, csv_path: impl Into<PathBuf>) -> Self {
        self.input.csv_path = csv_path.into();
        self
    }

    pub fn with_results_path(mut self, results_path: impl Into<PathBuf>) -> Self {
        self.output.results_path = results_path.into();
        self
    }

    pub fn with_target(mut self, hash: impl Into<String>) -> Self {
        self.target.hash_to_find = Some(hash.into());
        self
    }

    pub fn with_target_option(mut self, hash: Option<String>) -> Self {
        self.target.hash_to_find = hash;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.output.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"{
        "general": { "worker_count": 4, "chunk_size": 1000, "max_workers": 8, "timeout_seconds": 300 },
        "hash": { "algorithm": "SHA256", "pbkdf2_iterations": 100000, "pbkdf2_salt_length": 32 },
        "input": { "csv_path": "data/test.csv", "csv_encoding": "utf-8", "csv_delimiter": "," },
        "output": { "log_path": "logs/test.log", "results_path": "logs/results.json", "verbose": true }
    }"#;

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(VALID_CONFIG);
        let config = PipelineConfig::load(file.path()).unwrap();

        assert_eq!(config.general.worker_count, 4);
        assert_eq!(config.general.chunk_size, 1000);
        assert_eq!(config.hash.algorithm, Algorithm::Sha256);
        assert_eq!(config.input.csv_path, PathBuf::from("data/test.csv"));
        assert!(config.output.verbose);
        assert_eq!(config.target_hash(), None);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert!(config.general.worker_count >= 1);
        assert_eq!(config.general.max_workers, 8);
        assert_eq!(config.hash.pbkdf2_iterations, DEFAULT_PBKDF2_ITERATIONS);
        assert_eq!(config.input.csv_delimiter, ',');
    }

    #[test]
    fn test_invalid_worker_count() {
        let text = VALID_CONFIG.replace("\"worker_count\": 4", "\"worker_count\": 0");
        let err = PipelineConfig::from_json(&text).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_invalid_chunk_size() {
        let text = VALID_CONFIG.replace("\"chunk_size\": 1000", "\"chunk_size\": 0");
        assert!(PipelineConfig::from_json(&text).is_err());
    }

    #[test]
    fn test_invalid_algorithm() {
        let text = VALID_CONFIG.replace("\"SHA256\"", "\"INVALID\"");
        let err = PipelineConfig::from_json(&text).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("INVALID"));
    }

    #[test]
    fn test_unsupported_encoding() {
        let text = VALID_CONFIG.replace("\"utf-8\"", "\"latin-1\"");
        assert!(PipelineConfig::from_json(&text).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::load("nonexistent.json").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(PipelineConfig::from_json("{ \"general\": ").is_err());
    }

    #[test]
    fn test_target_hash_blank_is_none() {
        let config = PipelineConfig::default().with_target("   ");
        assert_eq!(config.target_hash(), None);

        let config = PipelineConfig::default().with_target(" abc ");
        assert_eq!(config.target_hash(), Some("abc"));
    }

    #[test]
    fn test_concurrency_limit() {
        let config = PipelineConfig::default().with_workers(16).with_max_workers(4);
        assert_eq!(config.general.concurrency_limit(), 4);

        let config = PipelineConfig::default().with_workers(2).with_max_workers(8);
        assert_eq!(config.general.concurrency_limit(), 2);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default()
            .with_workers(3)
            .with_chunk_size(7)
            .with_algorithm(Algorithm::Pbkdf2)
            .with_pbkdf2(1000, 16)
            .with_verbose(true);

        assert_eq!(config.general.worker_count, 3);
        assert_eq!(config.general.chunk_size, 7);
        assert_eq!(config.hash.algorithm, Algorithm::Pbkdf2);
        assert_eq!(config.hash.pbkdf2_salt_length, 16);
        assert!(config.output.verbose);
        assert!(config.validate().is_ok());
    }
}
