use serde::Deserialize;
use std::path::PathBuf;

use crate::engine::EngineConfig;
use crate::error::GenerationError;
use crate::folders;
use crate::models::{RunRequest, SizeUnit};
use crate::writer::DEFAULT_CHUNK_SIZE_BYTES;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub output: OutputConfig,
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub chunk_size_bytes: u64,
    pub file_size: u64,
    pub size_unit: SizeUnit,
    pub file_count: u64,
    pub fill_drive: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            file_size: 1,
            size_unit: SizeUnit::Gbyte,
            file_count: 1,
            fill_drive: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// When unset the OS documents folder is used.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Snapshots buffered per progress subscriber (slow renderers skip ahead).
    pub broadcast_capacity: usize,
    /// Minimum time between two rendered progress lines.
    pub render_interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            render_interval_ms: 200,
        }
    }
}

/// Per-run values given on the command line; `None` falls back to the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// `Some(true)` for `--fill`, `Some(false)` for `--no-fill`.
    pub fill: Option<bool>,
    pub size: Option<u64>,
    pub unit: Option<SizeUnit>,
    pub count: Option<u64>,
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `junkgen.toml`). A missing file means defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "junkgen.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path, "no config file; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::Error::new(e).context(format!("reading config {}", path))),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            chunk_size_bytes: self.generation.chunk_size_bytes,
            broadcast_capacity: self.progress.broadcast_capacity,
        }
    }

    /// Output folder: explicit flag, then `output.directory`, then the OS documents folder.
    pub fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.output.directory.clone())
            .unwrap_or_else(folders::default_output_dir)
    }

    /// Builds the run request, flags first. An explicit file count selects fixed-count
    /// mode even when `generation.fill_drive` is set; asking for both is rejected.
    pub fn run_request(&self, overrides: RunOverrides) -> Result<RunRequest, GenerationError> {
        let generation = &self.generation;
        let fill = match (overrides.fill, overrides.count) {
            (Some(true), Some(count)) => {
                return Err(GenerationError::Validation(format!(
                    "a file count ({count}) cannot be combined with fill mode"
                )));
            }
            (Some(fill), _) => fill,
            (None, Some(_)) => false,
            (None, None) => generation.fill_drive,
        };

        let file_size_bytes = overrides
            .unit
            .unwrap_or(generation.size_unit)
            .to_bytes(overrides.size.unwrap_or(generation.file_size))?;
        let dir = self.output_dir(overrides.dir);

        Ok(if fill {
            RunRequest::fill_drive(dir, file_size_bytes)
        } else {
            RunRequest::fixed_count(
                dir,
                file_size_bytes,
                overrides.count.unwrap_or(generation.file_count),
            )
        })
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.generation.chunk_size_bytes > 0,
            "generation.chunk_size_bytes must be > 0, got {}",
            self.generation.chunk_size_bytes
        );
        anyhow::ensure!(
            self.generation.file_size > 0,
            "generation.file_size must be > 0, got {}",
            self.generation.file_size
        );
        anyhow::ensure!(
            self.generation
                .size_unit
                .to_bytes(self.generation.file_size)
                .is_ok(),
            "generation.file_size {} overflows in unit {:?}",
            self.generation.file_size,
            self.generation.size_unit
        );
        anyhow::ensure!(
            self.generation.file_count > 0,
            "generation.file_count must be > 0, got {}",
            self.generation.file_count
        );
        anyhow::ensure!(
            self.progress.broadcast_capacity > 0,
            "progress.broadcast_capacity must be > 0, got {}",
            self.progress.broadcast_capacity
        );
        anyhow::ensure!(
            self.progress.render_interval_ms > 0,
            "progress.render_interval_ms must be > 0, got {}",
            self.progress.render_interval_ms
        );
        Ok(())
    }
}
