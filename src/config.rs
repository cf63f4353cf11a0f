use crate::defaults;
use crate::error::{PoiseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub processor: ProcessorConfig,
    pub resampling: ResamplingConfig,
}

/// Frame processor tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessorConfig {
    pub vad_threshold_db: f32,
    pub atten_lim_db: f32,
    pub hang_time_ms: f32,
}

/// Device-side sample rates bridged to the 48 kHz pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ResamplingConfig {
    pub input_rate: Option<u32>,
    pub output_rate: Option<u32>,
}

impl ResamplingConfig {
    /// Input and output rates for audio whose native rate is `source_rate`.
    ///
    /// A configured `input_rate` must match the source. Without an
    /// `output_rate` the output stays at the source rate.
    pub fn rates_for(&self, source_rate: u32) -> Result<(u32, u32)> {
        if let Some(rate) = self.input_rate
            && rate != source_rate
        {
            return Err(invalid(
                "resampling.input_rate",
                &format!("configured {} Hz but audio is {} Hz", rate, source_rate),
            ));
        }
        Ok((source_rate, self.output_rate.unwrap_or(source_rate)))
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            vad_threshold_db: defaults::VAD_THRESHOLD_DB,
            atten_lim_db: defaults::ATTEN_LIM_DB,
            hang_time_ms: defaults::HANG_TIME_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only falls back to defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(PoiseError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - POISE_VAD_THRESHOLD_DB → processor.vad_threshold_db
    /// - POISE_ATTEN_LIM_DB → processor.atten_lim_db
    /// - POISE_HANG_TIME_MS → processor.hang_time_ms
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(value) = env_f32("POISE_VAD_THRESHOLD_DB") {
            self.processor.vad_threshold_db = value;
        }

        if let Some(value) = env_f32("POISE_ATTEN_LIM_DB") {
            self.processor.atten_lim_db = value;
        }

        if let Some(value) = env_f32("POISE_HANG_TIME_MS") {
            self.processor.hang_time_ms = value;
        }

        self
    }

    /// Reject values the processor cannot run with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.processor;
        if !p.vad_threshold_db.is_finite() {
            return Err(invalid("processor.vad_threshold_db", "must be a finite number"));
        }
        if !p.atten_lim_db.is_finite() {
            return Err(invalid("processor.atten_lim_db", "must be a finite number"));
        }
        if !p.hang_time_ms.is_finite() || p.hang_time_ms < 0.0 {
            return Err(invalid(
                "processor.hang_time_ms",
                "must be a finite, non-negative number",
            ));
        }
        if self.resampling.input_rate == Some(0) {
            return Err(invalid("resampling.input_rate", "must be greater than 0"));
        }
        if self.resampling.output_rate == Some(0) {
            return Err(invalid("resampling.output_rate", "must be greater than 0"));
        }
        Ok(())
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PoiseError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/poise/config.toml on Linux, or `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("poise").join("config.toml"))
    }
}

fn env_f32(key: &str) -> Option<f32> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .and_then(|v| v.trim().parse().ok())
}

fn invalid(key: &str, message: &str) -> PoiseError {
    PoiseError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
