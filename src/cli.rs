//! Command-line interface for poise
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Real-time audio enhancement pipeline
#[derive(Parser, Debug)]
#[command(name = "poise", version, about = "Real-time audio enhancement pipeline")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a WAV file through the frame processor
    Process {
        /// Input WAV file (any rate, mixed down to mono)
        input: PathBuf,

        /// Output WAV file, written at the input rate
        output: PathBuf,

        /// VAD threshold in dBFS (overrides config)
        #[arg(long, value_name = "DB", allow_negative_numbers = true)]
        vad_threshold_db: Option<f32>,

        /// Attenuation limit in dB (overrides config)
        #[arg(long, value_name = "DB", allow_negative_numbers = true)]
        atten_lim_db: Option<f32>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Round-trip a WAV file through STFT and ISTFT
    Spectral {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,
    },

    /// Configuration management
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

impl Cli {
    /// Log filter implied by `-q` / `-v`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        }
    }
}
