use anyhow::{Context, Result};
use clap::Parser;
use poise::audio::wav;
use poise::cli::{Cli, Commands, ConfigAction};
use poise::config::Config;
use poise::offline;
use poise::pipeline::inference::PassthroughEngine;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level().as_str()),
    )
    .init();
    log::debug!("poise {}", poise::version_string());

    match cli.command {
        Commands::Process {
            ref input,
            ref output,
            vad_threshold_db,
            atten_lim_db,
            json,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(db) = vad_threshold_db {
                config.processor.vad_threshold_db = db;
            }
            if let Some(db) = atten_lim_db {
                config.processor.atten_lim_db = db;
            }
            config.validate()?;
            run_process(&config, input, output, json, cli.quiet)?;
        }
        Commands::Spectral {
            ref input,
            ref output,
        } => {
            run_spectral(input, output, cli.quiet)?;
        }
        Commands::Config { ref action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Load config from a custom path or the default location, then apply env overrides.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };

    Ok(config.with_env_overrides())
}

fn run_process(config: &Config, input: &Path, output: &Path, json: bool, quiet: bool) -> Result<()> {
    let audio = wav::read_mono(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    log::info!(
        "Loaded {} ({:.2}s at {} Hz)",
        input.display(),
        audio.duration_secs(),
        audio.sample_rate
    );
    let (input_rate, output_rate) = config.resampling.rates_for(audio.sample_rate)?;

    let result = offline::enhance_to(
        &audio.samples,
        input_rate,
        output_rate,
        config.processor,
        &mut PassthroughEngine,
    )?;

    wav::write_mono(output, &result.samples, result.sample_rate)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.stats)?);
    } else if !quiet {
        eprintln!("{}", result.stats);
        eprintln!("Wrote {}", output.display());
    }

    Ok(())
}

fn run_spectral(input: &Path, output: &Path, quiet: bool) -> Result<()> {
    let audio = wav::read_mono(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let reconstructed = offline::spectral_round_trip(&audio.samples);
    wav::write_mono(output, &reconstructed, audio.sample_rate)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !quiet {
        eprintln!(
            "Reconstructed {} samples at {} Hz -> {}",
            reconstructed.len(),
            audio.sample_rate,
            output.display()
        );
    }

    Ok(())
}

fn handle_config_command(action: &ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let path: Option<PathBuf> = custom_path
                .map(Path::to_path_buf)
                .or_else(Config::default_path);
            match path {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("Could not determine config directory"),
            }
        }
    }
    Ok(())
}
