use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vidscribe::cli::{Cli, Commands, ConfigAction};
use vidscribe::config::{Config, PacingMode};
use vidscribe::fallback::{BitrateEstimate, ChunkPlan, ChunkSpec};
use vidscribe::{SourceMode, TranscribeOptions, TranscriptionService};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transcribe {
            url,
            language,
            no_auto_language,
            direct,
            json,
            pace,
        } => {
            vidscribe::logging::init(cli.quiet, cli.verbose);
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(pace) = pace {
                apply_pace(&mut config, pace);
            }

            let options = TranscribeOptions {
                language,
                auto_language_detection: no_auto_language.then_some(false),
            };
            handle_transcribe(&config, &url, &options, direct, json).await?;
        }
        Commands::Serve { host, port } => {
            vidscribe::logging::init(cli.quiet, cli.verbose);
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            handle_serve(&config).await?;
        }
        Commands::Plan { length, bitrate } => {
            let config = load_config(cli.config.as_deref())?;
            print_plan(&config, length, bitrate)?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "vidscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config), which must exist
/// 2. Default config path (~/.config/vidscribe/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides are applied on top.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Override pacing from the command line: always a fixed delay.
fn apply_pace(config: &mut Config, pace: Duration) {
    config.pacing.mode = PacingMode::Fixed;
    config.pacing.delay_ms = pace.as_millis() as u64;
}

async fn handle_transcribe(
    config: &Config,
    url: &str,
    options: &TranscribeOptions,
    direct: bool,
    json: bool,
) -> Result<()> {
    let mode = if direct {
        SourceMode::Direct
    } else {
        SourceMode::YtDlp
    };
    let service = TranscriptionService::from_config(config, mode)
        .context("Failed to set up transcription")?;

    let outcome = match service.transcribe(url, options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        eprintln!(
            "{} {}  {} {}  {} {}s",
            "Source:".dimmed(),
            outcome.source.green(),
            "Language:".dimmed(),
            outcome.language,
            "Duration:".dimmed(),
            outcome.duration_seconds
        );
        println!("{}", outcome.transcript);
    }

    Ok(())
}

async fn handle_serve(config: &Config) -> Result<()> {
    let service = TranscriptionService::from_config(config, SourceMode::YtDlp)
        .context("Failed to set up transcription")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(version = %vidscribe::version_string(), "Starting vidscribe API");
    vidscribe::server::serve(Arc::new(service), &addr).await?;
    Ok(())
}

fn print_plan(config: &Config, length: u64, bitrate: Option<u64>) -> Result<()> {
    config.validate()?;
    let chunking = &config.chunking;
    let estimate = BitrateEstimate::from_bitrate(bitrate, chunking.floor_bytes_per_sec);
    let spec = ChunkSpec::from_durations(
        estimate,
        chunking.target_chunk_secs,
        chunking.overlap_secs,
    )?;
    let plan = ChunkPlan::new(length, spec);

    println!(
        "{} {}  {} {} B  {} {} B  {} {}",
        "Rate:".dimmed(),
        estimate,
        "Chunk:".dimmed(),
        spec.chunk_bytes(),
        "Overlap:".dimmed(),
        spec.overlap_bytes(),
        "Chunks:".dimmed(),
        plan.len().green()
    );
    for (index, range) in plan.iter().enumerate() {
        println!(
            "  [{}] {}..{} ({} B)",
            index,
            range.offset,
            range.end(),
            range.length
        );
    }

    Ok(())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            match config.get_value_by_path(&key) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::List => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            print!("{}", config.to_redacted_toml()?);
        }
        ConfigAction::Dump => {
            print!("{}", Config::default().to_redacted_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
