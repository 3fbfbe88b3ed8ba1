//! fftune - Force feedback effect tuning CLI
//!
//! Opens a Linux event device, then reads commands that upload, play, stop
//! and remove rumble and periodic effects on it.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod config;
mod error;
#[cfg(target_os = "linux")]
mod evdev_device;
mod output;
mod probe;
mod shell;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use openracing_fftune::mock::MockFfDevice;
use openracing_fftune::{FfDevice, FfTune};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TuneConfig;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "fftune")]
#[command(about = "Force feedback effect tuning program")]
#[command(version)]
#[command(long_about = "
fftune opens a Linux event device that supports force feedback and drops into
a small shell for uploading, playing and removing rumble and periodic effects.

Without a device argument the first device supporting both FF_RUMBLE and
FF_PERIODIC is used. Type \"help\" in the shell for the command list.
")]
struct Cli {
    /// Event device to open, e.g. /dev/input/event5
    device: Option<PathBuf>,

    /// Test for a device supporting FF_RUMBLE and FF_PERIODIC, then exit
    #[arg(short = 't', long)]
    probe: bool,

    /// YAML configuration file
    #[arg(long, env = "FFTUNE_CONFIG")]
    config: Option<PathBuf>,

    /// Run against a simulated device instead of real hardware
    #[arg(long, conflicts_with = "probe")]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, help = "Output in JSON format for machine parsing")]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fftune={log_level},openracing_fftune={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match execute(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn execute(cli: &Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => TuneConfig::load(path)?,
        None => TuneConfig::default(),
    };
    if let Some(device) = &cli.device {
        config.device = Some(device.clone());
    }

    if !cli.json {
        println!("\nForce feedback effect tuning program\n");
    }

    if cli.probe {
        return Ok(probe_command(&config, cli.json));
    }

    if cli.dry_run {
        return session(MockFfDevice::new("fftune dry-run device"), &config, cli.json);
    }

    let path = match &config.device {
        Some(path) => path.clone(),
        None => {
            let hit = probe::probe(config.probe_limit).ok_or_else(|| {
                CliError::DeviceNotFound(
                    "no device supports FF_RUMBLE and FF_PERIODIC".to_string(),
                )
            })?;
            hit.path
        }
    };
    session(open_device(&path)?, &config, cli.json)
}

fn probe_command(config: &TuneConfig, json: bool) -> ExitCode {
    if json {
        let hit = probe::probe(config.probe_limit);
        let found = hit.is_some();
        let result = serde_json::json!({
            "success": found,
            "device": hit.map(|hit| serde_json::json!({
                "path": hit.path.display().to_string(),
                "name": hit.name
            }))
        });
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format result as JSON: {e}"),
        }
        return if found { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    println!("Testing for FF interface that supports FF_RUMBLE and FF_PERIODIC");
    match probe::probe(config.probe_limit) {
        Some(hit) => {
            println!(
                "Device {} ({}) supports FF_RUMBLE and FF_PERIODIC",
                hit.path.display(),
                hit.name
            );
            ExitCode::SUCCESS
        }
        None => {
            println!("No support found for FF_PERIODIC and FF_RUMBLE effects in any device");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "linux")]
fn open_device(path: &Path) -> Result<evdev_device::EvdevFfDevice, CliError> {
    let device =
        evdev_device::EvdevFfDevice::open(path).map_err(|source| CliError::DeviceOpen {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %device.path().display(), "device opened");
    Ok(device)
}

#[cfg(not(target_os = "linux"))]
fn open_device(_path: &Path) -> Result<MockFfDevice, CliError> {
    Err(CliError::Unsupported)
}

fn session<D: FfDevice>(device: D, config: &TuneConfig, json: bool) -> Result<ExitCode> {
    let mut tune = FfTune::new(device).map_err(CliError::from)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        output::write_device_summary_json(
            &mut out,
            tune.device().name(),
            tune.capabilities(),
            tune.device().max_simultaneous(),
        )?;
    } else {
        output::write_device_summary(
            &mut out,
            tune.device().name(),
            tune.capabilities(),
            tune.device().max_simultaneous(),
        )?;
        writeln!(out, "Enter command, type \"help\" for available commands")?;
    }

    let sink = shell::ShellOutput {
        out: &mut out,
        prompt: &config.prompt,
        json,
    };
    let result = shell::run(&mut tune, io::stdin().lock(), sink);

    if config.stop_on_exit {
        for (slot, err) in tune.stop_all() {
            warn!(slot, error = %err, "effect still playing at exit");
        }
    }
    result.map_err(CliError::from)?;
    Ok(ExitCode::SUCCESS)
}
