mod config;
mod replay;
mod telemetry;
mod tracker;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::config::Config;
use crate::replay::ReplayFile;

#[derive(Parser)]
#[command(name = "aat-tracker")]
#[command(about = "Automatic antenna tracker driven by target GPS telemetry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate { config: String },
    /// Replay a recorded fix sequence through the tracker
    Replay { config: String, fixes: String },
    /// Run the tracker with its HTTP ingest and status API
    Serve { config: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Replay { config, fixes } => replay(&config, &fixes),
        Commands::Serve { config } => serve(&config),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let t = &config.tracker;
    println!("Config is valid");
    println!("  home needs {} satellites", t.satellite_home_min);
    println!("  projection {}", if t.project { "on" } else { "off" });
    println!("  smoothing {}", t.servo_smooth);
    println!(
        "  first update after {}",
        humantime::format_duration(t.first_update_delay)
    );
    println!(
        "  azimuth servo {}-{}us, elevation servo {}-{}us",
        t.servo.azimuth.low, t.servo.azimuth.high, t.servo.elevation.low, t.servo.elevation.high
    );
    println!("  {} api keys, bind {}", config.api_keys.len(), config.web.bind);
    ExitCode::SUCCESS
}

fn replay(config_path: &str, fixes_path: &str) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let recording = match ReplayFile::from_file(fixes_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Replay error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for line in recording.run(&config.tracker) {
        println!("{}", line);
    }
    ExitCode::SUCCESS
}

fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
