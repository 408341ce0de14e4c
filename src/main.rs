mod ephemeris;
mod frames;
mod source;
mod web;

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::process::ExitCode;

use crate::ephemeris::{kinematics, Epoch, EPOCH_FORMAT};
use crate::frames::{Ellipsoid, FrameModel};
use crate::source::Snapshot;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "oem-tracker")]
#[command(about = "Spacecraft ephemeris query service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "config.yaml")]
        config: String,
    },
    /// Parse an ephemeris document and print a summary
    Validate { document: String },
    /// Print state vector, speed and ground location for one epoch
    Locate {
        document: String,
        #[arg(long, help = format!("Exact epoch ({}); defaults to the vector nearest to now", EPOCH_FORMAT))]
        epoch: Option<String>,
        #[arg(long, value_enum, default_value_t = EllipsoidArg::Wgs84)]
        ellipsoid: EllipsoidArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EllipsoidArg {
    Wgs84,
    Sphere,
}

impl From<EllipsoidArg> for Ellipsoid {
    fn from(arg: EllipsoidArg) -> Self {
        match arg {
            EllipsoidArg::Wgs84 => Ellipsoid::Wgs84,
            EllipsoidArg::Sphere => Ellipsoid::Sphere,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Validate { document } => validate(&document),
        Commands::Locate {
            document,
            epoch,
            ellipsoid,
        } => locate(&document, epoch.as_deref(), ellipsoid.into()),
    }
}

async fn serve(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_snapshot(path: &str) -> Option<Snapshot> {
    let document = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return None;
        }
    };

    match Snapshot::from_document(&document, path) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(snapshot) = read_snapshot(path) else {
        return ExitCode::FAILURE;
    };

    let summary = snapshot.summary();
    println!("Ephemeris is valid ({} state vectors)", summary.state_vectors);
    if let (Some(first), Some(last)) = (summary.first_epoch, summary.last_epoch) {
        println!("  span: {} .. {}", first, last);
    }
    if let Some(name) = &summary.object_name {
        println!("  object: {}", name);
    }
    for (key, value) in snapshot.metadata.segment_metadata() {
        println!("  {}: {}", key, value);
    }
    println!("  comments: {}", snapshot.metadata.comments().len());
    ExitCode::SUCCESS
}

fn locate(path: &str, epoch: Option<&str>, ellipsoid: Ellipsoid) -> ExitCode {
    let Some(snapshot) = read_snapshot(path) else {
        return ExitCode::FAILURE;
    };

    let found = match epoch {
        Some(text) => Epoch::parse(text)
            .map_err(|e| e.to_string())
            .and_then(|epoch| snapshot.series.by_epoch(epoch).map_err(|e| e.to_string())),
        None => snapshot
            .series
            .nearest(chrono::Utc::now())
            .map_err(|e| e.to_string()),
    };
    let vector = match found {
        Ok(v) => *v,
        Err(e) => {
            eprintln!("Lookup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let model = FrameModel {
        ellipsoid,
        ..FrameModel::default()
    };
    let computed = kinematics::speed(&vector.velocity).and_then(|speed| {
        frames::to_geodetic(vector.epoch, &vector.position, model).map(|loc| (speed, loc))
    });
    let (speed, location) = match computed {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Cannot locate state vector: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = serde_json::json!({
        "state_vector": vector,
        "speed_km_s": speed,
        "location": location,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}
