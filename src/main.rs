//! Command-line front end for the route optimizer.

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use log::info;
use route_optimizer::utils::{format_duration, format_summary, save_report, write_report};
use route_optimizer::{Algorithm, Config, Location, RouteOptimizer, RouteRequest};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "route-optimizer", version, about = "Delivery route optimization")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Optimize a JSON route request
    Optimize {
        /// Route request (JSON)
        #[arg(long)]
        request: PathBuf,
        /// Engine configuration (JSON); defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the request's algorithm
        #[arg(long)]
        algorithm: Option<Algorithm>,
        /// Override the request's seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write the result as JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write a human-readable report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Predict the travel time between two points
    Eta {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lng: f64,
        /// Departure as `YYYY-MM-DDTHH:MM:SS`; now when omitted
        #[arg(long)]
        departure: Option<NaiveDateTime>,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Optimize {
            request,
            config,
            algorithm,
            seed,
            output,
            report,
        } => {
            let config: Config = match config {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => Config::default(),
            };
            let mut request: RouteRequest =
                serde_json::from_str(&fs::read_to_string(&request)?)?;
            if algorithm.is_some() {
                request.options.algorithm = algorithm;
            }
            if seed.is_some() {
                request.options.seed = seed;
            }

            let optimizer = RouteOptimizer::new(config);
            let start = Instant::now();
            let result = optimizer.optimize_routes(&request)?;
            info!("Search completed in {}", format_duration(start.elapsed()));

            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    eprintln!("{}", format_summary(&result));
                }
                None => println!("{}", json),
            }

            match report {
                Some(path) => save_report(&result, path)?,
                None if cli.verbose > 0 => write_report(&result, &mut io::stderr())?,
                None => {}
            }
        }
        Command::Eta {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
            departure,
        } => {
            let optimizer = RouteOptimizer::default();
            let from = Location::new("from", from_lat, from_lng);
            let to = Location::new("to", to_lat, to_lng);
            let departure = departure.unwrap_or_else(|| Local::now().naive_local());

            let prediction = optimizer.predict_eta(&from, &to, departure);
            println!("Distance:   {:.2} km", prediction.distance_km);
            println!("Duration:   {:.0} min", prediction.duration_minutes);
            println!("Arrival:    {}", prediction.estimated_arrival.format("%Y-%m-%d %H:%M"));
            println!("Confidence: {}%", prediction.confidence);
            for factor in &prediction.factor_descriptions {
                println!("  - {}", factor);
            }
        }
    }

    Ok(())
}
