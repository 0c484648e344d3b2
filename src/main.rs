use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use health_beacon::api::ApiResponse;
use health_beacon::config::{self, Settings};
use health_beacon::domain::{AnalyzeRequest, DoctorsQuery, Gender, PatientInfo};
use health_beacon::flow::FlowController;
use health_beacon::geolocation::Geolocator;
use health_beacon::{cli, logging, render, ApiClient};

#[derive(Parser)]
#[command(name = "health-beacon", version, about = "Symptom checker and nearby doctor search")]
struct Cli {
    /// Backend API base URL
    #[arg(long, global = true, env = "HEALTH_BEACON_API_URL")]
    api_url: Option<String>,

    /// Device location as "lat,lon"
    #[arg(long, global = true, allow_hyphen_values = true, env = "HEALTH_BEACON_DEVICE_LOCATION")]
    location: Option<String>,

    /// Refuse location access
    #[arg(long, global = true)]
    no_location: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Check that the backend is reachable")]
    Health,
    #[command(about = "Analyze a list of symptoms")]
    Analyze {
        #[arg(required = true, help = "Symptom names, e.g. headache fever")]
        symptoms: Vec<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long = "history", help = "Past condition (repeatable)")]
        medical_history: Vec<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long = "conditions")]
        medical_conditions: Option<String>,
        #[arg(long, help = "Print the {success, data | error} envelope as JSON")]
        json: bool,
    },
    #[command(about = "Find doctors near an address or coordinates")]
    Doctors {
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        address: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long, default_value_t = 5.0)]
        radius: f64,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "List warning signs that need emergency care")]
    EmergencySigns,
    #[command(about = "Walk through the symptom checker interactively")]
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    // Load configuration
    let mut settings = Settings::from_env()?;
    if let Some(url) = &args.api_url {
        settings = settings.with_api_base_url(url)?;
    }
    if let Some(location) = &args.location {
        settings.device_location =
            Some(config::parse_coordinates(location).context("--location must be \"lat,lon\"")?);
    }
    if args.no_location {
        settings.location_disabled = true;
    }

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::debug!(env = ?settings.env, api = %settings.api_base_url, "Starting health-beacon");

    let api = ApiClient::new(
        &settings.api_base_url,
        settings.api_timeout_seconds,
        settings.health_timeout_seconds,
    )?;

    match args.command.unwrap_or(Commands::Check) {
        Commands::Health => match api.health_check().await {
            Ok(report) => println!(
                "Backend server: online ({})",
                report.message.as_deref().unwrap_or("ok")
            ),
            Err(e) => {
                println!("Backend server is not responding: {e}");
                std::process::exit(1);
            }
        },
        Commands::Analyze {
            symptoms,
            age,
            gender,
            medical_history,
            allergies,
            medical_conditions,
            json,
        } => {
            let patient = PatientInfo {
                age,
                gender,
                medical_history,
                allergies,
                medical_conditions,
            };
            let request = match AnalyzeRequest::new(symptoms, Some(patient)) {
                Ok(request) => request,
                Err(e) if json => return print_json(&ApiResponse::<()>::rejected(&e)),
                Err(e) => return Err(e.into()),
            };
            let result = api.analyze_symptoms(&request).await;
            if json {
                print_json(&ApiResponse::from(result))?;
            } else {
                let analysis = result?;
                print!("{}", render::analysis_summary(&analysis, &analysis.derived_conditions()));
            }
        }
        Commands::Doctors {
            address,
            lat,
            lon,
            radius,
            limit,
            json,
        } => {
            let coordinates = lat.zip(lon).map(|(latitude, longitude)| {
                health_beacon::domain::Coordinates {
                    latitude,
                    longitude,
                }
            });
            let query = match DoctorsQuery::new(coordinates, address.as_deref(), radius, limit) {
                Ok(query) => query,
                Err(e) if json => return print_json(&ApiResponse::<()>::rejected(&e)),
                Err(e) => return Err(e.into()),
            };
            let result = api.find_nearby_doctors(&query).await;
            if json {
                print_json(&ApiResponse::from(result))?;
            } else {
                print!("{}", render::doctor_list(&result?));
            }
        }
        Commands::EmergencySigns => {
            for sign in api.emergency_signs().await? {
                println!("- {sign}");
            }
        }
        Commands::Check => {
            let geolocator = Arc::new(Geolocator::from_settings(&settings));
            cli::run_session(FlowController::new(api, geolocator)).await?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
