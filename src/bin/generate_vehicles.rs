// Builds vehicles.json from the brands/models/trims sheets in the vehicles directory

use std::process::ExitCode;

use mazad_rust::{config::Settings, generator, logging};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("mazad_rust=info");

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match generator::generate(&settings.vehicles_dir()).await {
        Ok(vehicles) => {
            println!("✅ Generated {} with {} brands.", generator::OUTPUT_FILE, vehicles.brands.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to generate {}", generator::OUTPUT_FILE);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
