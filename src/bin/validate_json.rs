// Checks every static JSON asset against its schema. Exits 1 on any failure.

use std::process::ExitCode;

use mazad_rust::{config::Settings, integrity, logging};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("mazad_rust=warn");

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = integrity::validate_all(&integrity::default_targets(&settings)).await;
    println!("{}", report);

    if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
