/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use clap::Parser;
use p2c::pipeline::export::ExportProcessor;
use p2c::pipeline::load_environment;
use p2c::pipeline::settings::{Options, Settings, USAGE};
use p2c::source::prometheus::PrometheusClient;
use p2c::storage::s3::S3Store;
use std::process;

const FATAL: i32 = 1;

fn fatal(message: String) -> ! {
    println!("{}", message);
    process::exit(FATAL);
}

fn init_logging(debug: bool) {
    let filter = if debug { "p2c=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn main() {
    let _ = load_environment();
    let options = Options::parse();

    let settings = match Settings::new(&options) {
        Ok(settings) => settings,
        Err(_) => fatal(String::from(USAGE)),
    };

    init_logging(settings.debug);
    if settings.debug {
        settings.print_debug();
    }

    let client = PrometheusClient::new(&settings.address)
        .unwrap_or_else(|e| fatal(format!("Error creating client: {}", e)));

    let processor = ExportProcessor::new("p2c", &settings)
        .unwrap_or_else(|e| fatal(format!("Error parsing time range: {}", e)));

    let files = processor
        .export(&client)
        .unwrap_or_else(|e| fatal(e.to_string()));

    match &settings.upload_s3 {
        Some(destination) => {
            let store = S3Store::new(settings.region.as_deref(), settings.s3_endpoint.as_deref());
            processor.upload(&files, destination, store.as_ref());
        }
        None => processor.report_local(&files),
    }
}
