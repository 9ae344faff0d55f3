/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::pipeline::split_queries;
use clap::Parser;
use std::io::Error;

pub const USAGE: &str = "Usage: p2c --query <Prometheus query> --time-range <time range> --address <Prometheus address> [--upload-s3 <S3 destination>] [--region <AWS region>] [--filename <Destination file name>] [--debug]";

/// Raw options as given on the command line or in the environment.
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about, long_about = None)]
pub struct Options {
    /// Prometheus queries, separated by spaces
    #[arg(long, env = "P2C_QUERY", default_value = "")]
    pub query: String,

    /// Time range, e.g. 29d
    #[arg(long, env = "P2C_TIMERANGE", default_value = "")]
    pub time_range: String,

    /// Prometheus address
    #[arg(long, env = "P2C_ADDRESS", default_value = "")]
    pub address: String,

    /// S3 destination, e.g. s3://my-s3-bucket/folder/
    #[arg(long, env = "P2C_UPLOAD_S3", default_value = "")]
    pub upload_s3: String,

    #[arg(long, env = "P2C_REGION", default_value = "")]
    pub region: String,

    /// S3-compatible endpoint URL
    #[arg(long, env = "P2C_S3_ENDPOINT", default_value = "")]
    pub s3_endpoint: String,

    /// Destination file name
    #[arg(long, env = "P2C_FILENAME", default_value = "")]
    pub filename: String,

    /// Print debug information
    #[arg(long, env = "P2C_DEBUG", default_value = "false", num_args = 0..=1, default_missing_value = "true")]
    pub debug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub queries: Vec<String>,
    pub time_range: String,
    pub address: String,
    pub upload_s3: Option<String>,
    pub region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub filename: String,
    pub debug: bool,
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Settings {
    pub fn new(options: &Options) -> Result<Self, Error> {
        let queries = split_queries(&options.query);
        if queries.is_empty() {
            return Err(Error::other("missing --query"));
        }
        if options.time_range.is_empty() {
            return Err(Error::other("missing --time-range"));
        }
        if options.address.is_empty() {
            return Err(Error::other("missing --address"));
        }

        Ok(Self {
            queries,
            time_range: options.time_range.clone(),
            address: options.address.clone(),
            upload_s3: optional(&options.upload_s3),
            region: optional(&options.region),
            s3_endpoint: optional(&options.s3_endpoint),
            filename: options.filename.clone(),
            debug: options.debug == "true",
        })
    }

    /// Everything except credentials, which never pass through here.
    pub fn print_debug(&self) {
        println!("Debug information:");
        println!("Address {}", self.address);
        println!("Time Range {}", self.time_range);
        println!("Upload S3 {}", self.upload_s3.as_deref().unwrap_or(""));
        println!("Region {}", self.region.as_deref().unwrap_or(""));
        if let Some(endpoint) = &self.s3_endpoint {
            println!("S3 Endpoint {}", endpoint);
        }
        println!("Filename {}", self.filename);
        for (index, query) in self.queries.iter().enumerate() {
            println!("Query {}: {}", index + 1, query);
        }
    }
}
