/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::pipeline::query::QueryExecutor;
use crate::pipeline::settings::Settings;
use crate::pipeline::upload::{parse_destination, upload_file, UploadRecord};
use crate::pipeline::BATCH_TIMEOUT;
use crate::pipeline::QUERY_TIMEOUT;
use crate::source::prometheus::{MetricsSource, QueryResult};
use crate::storage::ObjectStore;
use crate::utils::filename::output_file_name;
use crate::utils::timerange::TimeWindow;
use chrono::{DateTime, Local, Utc};
use log::{debug, info};
use std::io::Error;
use std::path::{Path, PathBuf};

pub static CSV_HEADER: [&str; 2] = ["Value", "Timestamp"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub index: usize,
    pub query: String,
    pub path: PathBuf,
    pub rows: usize,
}

pub struct ExportProcessor<'a> {
    pub command: String,
    pub settings: &'a Settings,
    pub window: TimeWindow,
}

/// Three decimals, with Prometheus spelling for the non-finite values.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::from("NaN")
    } else if value == f64::INFINITY {
        String::from("+Inf")
    } else if value == f64::NEG_INFINITY {
        String::from("-Inf")
    } else {
        format!("{:.3}", value)
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d/%m/%y %H:%M:%S")
        .to_string()
}

/// Writes every sample of every series, in backend order. Returns the row count.
pub fn write_csv(path: &Path, result: &QueryResult) -> Result<usize, Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| Error::other(format!("unable to create {}: {}", path.display(), e)))?;

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::other(format!("unable to write header: {}", e)))?;

    let mut rows = 0;
    for series in &result.matrix {
        for sample in &series.samples {
            writer
                .write_record([format_value(sample.value), format_timestamp(&sample.timestamp)])
                .map_err(|e| Error::other(format!("unable to write row: {}", e)))?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

impl<'a> ExportProcessor<'a> {
    pub fn new(command: &str, settings: &'a Settings) -> Result<Self, Error> {
        let window = TimeWindow::ending_now(&settings.time_range)?;
        debug!(
            "{}: window [{} => {}] step {}s",
            command,
            window.start,
            window.end,
            window.step.num_seconds()
        );

        Ok(Self {
            command: command.to_string(),
            settings,
            window,
        })
    }

    /// Queries and writes one file per query; the first failure ends the batch.
    pub fn export(&self, source: &dyn MetricsSource) -> Result<Vec<ExportedFile>, Error> {
        let executor = QueryExecutor::new(source, &self.window, BATCH_TIMEOUT, QUERY_TIMEOUT);
        let mut exported = Vec::with_capacity(self.settings.queries.len());

        for (position, query) in self.settings.queries.iter().enumerate() {
            let index = position + 1;
            let result = executor.execute(query).map_err(|e| {
                Error::other(format!("Error querying Prometheus (Query {}): {}", index, e))
            })?;
            if !result.warnings.is_empty() {
                println!("Warnings (Query {}): {:?}", index, result.warnings);
            }

            let path = PathBuf::from(output_file_name(&self.settings.filename, index));
            let rows = write_csv(&path, &result).map_err(|e| {
                Error::other(format!("Error writing CSV file (Query {}): {}", index, e))
            })?;
            info!(
                "{}: query {} => {} ({} series, {} rows)",
                self.command,
                index,
                path.display(),
                result.matrix.len(),
                rows
            );

            exported.push(ExportedFile {
                index,
                query: query.clone(),
                path,
                rows,
            });
        }

        Ok(exported)
    }

    /// Upload failures are reported per file and never stop the remaining files.
    /// The destination is checked before the store, so a malformed URI is
    /// reported for every file even when no store could be created.
    pub fn upload<S: ObjectStore>(
        &self,
        files: &[ExportedFile],
        destination: &str,
        store: Result<&S, &Error>,
    ) -> Vec<UploadRecord> {
        let mut records = Vec::new();
        for file in files {
            let uploaded = parse_destination(destination).and_then(|destination| match store {
                Ok(store) => upload_file(store, &destination, file, &Local::now()),
                Err(e) => Err(Error::other(format!("Error creating AWS session: {}", e))),
            });
            match uploaded {
                Ok(record) => {
                    println!("Pre-signed URL: {}", record.presigned_url);
                    records.push(record);
                }
                Err(error) => println!("{}", error),
            }
            println!("{}", file.query);
        }
        records
    }

    pub fn report_local(&self, files: &[ExportedFile]) {
        for file in files {
            println!("File saved locally as {}", file.path.display());
        }
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
