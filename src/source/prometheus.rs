/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::utils::timerange::TimeWindow;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Error;
use std::time::Duration;
use url::Url;

const QUERY_RANGE_PATH: &str = "api/v1/query_range";

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub labels: BTreeMap<String, String>,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub matrix: Vec<Series>,
    pub warnings: Vec<String>,
}

impl QueryResult {
    pub fn sample_count(&self) -> usize {
        self.matrix.iter().map(|series| series.samples.len()).sum()
    }
}

pub trait MetricsSource {
    fn query_range(
        &self,
        query: &str,
        window: &TimeWindow,
        timeout: Duration,
    ) -> Result<QueryResult, Error>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<ApiData>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MatrixSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

/// Prometheus encodes sample values as strings, including the special floats.
pub fn parse_sample_value(value: &str) -> Result<f64, Error> {
    match value {
        "NaN" => Ok(f64::NAN),
        "+Inf" | "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        _ => value
            .parse::<f64>()
            .map_err(|e| Error::other(format!("invalid sample value {:?}: {}", value, e))),
    }
}

fn parse_sample_time(seconds: f64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
        .ok_or_else(|| Error::other(format!("invalid sample timestamp {}", seconds)))
}

/// Decodes a `query_range` response body into a matrix.
pub fn decode_response(body: &str) -> Result<QueryResult, Error> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| Error::other(format!("unable to decode response: {}", e)))?;

    if response.status != "success" {
        return Err(Error::other(format!(
            "{}: {}",
            response.error_type.unwrap_or_else(|| String::from("error")),
            response.error.unwrap_or_else(|| String::from("unknown error"))
        )));
    }

    let data = response
        .data
        .ok_or_else(|| Error::other("response is missing data"))?;
    if data.result_type != "matrix" {
        return Err(Error::other(format!(
            "unexpected result type {}, expected matrix",
            data.result_type
        )));
    }

    let raw_matrix: Vec<MatrixSeries> = serde_json::from_value(data.result)
        .map_err(|e| Error::other(format!("unable to decode matrix: {}", e)))?;

    let mut matrix = Vec::with_capacity(raw_matrix.len());
    for raw in raw_matrix {
        let mut samples = Vec::with_capacity(raw.values.len());
        for (seconds, value) in &raw.values {
            samples.push(Sample {
                timestamp: parse_sample_time(*seconds)?,
                value: parse_sample_value(value)?,
            });
        }
        matrix.push(Series {
            labels: raw.metric,
            samples,
        });
    }

    Ok(QueryResult {
        matrix,
        warnings: response.warnings,
    })
}

pub struct PrometheusClient {
    endpoint: Url,
    http: reqwest::blocking::Client,
}

impl PrometheusClient {
    pub fn new(address: &str) -> Result<Self, Error> {
        let endpoint = query_range_endpoint(address)?;
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::other(format!("unable to build http client: {}", e)))?;

        Ok(Self { endpoint, http })
    }

    pub fn with_http(address: &str, http: reqwest::blocking::Client) -> Result<Self, Error> {
        Ok(Self {
            endpoint: query_range_endpoint(address)?,
            http,
        })
    }
}

/// Resolves `<address>/api/v1/query_range`, keeping any path prefix on the address.
pub fn query_range_endpoint(address: &str) -> Result<Url, Error> {
    let mut base = Url::parse(address)
        .map_err(|e| Error::other(format!("invalid address {}: {}", address, e)))?;
    if base.cannot_be_a_base() {
        return Err(Error::other(format!("invalid address {}", address)));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(QUERY_RANGE_PATH)
        .map_err(|e| Error::other(format!("invalid address {}: {}", address, e)))
}

/// Prometheus duration for the `timeout` parameter: whole seconds when exact.
fn timeout_param(timeout: Duration) -> String {
    if timeout.subsec_millis() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

impl MetricsSource for PrometheusClient {
    fn query_range(
        &self,
        query: &str,
        window: &TimeWindow,
        timeout: Duration,
    ) -> Result<QueryResult, Error> {
        let start = window.start.to_rfc3339();
        let end = window.end.to_rfc3339();
        let step = format!("{}s", window.step.num_seconds());
        let timeout_param = timeout_param(timeout);

        debug!(
            "query_range {} query={} start={} end={} step={}",
            self.endpoint, query, start, end, step
        );

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("query", query),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("step", step.as_str()),
                ("timeout", timeout_param.as_str()),
            ])
            .timeout(timeout)
            .send()
            .map_err(|e| Error::other(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::other(format!("unable to read response: {}", e)))?;
        debug!("query_range status={} bytes={}", status, body.len());

        match decode_response(&body) {
            Ok(result) if status.is_success() => Ok(result),
            Ok(_) => Err(Error::other(format!("server returned {}", status))),
            Err(e) if !status.is_success() => {
                Err(Error::other(format!("server returned {}: {}", status, e)))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "prometheus_test.rs"]
mod tests;
