use chrono::DateTime;
use chrono::TimeZone;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;

lazy_static! {
    static ref SPECIAL_RUN: Regex = Regex::new("[^a-zA-Z0-9]+").unwrap();
}

/// Local output file for the query at `index` (1-based).
pub fn output_file_name(stem: &str, index: usize) -> String {
    format!("{}_{}.csv", stem, index)
}

/// Collapses every run of non-alphanumeric characters into a single `_`.
pub fn sanitize_name(query: &str) -> String {
    SPECIAL_RUN.replace_all(query, "_").into_owned()
}

pub fn dated_object_key<Tz>(prefix: &str, now: &DateTime<Tz>, name: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}/{}-{}.csv", prefix, now.format("%d-%m-%Y-%H-%M"), name)
}

pub fn latest_object_key(prefix: &str, name: &str) -> String {
    format!("{}/latest-{}.csv", prefix, name)
}
