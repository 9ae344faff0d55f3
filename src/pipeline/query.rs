/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::source::prometheus::{MetricsSource, QueryResult};
use crate::utils::timerange::TimeWindow;
use log::debug;
use std::io::Error;
use std::time::{Duration, Instant};

/// Runs range queries one at a time under a shared batch deadline.
pub struct QueryExecutor<'a> {
    source: &'a dyn MetricsSource,
    window: &'a TimeWindow,
    deadline: Instant,
    call_timeout: Duration,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(
        source: &'a dyn MetricsSource,
        window: &'a TimeWindow,
        batch_timeout: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            source,
            window,
            deadline: Instant::now() + batch_timeout,
            call_timeout,
        }
    }

    /// Time left for a single call: the per-call limit, capped by the batch deadline.
    pub fn next_timeout(&self) -> Option<Duration> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            None
        } else {
            Some(remaining.min(self.call_timeout))
        }
    }

    pub fn execute(&self, query: &str) -> Result<QueryResult, Error> {
        let timeout = self
            .next_timeout()
            .ok_or_else(|| Error::other("query batch deadline exceeded"))?;
        debug!("query [{}] timeout {:?}", query, timeout);
        self.source.query_range(query, self.window, timeout)
    }
}
