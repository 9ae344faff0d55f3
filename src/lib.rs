/*!
 *  Galileo Network Analytics (GNA) Toolkit
 *
 *  Copyright 2024 Fidelis Farm & Technologies, LLC
 *  All Rights Reserved.
 *  See license information in LICENSE.
 */

pub mod utils {
    pub mod filename;
    pub mod timerange;
}

pub mod source {
    pub mod prometheus;
}

pub mod storage {
    use std::io::Error;
    use std::path::Path;
    use std::time::Duration;

    pub mod s3;

    /// Presigned links for the "latest" object stay valid for one week.
    pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    pub trait ObjectStore {
        fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), Error>;
        fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration)
            -> Result<String, Error>;
    }
}

pub mod pipeline {
    use dotenv::dotenv;
    use std::env::VarError;
    use std::time::Duration;

    pub mod export;
    pub mod query;
    pub mod settings;
    pub mod upload;

    /// Upper bound for a single range query.
    pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
    /// Upper bound for the whole batch of range queries.
    pub const BATCH_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn load_environment() -> Result<(), VarError> {
        dotenv().ok();
        Ok(())
    }

    pub fn split_queries(query_string: &str) -> Vec<String> {
        query_string
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

}
