use thiserror::Error;

/// A record whose date cannot be interpreted. Fatal to the whole computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid record at index {index}: unparsable date {value:?}")]
pub struct InvalidRecordError {
    pub index: usize,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Upstream API returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {origin}: {message}")]
    Decode { origin: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
