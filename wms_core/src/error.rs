use thiserror::Error;

/// A failure of a whole scrape. Propagated to callers of the location service.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch council page {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("council page {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("council page {url} could not be parsed: {reason}")]
    Parse { url: String, reason: String },
}

/// A failure to geocode a single postcode.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {status} for {postcode}")]
    UnexpectedStatus { postcode: String, status: u16 },

    #[error("geocoder response for {postcode} could not be decoded: {source}")]
    Decode {
        postcode: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no geocode results for postcode {0}")]
    NoResults(String),

    #[error("geocoder returned an invalid coordinate \"{value}\" for {postcode}")]
    InvalidCoordinate { postcode: String, value: String },
}

/// A cache backend is unavailable. Always treated as a miss by the location service.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cache returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to serialize cache value: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to decode cache value: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Malformed input at the HTTP boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid postcode format: {0}")]
    InvalidPostcode(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}
