use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to initialise HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to download {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download of {url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("no archive member ends with {suffix}")]
    MissingArtifact { suffix: String },
    #[error("failed to read archive: {0}")]
    CorruptArchive(std::io::Error),
    #[error("{} archive members end with {suffix}: {}", .matches.len(), .matches.join(", "))]
    AmbiguousArtifact {
        suffix: String,
        matches: Vec<String>,
    },

    #[error("malformed transfer syntax data: {0}")]
    DataFormat(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(String),

    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConformanceError {
    /// True for every failure that means the expected header could not be obtained
    /// from the downloaded archive.
    pub fn is_missing_artifact(&self) -> bool {
        matches!(
            self,
            Self::MissingArtifact { .. } | Self::CorruptArchive(_) | Self::AmbiguousArtifact { .. }
        )
    }

    /// True for transport failures and non-success HTTP responses.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::HttpClient(_) | Self::Network { .. } | Self::HttpStatus { .. }
        )
    }
}

pub type ConformanceResult<T> = std::result::Result<T, ConformanceError>;
