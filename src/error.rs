use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while resolving and fetching an artifact.
///
/// Network-related variants carry the URL of the failing request, which also identifies the
///  stage (metadata, descriptor, artifact, or one of their `.sha1` companions).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("error fetching {url}: {message}")]
    Transport {
        url: String,
        message: String,
    },

    #[error("unexpected HTTP status {status} fetching {url}")]
    UnexpectedStatus {
        url: String,
        status: u16,
    },

    #[error("checksum of {url} does not match - expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("{url} does not contain a SHA1 digest: {content:?}")]
    MalformedDigest {
        url: String,
        content: String,
    },

    #[error("error decoding {url}: {message}")]
    MalformedDocument {
        url: String,
        message: String,
    },

    #[error("version {version} of {group_id}:{artifact_id} is not available")]
    VersionNotFound {
        group_id: String,
        artifact_id: String,
        version: String,
    },

    #[error("cannot create output file {}: {source}", .path.display())]
    SinkCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing download of {url}: {source}")]
    SinkWrite {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid URL: {url:?}")]
    InvalidUrl {
        url: String,
    },

    #[error("cannot use trust anchor {}: {message}", .path.display())]
    TrustAnchor {
        path: PathBuf,
        message: String,
    },

    #[error("cannot set up TLS: {0}")]
    Tls(String),

    #[error("fetching {url} was cancelled")]
    Cancelled {
        url: String,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
