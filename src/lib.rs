//! Downloads artifacts from Maven repositories, verifying the published SHA1 checksum of
//!  everything that is fetched along the way (maven-metadata.xml, POM and the artifact itself).
//!
//! ```no_run
//! # async fn download() -> maven_fetch::Result<()> {
//! use std::path::Path;
//! use maven_fetch::{ClientOptions, MavenDownloader, RepositoryCoordinate};
//!
//! let downloader = MavenDownloader::new(&ClientOptions::default())?;
//! let coordinate = RepositoryCoordinate::new("https://repo1.maven.org/maven2", "log4j", "log4j");
//! let result = downloader.fetch_latest(&coordinate, None, Path::new(".")).await?;
//! println!("{} bytes written to {}", result.bytes_written, result.path.display());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod maven;
pub mod util;

pub use error::{FetchError, Result};
pub use maven::{FetchResult, MavenDownloader, RemoteMavenRepo, RepositoryCoordinate};
pub use util::checksum::{fetch_digest, sha1_hex, verify_bytes};
pub use util::http_client::{ClientOptions, RepoHttpClient};
