use std::path::{Path, PathBuf};

use tokio::fs::{remove_file, File};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{FetchError, Result};
use crate::maven::coordinates::RepositoryCoordinate;
use crate::maven::remote_repo::RemoteMavenRepo;
use crate::util::http_client::{ClientOptions, RepoHttpClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub bytes_written: u64,
    /// `<artifactId>-<version>.<extension>`
    pub file_name: String,
    pub path: PathBuf,
}

/// Downloads a specific or the latest version of an artifact into a local directory.
///
/// Version metadata and POM are resolved first, and the artifact's file extension is taken from
///  the POM's packaging unless the caller overrides it. A file that fails to download completely
///  or fails checksum validation is removed again.
pub struct MavenDownloader {
    repo: RemoteMavenRepo,
}
impl MavenDownloader {
    pub fn new(options: &ClientOptions) -> Result<MavenDownloader> {
        Ok(MavenDownloader::from_client(RepoHttpClient::new(options)?))
    }

    pub fn from_client(client: RepoHttpClient) -> MavenDownloader {
        MavenDownloader {
            repo: RemoteMavenRepo::new(client),
        }
    }

    /// Aborts all network operations of this downloader with [FetchError::Cancelled] once
    ///  `cancel` is triggered
    pub fn with_cancellation(self, cancel: CancellationToken) -> MavenDownloader {
        MavenDownloader::from_client(self.repo.client().clone().with_cancellation(cancel))
    }

    pub fn repo(&self) -> &RemoteMavenRepo {
        &self.repo
    }

    pub async fn fetch_latest(
        &self,
        coordinate: &RepositoryCoordinate,
        extension_override: Option<&str>,
        output_dir: &Path,
    ) -> Result<FetchResult> {
        let metadata = self.repo.get_metadata(coordinate).await?;
        let version = metadata.latest_version()
            .ok_or_else(|| FetchError::VersionNotFound {
                group_id: coordinate.group_id.0.clone(),
                artifact_id: coordinate.artifact_id.0.clone(),
                version: "latest".to_string(),
            })?;
        debug!(%coordinate, version, "latest version");

        self.save(coordinate, version, extension_override, output_dir).await
    }

    pub async fn fetch_version(
        &self,
        coordinate: &RepositoryCoordinate,
        version: &str,
        extension_override: Option<&str>,
        output_dir: &Path,
    ) -> Result<FetchResult> {
        let metadata = self.repo.get_metadata(coordinate).await?;
        if !metadata.contains_version(version) {
            debug!(%coordinate, version, available = ?metadata.versions, "version is not listed in metadata");
            return Err(FetchError::VersionNotFound {
                group_id: coordinate.group_id.0.clone(),
                artifact_id: coordinate.artifact_id.0.clone(),
                version: version.to_string(),
            });
        }

        self.save(coordinate, version, extension_override, output_dir).await
    }

    async fn save(
        &self,
        coordinate: &RepositoryCoordinate,
        version: &str,
        extension_override: Option<&str>,
        output_dir: &Path,
    ) -> Result<FetchResult> {
        let descriptor = self.repo.get_descriptor(coordinate, version).await?;

        let extension = match extension_override {
            Some(ext) if !ext.is_empty() => ext,
            _ => descriptor.packaging.as_str(),
        };
        let file_name = coordinate.artifact_file_name(version, extension);
        let url = coordinate.artifact_url(version, &file_name);
        let path = output_dir.join(&file_name);

        let mut file = File::create(&path).await
            .map_err(|source| FetchError::SinkCreation { path: path.clone(), source })?;

        match self.repo.get_artifact(&url, &mut file).await {
            Ok(bytes_written) => {
                info!("downloaded {} ({} bytes) to {}", url, bytes_written, path.display());
                Ok(FetchResult {
                    bytes_written,
                    file_name,
                    path,
                })
            }
            Err(e) => {
                drop(file);
                if let Err(cleanup_error) = remove_file(&path).await {
                    error!("error removing {} after failed download: {}", path.display(), cleanup_error);
                }
                Err(e)
            }
        }
    }
}
