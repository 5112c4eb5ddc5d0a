use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::error::{FetchError, Result};
use crate::maven::coordinates::RepositoryCoordinate;
use crate::maven::metadata_xml::VersionMetadata;
use crate::maven::pom_xml::ProjectDescriptor;
use crate::util::checksum::{ensure_digest, fetch_digest, fetch_sha1};
use crate::util::http_client::RepoHttpClient;
use crate::util::validating_http_body::{Sha1HttpBodyValidator, ValidatingHttpBody};

/// Read access to a remote Maven repository. Everything that is downloaded is checked against
///  the SHA1 checksum the repository publishes next to it.
#[derive(Clone)]
pub struct RemoteMavenRepo {
    client: RepoHttpClient,
}
impl RemoteMavenRepo {
    pub fn new(client: RepoHttpClient) -> RemoteMavenRepo {
        RemoteMavenRepo { client }
    }

    pub fn client(&self) -> &RepoHttpClient {
        &self.client
    }

    /// Fetches and parses the artifact's maven-metadata.xml
    pub async fn get_metadata(&self, coordinate: &RepositoryCoordinate) -> Result<VersionMetadata> {
        let url = coordinate.metadata_url();
        debug!(%coordinate, "resolving versions from {}", url);

        let data = self.get_verified(&url).await?;
        VersionMetadata::parse(&url, &data)
    }

    /// Fetches and parses the POM of a specific version
    pub async fn get_descriptor(&self, coordinate: &RepositoryCoordinate, version: &str) -> Result<ProjectDescriptor> {
        let url = coordinate.descriptor_url(version);
        debug!(%coordinate, version, "resolving project descriptor from {}", url);

        let data = self.get_verified(&url).await?;
        ProjectDescriptor::parse(&url, &data)
    }

    /// Streams the resource at `url` into `sink`, returning the number of bytes written.
    ///
    /// The checksum is computed while the data is written, so a mismatch is only detected after
    ///  all data went to `sink`. Discarding the written data is the caller's responsibility.
    pub async fn get_artifact<W: AsyncWrite + Unpin>(&self, url: &str, sink: &mut W) -> Result<u64> {
        debug!("downloading {}", url);

        let (response, expected_sha1) = tokio::try_join!(
            self.client.get(url),
            fetch_sha1(&self.client, url),
        )?;

        let mut body = ValidatingHttpBody::new(url, response.into_body(), Sha1HttpBodyValidator::new(expected_sha1));

        let mut bytes_written: u64 = 0;
        loop {
            // each chunk gets the full request timeout, so a stalled transfer fails instead of hanging
            match self.client.bounded(url, async { body.next().await.transpose() }).await? {
                Some(chunk) => {
                    sink.write_all(&chunk).await
                        .map_err(|source| FetchError::SinkWrite { url: url.to_string(), source })?;
                    bytes_written += chunk.len() as u64;
                }
                None => break,
            }
        }
        sink.flush().await
            .map_err(|source| FetchError::SinkWrite { url: url.to_string(), source })?;

        trace!("{} bytes from {} passed SHA1 validation", bytes_written, url);
        Ok(bytes_written)
    }

    /// GETs a document and its published SHA1, returning the document if they match
    async fn get_verified(&self, url: &str) -> Result<Bytes> {
        let data = self.client.get_bytes(url).await?;
        let expected_sha1 = fetch_digest(&self.client, url).await?;
        ensure_digest(url, &data, &expected_sha1)?;
        Ok(data)
    }
}
