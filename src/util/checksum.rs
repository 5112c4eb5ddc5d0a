//! SHA1 checksums as published by Maven repositories: every resource `R` has a companion file
//!  `R.sha1` containing the hex encoded digest of `R`.

use sha1::{Digest, Sha1};
use tracing::trace;

use crate::error::{FetchError, Result};
use crate::util::http_client::RepoHttpClient;

pub const SHA1_SUFFIX: &str = ".sha1";

/// Fetches the published SHA1 digest for `resource_url`, returned as lowercase hex.
///
/// Some repositories append the file name after the digest (`<digest>  <file name>`), so only
///  the first token is used. Anything that is not a 40 digit hex string is rejected.
pub async fn fetch_digest(client: &RepoHttpClient, resource_url: &str) -> Result<String> {
    Ok(hex::encode(fetch_sha1(client, resource_url).await?))
}

/// Same as [fetch_digest], but returning the raw digest bytes
pub async fn fetch_sha1(client: &RepoHttpClient, resource_url: &str) -> Result<[u8; 20]> {
    let digest_url = format!("{}{}", resource_url, SHA1_SUFFIX);
    let body = client.get_bytes(&digest_url).await?;

    let text = String::from_utf8_lossy(&body);
    let digest = parse_digest(&text)
        .ok_or_else(|| FetchError::MalformedDigest {
            url: digest_url.clone(),
            content: text.trim().to_string(),
        })?;

    trace!("published SHA1 of {} is {}", resource_url, hex::encode(digest));
    Ok(digest)
}

fn parse_digest(text: &str) -> Option<[u8; 20]> {
    let token = text.split_whitespace().next()?;
    <[u8; 20] as hex::FromHex>::from_hex(token).ok()
}

pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Checks `data` against a hex encoded SHA1 digest. Upper and lower case hex digits are both
///  accepted.
pub fn verify_bytes(data: &[u8], expected_digest_hex: &str) -> bool {
    sha1_hex(data).eq_ignore_ascii_case(expected_digest_hex)
}

/// Fails with [FetchError::ChecksumMismatch] unless `data` has the SHA1 digest `expected`
pub fn ensure_digest(url: &str, data: &[u8], expected: &str) -> Result<()> {
    if verify_bytes(data, expected) {
        Ok(())
    }
    else {
        Err(FetchError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual: sha1_hex(data),
        })
    }
}
