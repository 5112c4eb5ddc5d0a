use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{FetchError, Result};

/// `lastUpdated` is a UTC timestamp without separators, e.g. "20140318154402"
pub const LAST_UPDATED_FORMAT: &str = "%Y%m%d%H%M%S";

lazy_static! {
    // chrono alone accepts single-digit fields, so "2014031815440" would parse
    static ref LAST_UPDATED_REGEX: Regex = Regex::new(r"^[0-9]{14}$").unwrap();
}

/// The parts of an artifact-level maven-metadata.xml file (see
///  https://maven.apache.org/ref/3.9.5/maven-repository-metadata/repository-metadata.html) that
///  are needed for resolving versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMetadata {
    pub model_version: String,
    pub group_id: String,
    pub artifact_id: String,
    pub latest: String,
    pub release: String,
    /// all versions that can be downloaded, in the order listed by the repository
    pub versions: Vec<String>,
    pub last_updated: Option<NaiveDateTime>,
}
impl VersionMetadata {
    /// `url` is only used for error reporting
    pub fn parse(url: &str, data: &[u8]) -> Result<VersionMetadata> {
        let raw: MetadataXml = serde_xml_rs::from_reader(data)
            .map_err(|e| FetchError::MalformedDocument { url: url.to_string(), message: e.to_string() })?;

        let last_updated = parse_last_updated(&raw.versioning.last_updated)
            .map_err(|message| FetchError::MalformedDocument { url: url.to_string(), message })?;

        Ok(VersionMetadata {
            model_version: raw.model_version,
            group_id: raw.group_id,
            artifact_id: raw.artifact_id,
            latest: raw.versioning.latest,
            release: raw.versioning.release,
            versions: raw.versioning.versions.version,
            last_updated,
        })
    }

    pub fn contains_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// `latest` if the repository provides it. Some repositories omit it, in which case the
    ///  release version or the last listed version are used.
    pub fn latest_version(&self) -> Option<&str> {
        [self.latest.as_str(), self.release.as_str()].into_iter()
            .find(|v| !v.is_empty())
            .or_else(|| self.versions.last().map(String::as_str))
    }
}

/// An empty string means there is no timestamp
pub fn parse_last_updated(s: &str) -> std::result::Result<Option<NaiveDateTime>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if !LAST_UPDATED_REGEX.is_match(s) {
        return Err(format!("lastUpdated {:?} is not of the form YYYYMMDDhhmmss", s));
    }
    NaiveDateTime::parse_from_str(s, LAST_UPDATED_FORMAT)
        .map(Some)
        .map_err(|e| format!("invalid lastUpdated {:?}: {}", s, e))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataXml {
    #[serde(default)]
    model_version: String, // attribute
    #[serde(default)]
    group_id: String,
    #[serde(default)]
    artifact_id: String,
    #[serde(default)]
    versioning: VersioningXml,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VersioningXml {
    #[serde(default)]
    latest: String,
    #[serde(default)]
    release: String,
    #[serde(default)]
    versions: VersionsXml,
    #[serde(default)]
    last_updated: String,
}

#[derive(Deserialize, Default)]
struct VersionsXml {
    #[serde(default)]
    version: Vec<String>,
}
