use serde::Deserialize;

use crate::error::{FetchError, Result};

/// Maven's packaging if a POM does not declare one
pub const DEFAULT_PACKAGING: &str = "jar";

/// The descriptive parts of a POM file. Only `packaging` is needed for downloading, the rest is
///  there for callers that want to inspect what they got.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub model_version: String,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub packaging: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "licenses::deserialize")]
    pub licenses: Vec<License>,
    #[serde(default, deserialize_with = "dependencies::deserialize")]
    pub dependencies: Vec<Dependency>,
}
impl ProjectDescriptor {
    /// `url` is only used for error reporting
    pub fn parse(url: &str, data: &[u8]) -> Result<ProjectDescriptor> {
        let mut descriptor: ProjectDescriptor = serde_xml_rs::from_reader(data)
            .map_err(|e| FetchError::MalformedDocument { url: url.to_string(), message: e.to_string() })?;

        if descriptor.packaging.trim().is_empty() {
            descriptor.packaging = DEFAULT_PACKAGING.to_string();
        }
        Ok(descriptor)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub distribution: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub optional: bool,
}

// <licenses><license>...</license></licenses> and <dependencies><dependency>...</dependency></dependencies>
//  are wrapped lists; these unwrap them into plain Vecs

mod licenses {
    use serde::{Deserialize, Deserializer};

    use super::License;

    #[derive(Deserialize)]
    struct Licenses {
        #[serde(default)]
        license: Vec<License>,
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<License>, D::Error> {
        Ok(Licenses::deserialize(deserializer)?.license)
    }
}

mod dependencies {
    use serde::{Deserialize, Deserializer};

    use super::Dependency;

    #[derive(Deserialize)]
    struct Dependencies {
        #[serde(default)]
        dependency: Vec<Dependency>,
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Dependency>, D::Error> {
        Ok(Dependencies::deserialize(deserializer)?.dependency)
    }
}
