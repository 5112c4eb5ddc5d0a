use std::fmt::{Display, Formatter};

pub const MAVEN_METADATA_FILE: &str = "maven-metadata.xml";

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenArtifactId(pub String);

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenGroupId(pub String);
impl MavenGroupId {
    /// The group's directory inside a repository, e.g. "org/apache/commons" for
    ///  "org.apache.commons". Group ids already given as a path are left unchanged.
    pub fn as_path(&self) -> String {
        self.0.replace('.', "/")
    }
}

/// Identifies an artifact family (all versions of a group id / artifact id pair) inside a
///  specific remote repository. All URLs for the artifact are derived from this.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RepositoryCoordinate {
    repo_root: String, // without trailing '/'
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
}
impl RepositoryCoordinate {
    /// Trailing '/' characters of `repo_root` are dropped.
    ///
    /// The group id is not concatenated verbatim: a dotted id like "org.apache.logging" is
    ///  mapped to the directory "org/apache/logging" the way Maven repositories lay them out.
    ///  Ids without dots (e.g. "log4j", or one already given as a path) come out unchanged.
    pub fn new(repo_root: &str, group_id: &str, artifact_id: &str) -> RepositoryCoordinate {
        RepositoryCoordinate {
            repo_root: repo_root.trim_end_matches('/').to_string(),
            group_id: MavenGroupId(group_id.to_string()),
            artifact_id: MavenArtifactId(artifact_id.to_string()),
        }
    }

    fn artifact_base_url(&self) -> String {
        format!("{}/{}/{}", self.repo_root, self.group_id.as_path(), self.artifact_id.0)
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/{}", self.artifact_base_url(), MAVEN_METADATA_FILE)
    }

    pub fn descriptor_url(&self, version: &str) -> String {
        self.artifact_url(version, &self.artifact_file_name(version, "pom"))
    }

    /// `<artifactId>-<version>.<extension>`
    pub fn artifact_file_name(&self, version: &str, extension: &str) -> String {
        format!("{}-{}.{}", self.artifact_id.0, version, extension)
    }

    pub fn artifact_url(&self, version: &str, file_name: &str) -> String {
        format!("{}/{}/{}", self.artifact_base_url(), version, file_name)
    }
}
impl Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id.0, self.artifact_id.0)
    }
}
