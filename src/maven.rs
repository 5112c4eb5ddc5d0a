pub mod coordinates;
pub mod download;
pub mod metadata_xml;
pub mod pom_xml;
pub mod remote_repo;

pub use coordinates::RepositoryCoordinate;
pub use download::{FetchResult, MavenDownloader};
pub use metadata_xml::VersionMetadata;
pub use pom_xml::{Dependency, License, ProjectDescriptor};
pub use remote_repo::RemoteMavenRepo;
