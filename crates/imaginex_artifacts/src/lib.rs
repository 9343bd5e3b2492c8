//! Locations of the packaged imaginex Lambda artifacts.
//!
//! Deployment tooling links this crate to find the code archive, the
//! dependency layer (bundled or external) and the handler identifier for a
//! build variant. Paths are resolved against this crate's own directory, never
//! against the caller's working directory, and nothing here touches the
//! filesystem: `xtask package` is what places the archives.

pub mod locator;
pub mod variant;

pub use locator::{
    installed, installed_location_set, ArtifactLocationSet, ArtifactLocator, DependencyArtifact,
    LocatorError, PackageMetadata,
};
pub use variant::{BuildVariant, CODE_ARCHIVE, DEPENDENCY_ARCHIVE, EXTERNAL_LAYER_ARNS, LAYER_DIR};
