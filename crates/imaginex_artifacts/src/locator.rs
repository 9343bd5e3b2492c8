use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;

use crate::variant::{BuildVariant, CODE_ARCHIVE, DEPENDENCY_ARCHIVE, EXTERNAL_LAYER_ARNS, LAYER_DIR};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    #[error("module directory is not available to resolve artifact paths")]
    MissingModuleDirectory,
    #[error("module directory must be absolute, got '{0}'")]
    RelativeModuleDirectory(PathBuf),
}

/// The secondary artifact of a build. Exactly one form exists per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyArtifact {
    LayerPath(PathBuf),
    DependencyPath(PathBuf),
    LayerArns(Vec<String>),
}

impl DependencyArtifact {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::LayerPath(path) | Self::DependencyPath(path) => Some(path),
            Self::LayerArns(_) => None,
        }
    }

    pub fn layer_arns(&self) -> Option<&[String]> {
        match self {
            Self::LayerArns(arns) => Some(arns),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
}

impl PackageMetadata {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocationSet {
    pub code_path: PathBuf,
    #[serde(flatten)]
    pub dependency: DependencyArtifact,
    pub handler: &'static str,
    #[serde(flatten)]
    pub package: Option<PackageMetadata>,
}

/// Resolves fixed artifact names against a module directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    module_dir: PathBuf,
}

impl ArtifactLocator {
    pub fn new(module_dir: impl Into<PathBuf>) -> Result<Self, LocatorError> {
        let module_dir = module_dir.into();
        if module_dir.as_os_str().is_empty() {
            return Err(LocatorError::MissingModuleDirectory);
        }
        if !module_dir.is_absolute() {
            return Err(LocatorError::RelativeModuleDirectory(module_dir));
        }
        Ok(Self { module_dir })
    }

    fn from_build_env(manifest_dir: Option<&str>) -> Result<Self, LocatorError> {
        manifest_dir
            .ok_or(LocatorError::MissingModuleDirectory)
            .and_then(Self::new)
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    pub fn resolve_code_path(&self) -> PathBuf {
        self.module_dir.join(CODE_ARCHIVE)
    }

    pub fn resolve_dependency_artifact(&self, variant: BuildVariant) -> DependencyArtifact {
        match variant {
            BuildVariant::BundledLayer => DependencyArtifact::LayerPath(self.module_dir.join(LAYER_DIR)),
            BuildVariant::BundledDependencies => {
                DependencyArtifact::DependencyPath(self.module_dir.join(DEPENDENCY_ARCHIVE))
            }
            BuildVariant::ExternalLayers => DependencyArtifact::LayerArns(
                EXTERNAL_LAYER_ARNS.iter().map(|arn| arn.to_string()).collect(),
            ),
        }
    }

    pub fn handler_identifier(&self, variant: BuildVariant) -> &'static str {
        variant.handler()
    }

    pub fn package_metadata(&self, variant: BuildVariant) -> Option<PackageMetadata> {
        variant
            .publishes_package_metadata()
            .then(PackageMetadata::current)
    }

    pub fn location_set(&self, variant: BuildVariant) -> ArtifactLocationSet {
        ArtifactLocationSet {
            code_path: self.resolve_code_path(),
            dependency: self.resolve_dependency_artifact(variant),
            handler: self.handler_identifier(variant),
            package: self.package_metadata(variant),
        }
    }
}

/// Locator rooted at this crate's own directory, resolved once per process.
pub fn installed() -> Result<&'static ArtifactLocator, LocatorError> {
    static INSTALLED: OnceLock<Result<ArtifactLocator, LocatorError>> = OnceLock::new();
    INSTALLED
        .get_or_init(|| ArtifactLocator::from_build_env(option_env!("CARGO_MANIFEST_DIR")))
        .as_ref()
        .map_err(Clone::clone)
}

pub fn installed_location_set(
    variant: BuildVariant,
) -> Result<&'static ArtifactLocationSet, LocatorError> {
    static SETS: [OnceLock<ArtifactLocationSet>; 3] =
        [OnceLock::new(), OnceLock::new(), OnceLock::new()];

    let locator = installed()?;
    Ok(SETS[variant.index()].get_or_init(|| locator.location_set(variant)))
}
