pub const CODE_ARCHIVE: &str = "code.zip";
pub const LAYER_DIR: &str = "layer";
pub const DEPENDENCY_ARCHIVE: &str = "dependencies.zip";

pub const EXTERNAL_LAYER_ARNS: &[&str] =
    &["arn:aws:lambda:eu-central-1:770693421928:layer:Klayers-p38-requests:8"];

const HYPHENATED_HANDLER: &str = "imaginex-lambda/handler.handler";
// Later packages renamed the module directory; both names stay in use.
const UNDERSCORED_HANDLER: &str = "imaginex_lambda/handler.handler";

/// How a build ships the libraries the handler depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildVariant {
    /// A `layer/` directory next to the code archive.
    BundledLayer,
    /// Pre-existing shared layers referenced by ARN.
    ExternalLayers,
    /// A `dependencies.zip` archive next to the code archive.
    BundledDependencies,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 3] = [
        Self::BundledLayer,
        Self::ExternalLayers,
        Self::BundledDependencies,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BundledLayer => "bundled-layer",
            Self::ExternalLayers => "external-layers",
            Self::BundledDependencies => "bundled-dependencies",
        }
    }

    pub fn handler(self) -> &'static str {
        match self {
            Self::BundledLayer | Self::ExternalLayers => HYPHENATED_HANDLER,
            Self::BundledDependencies => UNDERSCORED_HANDLER,
        }
    }

    pub fn publishes_package_metadata(self) -> bool {
        matches!(self, Self::BundledDependencies)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::BundledLayer => 0,
            Self::ExternalLayers => 1,
            Self::BundledDependencies => 2,
        }
    }
}

impl std::fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_handler_shape(handler: &str) -> bool {
        let Some((module, entry)) = handler.split_once('/') else {
            return false;
        };
        let Some((file, function)) = entry.split_once('.') else {
            return false;
        };
        !module.is_empty() && !file.is_empty() && !function.is_empty()
    }

    #[test]
    fn every_handler_has_module_file_function_shape() {
        for variant in BuildVariant::ALL {
            assert!(
                matches_handler_shape(variant.handler()),
                "{variant}: {}",
                variant.handler()
            );
        }
    }

    #[test]
    fn keeps_hyphen_and_underscore_handlers_apart() {
        assert_eq!(
            BuildVariant::BundledLayer.handler(),
            "imaginex-lambda/handler.handler"
        );
        assert_eq!(
            BuildVariant::BundledDependencies.handler(),
            "imaginex_lambda/handler.handler"
        );
        assert_ne!(
            BuildVariant::BundledLayer.handler(),
            BuildVariant::BundledDependencies.handler()
        );
    }

    #[test]
    fn variant_indices_are_distinct() {
        let mut indices: Vec<usize> = BuildVariant::ALL.iter().map(|v| v.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), BuildVariant::ALL.len());
    }

    #[test]
    fn displays_cli_style_names() {
        let names: Vec<String> = BuildVariant::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["bundled-layer", "external-layers", "bundled-dependencies"]
        );
    }
}
