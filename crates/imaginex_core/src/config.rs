pub const S3_BUCKET_NAME_VAR: &str = "S3_BUCKET_NAME";
pub const DOWNLOAD_CHUNK_SIZE_VAR: &str = "DOWNLOAD_CHUNK_SIZE";
pub const DEFAULT_DOWNLOAD_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("DOWNLOAD_CHUNK_SIZE must be a positive integer, got '{0}'")]
    InvalidChunkSize(String),
}

/// Runtime settings of the optimizer, sourced from the Lambda environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub s3_bucket_name: Option<String>,
    pub download_chunk_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            s3_bucket_name: None,
            download_chunk_size: DEFAULT_DOWNLOAD_CHUNK_SIZE,
        }
    }
}

impl OptimizerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let s3_bucket_name = lookup(S3_BUCKET_NAME_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let download_chunk_size = match lookup(DOWNLOAD_CHUNK_SIZE_VAR) {
            None => DEFAULT_DOWNLOAD_CHUNK_SIZE,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidChunkSize(raw)),
            },
        };

        Ok(Self {
            s3_bucket_name,
            download_chunk_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = OptimizerConfig::from_lookup(lookup_from(&[])).expect("config should load");
        assert_eq!(config, OptimizerConfig::default());
        assert_eq!(config.download_chunk_size, 1024);
    }

    #[test]
    fn reads_bucket_and_chunk_size() {
        let config = OptimizerConfig::from_lookup(lookup_from(&[
            ("S3_BUCKET_NAME", "images-bucket"),
            ("DOWNLOAD_CHUNK_SIZE", "4096"),
        ]))
        .expect("config should load");

        assert_eq!(config.s3_bucket_name.as_deref(), Some("images-bucket"));
        assert_eq!(config.download_chunk_size, 4096);
    }

    #[test]
    fn blank_bucket_counts_as_unset() {
        let config = OptimizerConfig::from_lookup(lookup_from(&[("S3_BUCKET_NAME", "  ")]))
            .expect("config should load");
        assert!(config.s3_bucket_name.is_none());
    }

    #[test]
    fn rejects_zero_or_garbage_chunk_size() {
        for raw in ["0", "-1", "big"] {
            let error = OptimizerConfig::from_lookup(lookup_from(&[("DOWNLOAD_CHUNK_SIZE", raw)]))
                .expect_err("invalid chunk size should fail");
            assert_eq!(error, ConfigError::InvalidChunkSize(raw.to_string()));
        }
    }
}
