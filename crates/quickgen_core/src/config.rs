//! Generation configuration.
//!
//! [`GenConfig`] holds the knobs the outer test runner hands to the
//! generation layer: the maximum size, an optional fixed seed and the
//! number of samples to draw. It can be built programmatically, read from
//! environment variables or loaded from a TOML file.
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QUICKGEN_MAX_SIZE` | `max_size` |
//! | `QUICKGEN_SEED` | `seed` |
//! | `QUICKGEN_SAMPLE_COUNT` | `sample_count` |

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::gen::Size;
use crate::seed::Seed;

/// Largest accepted `max_size`.
pub const MAX_SIZE_LIMIT: Size = 100_000;

/// Default `max_size`.
pub const DEFAULT_MAX_SIZE: Size = 100;

/// Default number of samples drawn by an evaluator.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Environment variable overriding `max_size`.
pub const ENV_MAX_SIZE: &str = "QUICKGEN_MAX_SIZE";
/// Environment variable fixing the seed.
pub const ENV_SEED: &str = "QUICKGEN_SEED";
/// Environment variable overriding `sample_count`.
pub const ENV_SAMPLE_COUNT: &str = "QUICKGEN_SAMPLE_COUNT";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `max_size` above [`MAX_SIZE_LIMIT`].
    #[error("Invalid max size {0}: must be in range [0, 100_000]")]
    InvalidMaxSize(Size),

    /// `sample_count` of zero.
    #[error("Invalid sample count {0}: must be at least 1")]
    InvalidSampleCount(usize),

    /// An environment variable could not be parsed.
    #[error("Environment variable {var} has unparsable value '{value}'")]
    EnvError {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Generation configuration.
///
/// # Examples
///
/// ```rust
/// use quickgen_core::GenConfig;
///
/// let config = GenConfig::builder()
///     .max_size(30)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.max_size(), 30);
/// assert_eq!(config.seed(), Some(42));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    max_size: Size,
    seed: Option<u64>,
    sample_count: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            seed: None,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

impl GenConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> GenConfigBuilder {
        GenConfigBuilder::default()
    }

    /// Returns the maximum size handed to generators.
    #[inline]
    pub fn max_size(&self) -> Size {
        self.max_size
    }

    /// Returns the fixed seed, if any.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the number of samples an evaluator draws.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Returns the configured seed, or a fresh one from entropy.
    pub fn initial_seed(&self) -> Seed {
        match self.seed {
            Some(state) => Seed::from_u64(state),
            None => Seed::from_entropy(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `max_size` is greater than 100,000
    /// - `sample_count` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size > MAX_SIZE_LIMIT {
            return Err(ConfigError::InvalidMaxSize(self.max_size));
        }
        if self.sample_count == 0 {
            return Err(ConfigError::InvalidSampleCount(self.sample_count));
        }
        Ok(())
    }

    /// Loads configuration from `QUICKGEN_*` environment variables,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through a variable lookup function.
    ///
    /// [`GenConfig::from_env`] uses the process environment; tests pass a
    /// closure over a map instead.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MAX_SIZE) {
            config.max_size = parse_var(ENV_MAX_SIZE, value)?;
        }
        if let Some(value) = lookup(ENV_SEED) {
            config.seed = Some(parse_var(ENV_SEED, value)?);
        }
        if let Some(value) = lookup(ENV_SAMPLE_COUNT) {
            config.sample_count = parse_var(ENV_SAMPLE_COUNT, value)?;
        }

        config.validate()?;
        tracing::info!(
            max_size = config.max_size,
            seed = ?config.seed,
            sample_count = config.sample_count,
            "Loaded generation config from environment"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_core::GenConfig;
    ///
    /// let config = GenConfig::from_toml_str("max_size = 12\nseed = 7").unwrap();
    /// assert_eq!(config.max_size(), 12);
    /// assert_eq!(config.sample_count(), 100);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GenConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded generation config from file");
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError { var, value })
}

/// Builder for [`GenConfig`] with validation at build time.
#[derive(Clone, Debug, Default)]
pub struct GenConfigBuilder {
    max_size: Option<Size>,
    seed: Option<u64>,
    sample_count: Option<usize>,
}

impl GenConfigBuilder {
    /// Sets the maximum size.
    #[inline]
    pub fn max_size(mut self, max_size: Size) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Fixes the seed for reproducible generation.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the number of samples to draw.
    #[inline]
    pub fn sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = Some(sample_count);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<GenConfig, ConfigError> {
        let config = GenConfig {
            max_size: self.max_size.unwrap_or(DEFAULT_MAX_SIZE),
            seed: self.seed,
            sample_count: self.sample_count.unwrap_or(DEFAULT_SAMPLE_COUNT),
        };
        config.validate()?;
        Ok(config)
    }
}
