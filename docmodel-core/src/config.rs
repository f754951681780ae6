//! Runtime configuration consulted by the type coercion layer.
//!
//! The configuration controls how stored instants are presented when they are
//! demongoized (UTC or a configured zone), which zone naive time strings are
//! interpreted in, and which locale localized fields read and write.
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::config::Config;
//! use chrono::FixedOffset;
//!
//! let config = Config::builder()
//!     .time_zone(FixedOffset::west_opt(5 * 3600).unwrap())
//!     .locale("de")
//!     .fallbacks("de", ["en"])
//!     .build()?;
//! ```

use std::collections::BTreeMap;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

const MAX_OFFSET_SECONDS: i32 = 86_399;

/// Coercion settings shared by every field of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Present demongoized times in UTC instead of the configured zone.
    pub use_utc: bool,
    /// Configured zone as seconds east of UTC.
    pub time_zone_offset: i32,
    /// Locale used by localized fields.
    pub locale: String,
    /// Ordered fallback locales, keyed by locale.
    pub fallbacks: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            use_utc: false,
            time_zone_offset: 0,
            locale: "en".to_string(),
            fallbacks: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Creates a builder for constructing a `Config` with custom options.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses and validates a configuration from JSON.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the JSON is malformed or the values are out of range.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The zone that naive times are read in and stored times are presented in.
    ///
    /// This is UTC when `use_utc` is set.
    pub fn time_zone(&self) -> FixedOffset {
        if self.use_utc {
            return Utc.fix();
        }
        FixedOffset::east_opt(self.time_zone_offset).unwrap_or_else(|| Utc.fix())
    }

    /// Returns the fallback chain for `locale`, not including the locale itself.
    pub fn fallbacks_for(&self, locale: &str) -> &[String] {
        self.fallbacks
            .get(locale)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn validate(&self) -> ModelResult<()> {
        if self.time_zone_offset.abs() > MAX_OFFSET_SECONDS {
            return Err(ModelError::InvalidConfig(format!(
                "time zone offset {} is out of range",
                self.time_zone_offset
            )));
        }
        if self.locale.trim().is_empty() {
            return Err(ModelError::InvalidConfig("locale must not be blank".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Presents demongoized times in UTC.
    pub fn use_utc(mut self, use_utc: bool) -> Self {
        self.config.use_utc = use_utc;
        self
    }

    /// Sets the configured zone.
    pub fn time_zone(mut self, offset: FixedOffset) -> Self {
        self.config.time_zone_offset = offset.local_minus_utc();
        self
    }

    /// Sets the locale localized fields read and write.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = locale.into();
        self
    }

    /// Sets the ordered fallback locales for `locale`.
    pub fn fallbacks<I, S>(mut self, locale: impl Into<String>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .fallbacks
            .insert(locale.into(), fallbacks.into_iter().map(Into::into).collect());
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the locale is blank.
    pub fn build(self) -> ModelResult<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
