//! # Reusable Blocks Settings
//!
//! Settings for the reusable blocks extension of Reinhardt CMS.
//!
//! Settings are resolved from layered sources, lowest priority first:
//!
//! ```text
//! DefaultSource  -> built-in defaults
//! TomlFileSource -> [reusable_blocks] table of a TOML file
//! EnvSource      -> REUSABLE_BLOCKS_* environment variables
//! ```
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
//!
//! let settings = ReusableBlocksSettings::default();
//! assert_eq!(settings.slot_attribute, "data-slot");
//! assert_eq!(settings.max_nesting_depth, 5);
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod sources;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use builder::SettingsBuilder;
pub use sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};

/// Default slot marker attribute
pub const DEFAULT_SLOT_ATTRIBUTE: &str = "data-slot";

/// Default slot label attribute
pub const DEFAULT_SLOT_LABEL_ATTRIBUTE: &str = "data-slot-label";

/// Default maximum layout nesting depth
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 5;

/// Default render timeout in seconds
pub const DEFAULT_RENDER_TIMEOUT_SECS: f64 = 5.0;

/// Default wrapper template for a standalone reusable block
pub const DEFAULT_TEMPLATE: &str = "reusable_blocks/reusable_block.html";

/// Default API path prefix
pub const DEFAULT_API_PREFIX: &str = "/reusable-blocks";

/// Settings errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// A configuration source failed to load
	#[error("Source error: {0}")]
	Source(#[from] SourceError),

	/// Merged values could not be deserialized into settings
	#[error("Parse error: {0}")]
	Parse(String),

	/// A setting has an invalid value
	#[error("Validation error: {0}")]
	Validation(String),
}

/// Base markup cache settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
	/// Whether rendered base markup is cached by document version
	pub enabled: bool,

	/// Lifetime of a cache entry in seconds (`None` keeps entries until invalidated)
	pub ttl_secs: Option<u64>,
}

impl CacheSettings {
	/// Entry lifetime as a [`Duration`]
	pub fn ttl(&self) -> Option<Duration> {
		self.ttl_secs.map(Duration::from_secs)
	}
}

/// Settings for reusable blocks and slot-based layouts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReusableBlocksSettings {
	/// Attribute marking an element as a slot; its value is the slot id
	pub slot_attribute: String,

	/// Attribute carrying a slot's display label
	pub slot_label_attribute: String,

	/// Maximum number of nested layout levels rendered before a marker is emitted
	pub max_nesting_depth: usize,

	/// Upper bound on the duration of one top-level render, in seconds
	pub render_timeout_secs: f64,

	/// Wrapper template host page renderers use for a standalone block
	pub template: String,

	/// Whether hosts register the default reusable block document type
	pub register_default_block: bool,

	/// Block types allowed in a reusable block's top-level content
	pub block_types: Vec<String>,

	/// Path prefix of the HTTP surface
	pub api_prefix: String,

	/// Base markup cache
	pub cache: CacheSettings,
}

impl Default for ReusableBlocksSettings {
	fn default() -> Self {
		Self {
			slot_attribute: DEFAULT_SLOT_ATTRIBUTE.to_string(),
			slot_label_attribute: DEFAULT_SLOT_LABEL_ATTRIBUTE.to_string(),
			max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
			render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
			template: DEFAULT_TEMPLATE.to_string(),
			register_default_block: true,
			block_types: vec!["rich_text".to_string(), "raw_html".to_string()],
			api_prefix: DEFAULT_API_PREFIX.to_string(),
			cache: CacheSettings::default(),
		}
	}
}

impl ReusableBlocksSettings {
	/// Load settings from defaults, an optional TOML file and the environment
	///
	/// # Examples
	///
	/// ```no_run
	/// use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
	///
	/// let settings = ReusableBlocksSettings::load(Some("settings.toml")).unwrap();
	/// println!("max depth: {}", settings.max_nesting_depth);
	/// ```
	pub fn load(toml_path: Option<&str>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new().add_source(DefaultSource::new());
		if let Some(path) = toml_path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder.add_source(EnvSource::new()).build()
	}

	/// Render timeout as a [`Duration`]
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
	/// use std::time::Duration;
	///
	/// let settings = ReusableBlocksSettings::default();
	/// assert_eq!(settings.render_timeout(), Duration::from_secs(5));
	/// ```
	pub fn render_timeout(&self) -> Duration {
		Duration::from_secs_f64(self.render_timeout_secs)
	}

	/// Override the slot attributes
	pub fn with_slot_attributes(
		mut self,
		slot_attribute: impl Into<String>,
		slot_label_attribute: impl Into<String>,
	) -> Self {
		self.slot_attribute = slot_attribute.into();
		self.slot_label_attribute = slot_label_attribute.into();
		self
	}

	/// Override the maximum nesting depth
	pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
		self.max_nesting_depth = depth;
		self
	}

	/// Override the render timeout
	pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
		self.render_timeout_secs = timeout.as_secs_f64();
		self
	}

	/// Enable the base markup cache
	pub fn with_cache(mut self, ttl: Option<Duration>) -> Self {
		self.cache = CacheSettings {
			enabled: true,
			ttl_secs: ttl.map(|d| d.as_secs()),
		};
		self
	}

	/// Validate every setting
	pub fn validate(&self) -> Result<(), SettingsError> {
		validation::validate(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults_match_documented_values() {
		// Arrange & Act
		let settings = ReusableBlocksSettings::default();

		// Assert
		assert_eq!(settings.slot_attribute, "data-slot");
		assert_eq!(settings.slot_label_attribute, "data-slot-label");
		assert_eq!(settings.max_nesting_depth, 5);
		assert_eq!(settings.render_timeout(), Duration::from_secs(5));
		assert_eq!(settings.template, "reusable_blocks/reusable_block.html");
		assert_eq!(settings.block_types, vec!["rich_text", "raw_html"]);
		assert!(!settings.cache.enabled);
		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn test_partial_json_keeps_defaults() {
		// Arrange
		let value = serde_json::json!({"max_nesting_depth": 10});

		// Act
		let settings: ReusableBlocksSettings = serde_json::from_value(value).unwrap();

		// Assert
		assert_eq!(settings.max_nesting_depth, 10);
		assert_eq!(settings.slot_attribute, DEFAULT_SLOT_ATTRIBUTE);
	}

	#[rstest]
	fn test_builder_style_overrides() {
		// Arrange & Act
		let settings = ReusableBlocksSettings::default()
			.with_slot_attributes("data-region", "data-region-name")
			.with_max_nesting_depth(2)
			.with_render_timeout(Duration::from_millis(250))
			.with_cache(Some(Duration::from_secs(60)));

		// Assert
		assert_eq!(settings.slot_attribute, "data-region");
		assert_eq!(settings.slot_label_attribute, "data-region-name");
		assert_eq!(settings.max_nesting_depth, 2);
		assert_eq!(settings.render_timeout(), Duration::from_millis(250));
		assert_eq!(settings.cache.ttl(), Some(Duration::from_secs(60)));
	}
}
