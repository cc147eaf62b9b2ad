//! Layered settings builder

use crate::sources::ConfigSource;
use crate::{ReusableBlocksSettings, SettingsError};
use indexmap::IndexMap;
use serde_json::Value;

/// Settings builder merging sources in priority order
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_conf::{DefaultSource, EnvSource, SettingsBuilder};
///
/// let settings = SettingsBuilder::new()
///     .add_source(DefaultSource::new())
///     .add_source(EnvSource::new().with_vars([("REUSABLE_BLOCKS_MAX_NESTING_DEPTH", "3")]))
///     .build()
///     .unwrap();
/// assert_eq!(settings.max_nesting_depth, 3);
/// ```
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Create a builder without sources
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	/// Add a configuration source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge all sources into a single map, higher priority last
	pub fn merged(&self) -> Result<IndexMap<String, Value>, SettingsError> {
		let mut ordered: Vec<&Box<dyn ConfigSource>> = self.sources.iter().collect();
		ordered.sort_by_key(|source| source.priority());

		let mut merged = IndexMap::new();
		for source in ordered {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"loaded settings source"
			);
			for (key, value) in values {
				match merged.get_mut(&key) {
					Some(existing) => deep_merge(existing, value),
					None => {
						merged.insert(key, value);
					}
				}
			}
		}
		Ok(merged)
	}

	/// Build and validate the settings
	///
	/// Unknown keys are ignored. Missing keys take their default value.
	pub fn build(self) -> Result<ReusableBlocksSettings, SettingsError> {
		let merged = self.merged()?;
		let object: serde_json::Map<String, Value> = merged.into_iter().collect();
		let settings: ReusableBlocksSettings = serde_json::from_value(Value::Object(object))
			.map_err(|e| SettingsError::Parse(e.to_string()))?;

		settings.validate()?;

		if settings.block_types.is_empty() {
			tracing::warn!(
				"reusable block settings list no block types; editors cannot add content to reusable blocks"
			);
		}

		Ok(settings)
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn deep_merge(target: &mut Value, incoming: Value) {
	match (target, incoming) {
		(Value::Object(existing), Value::Object(incoming)) => {
			for (key, value) in incoming {
				match existing.get_mut(&key) {
					Some(slot) => deep_merge(slot, value),
					None => {
						existing.insert(key, value);
					}
				}
			}
		}
		(slot, value) => *slot = value,
	}
}
