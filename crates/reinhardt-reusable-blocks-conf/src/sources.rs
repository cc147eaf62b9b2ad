//! Configuration sources for layered settings
//!
//! Each source yields a flat map of top-level keys to JSON values. Nested
//! tables (such as `cache`) are carried as JSON objects and deep-merged by
//! [`SettingsBuilder`](crate::SettingsBuilder).

use crate::ReusableBlocksSettings;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// Table name read from TOML files
pub const TOML_TABLE: &str = "reusable_blocks";

/// Default prefix for environment variables
pub const DEFAULT_ENV_PREFIX: &str = "REUSABLE_BLOCKS_";

/// Separator for nested keys in environment variable names (`CACHE__ENABLED`)
const NESTED_SEPARATOR: &str = "__";

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	/// File could not be read
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// TOML could not be parsed
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Value could not be converted to JSON
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Source content has an unexpected shape
	#[error("Invalid source: {0}")]
	InvalidSource(String),
}

/// Built-in defaults
pub struct DefaultSource;

impl DefaultSource {
	/// Create the defaults source
	pub fn new() -> Self {
		Self
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		match serde_json::to_value(ReusableBlocksSettings::default())? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			other => Err(SourceError::InvalidSource(format!(
				"defaults serialized to a non-object: {}",
				other
			))),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Built-in defaults".to_string()
	}
}

/// TOML file configuration source
///
/// Reads the `[reusable_blocks]` table when present, otherwise the top-level
/// keys of the file. A missing file yields no values.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reusable_blocks_conf::TomlFileSource;
	///
	/// let source = TomlFileSource::new("settings.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			tracing::debug!(path = %self.path.display(), "settings file not found, skipping");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let mut toml_value: toml::Table = toml::from_str(&content)?;

		let table = match toml_value.remove(TOML_TABLE) {
			Some(toml::Value::Table(table)) => table,
			Some(other) => {
				return Err(SourceError::InvalidSource(format!(
					"[{}] must be a table, found {}",
					TOML_TABLE,
					other.type_str()
				)));
			}
			None => toml_value,
		};

		match serde_json::to_value(table)? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Ok(IndexMap::new()),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source
///
/// `REUSABLE_BLOCKS_MAX_NESTING_DEPTH=3` sets `max_nesting_depth`,
/// `REUSABLE_BLOCKS_CACHE__ENABLED=true` sets `cache.enabled`.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Create a source reading `REUSABLE_BLOCKS_*` variables
	pub fn new() -> Self {
		Self {
			prefix: DEFAULT_ENV_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Set a different variable prefix
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reusable_blocks_conf::EnvSource;
	///
	/// let source = EnvSource::new().with_prefix("APP_BLOCKS_");
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Read from the given pairs instead of the process environment
	pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.vars = Some(
			vars.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		);
		self
	}

	fn variables(&self) -> Vec<(String, String)> {
		match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config: IndexMap<String, Value> = IndexMap::new();

		for (key, raw) in self.variables() {
			let Some(stripped) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let lower_key = stripped.to_lowercase();
			let mut path: Vec<&str> = lower_key.split(NESTED_SEPARATOR).collect();
			if path.iter().any(|segment| segment.is_empty()) {
				tracing::warn!(variable = %key, "ignoring malformed settings variable");
				continue;
			}

			let leaf = path.pop().unwrap_or_default();
			let value = parse_env_value(leaf, &raw);

			match path.split_first() {
				None => {
					config.insert(leaf.to_string(), value);
				}
				Some((head, rest)) => {
					let entry = config
						.entry((*head).to_string())
						.or_insert_with(|| Value::Object(Map::new()));
					insert_nested(entry, rest, leaf, value);
				}
			}
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

fn insert_nested(target: &mut Value, path: &[&str], leaf: &str, value: Value) {
	if !target.is_object() {
		*target = Value::Object(Map::new());
	}
	let Value::Object(map) = target else {
		return;
	};
	match path.split_first() {
		None => {
			map.insert(leaf.to_string(), value);
		}
		Some((head, rest)) => {
			let child = map
				.entry((*head).to_string())
				.or_insert_with(|| Value::Object(Map::new()));
			insert_nested(child, rest, leaf, value);
		}
	}
}

fn parse_env_value(key: &str, raw: &str) -> Value {
	let trimmed = raw.trim();

	if key == "block_types" {
		let list = trimmed
			.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(|s| Value::String(s.to_string()))
			.collect();
		return Value::Array(list);
	}

	match trimmed.to_lowercase().as_str() {
		"true" | "yes" | "on" => return Value::Bool(true),
		"false" | "no" | "off" => return Value::Bool(false),
		_ => {}
	}

	if let Ok(num) = trimmed.parse::<i64>() {
		Value::Number(num.into())
	} else if let Some(num) = trimmed
		.parse::<f64>()
		.ok()
		.and_then(serde_json::Number::from_f64)
	{
		Value::Number(num)
	} else {
		Value::String(raw.to_string())
	}
}
