//! Reusable block documents and the store lookup contract

use crate::content::{BlockId, StreamField};
use crate::error::{BlocksError, BlocksResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum length of a block name and slug
pub const MAX_NAME_LENGTH: usize = 255;

/// Block types that carry layout structure and are accepted regardless of
/// the configured editor block types
pub const STRUCTURAL_BLOCK_TYPES: &[&str] = &["reusable_block", "layout", "slot"];

/// A named, versioned unit of reusable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReusableBlock {
	/// Stable identifier
	pub id: BlockId,

	/// Human-readable name
	pub name: String,

	/// URL-safe unique identifier, generated from `name` when empty
	#[serde(default)]
	pub slug: String,

	/// Block content
	#[serde(default)]
	pub content: StreamField,

	/// Published flag; unpublished blocks are not rendered
	#[serde(default = "default_live")]
	pub live: bool,

	/// Content version, bumped on every save
	#[serde(default)]
	pub version: u64,

	/// Creation timestamp
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,

	/// Last modification timestamp
	#[serde(default = "Utc::now")]
	pub updated_at: DateTime<Utc>,
}

fn default_live() -> bool {
	true
}

impl ReusableBlock {
	/// New unsaved block with a fresh id
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reusable_blocks_core::content::StreamField;
	/// use reinhardt_reusable_blocks_core::document::ReusableBlock;
	///
	/// let block = ReusableBlock::new("Site Header", StreamField::new());
	/// assert!(block.live);
	/// assert_eq!(block.version, 0);
	/// ```
	pub fn new(name: impl Into<String>, content: StreamField) -> Self {
		let now = Utc::now();
		Self {
			id: BlockId::new(),
			name: name.into(),
			slug: String::new(),
			content,
			live: true,
			version: 0,
			created_at: now,
			updated_at: now,
		}
	}

	/// Set an explicit slug
	pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
		self.slug = slug.into();
		self
	}

	/// Set an explicit id
	pub fn with_id(mut self, id: BlockId) -> Self {
		self.id = id;
		self
	}

	/// Validate name and slug, generating the slug from the name when empty
	pub fn clean(&mut self) -> BlocksResult<()> {
		let name = self.name.trim();
		if name.is_empty() {
			return Err(BlocksError::Validation("name cannot be empty".to_string()));
		}
		if self.name.chars().count() > MAX_NAME_LENGTH {
			return Err(BlocksError::Validation(format!(
				"name cannot exceed {} characters",
				MAX_NAME_LENGTH
			)));
		}

		if self.slug.is_empty() {
			self.slug = slugify(&self.name);
		}
		if self.slug.is_empty() {
			return Err(BlocksError::Validation(format!(
				"cannot derive a slug from name '{}'",
				self.name
			)));
		}
		if self.slug.len() > MAX_NAME_LENGTH {
			return Err(BlocksError::Validation(format!(
				"slug cannot exceed {} characters",
				MAX_NAME_LENGTH
			)));
		}
		if !is_valid_slug(&self.slug) {
			return Err(BlocksError::Validation(format!(
				"slug '{}' may only contain letters, numbers, underscores or hyphens",
				self.slug
			)));
		}
		Ok(())
	}

	/// Top-level block types not present in `allowed`
	///
	/// Structural types (references, layouts and slots) are always accepted.
	pub fn disallowed_block_types(&self, allowed: &[String]) -> Vec<&'static str> {
		let mut rejected = Vec::new();
		for block in self.content.iter() {
			let block_type = block.block_type();
			if STRUCTURAL_BLOCK_TYPES.contains(&block_type) {
				continue;
			}
			if !allowed.iter().any(|a| a == block_type) && !rejected.contains(&block_type) {
				rejected.push(block_type);
			}
		}
		rejected
	}
}

/// Lowercase ASCII slug: runs of whitespace and hyphens become one hyphen,
/// other punctuation is dropped
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_core::document::slugify;
///
/// assert_eq!(slugify("Site Header (v2)"), "site-header-v2");
/// assert_eq!(slugify("  Two   Columns  "), "two-columns");
/// ```
pub fn slugify(value: &str) -> String {
	let mut slug = String::with_capacity(value.len());
	let mut pending_dash = false;
	for c in value.chars() {
		if c.is_ascii_alphanumeric() || c == '_' {
			if pending_dash && !slug.is_empty() {
				slug.push('-');
			}
			pending_dash = false;
			slug.push(c.to_ascii_lowercase());
		} else if c.is_whitespace() || c == '-' {
			pending_dash = true;
		}
	}
	slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Whether `slug` only contains letters, numbers, underscores or hyphens
pub fn is_valid_slug(slug: &str) -> bool {
	!slug.is_empty()
		&& slug
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Read access to stored documents
///
/// Renders, inventories and cycle checks only ever read through this trait.
pub trait DocumentStore: Send + Sync {
	/// Fetch a document by id, `None` when it does not exist
	fn get_document(&self, id: BlockId) -> BlocksResult<Option<ReusableBlock>>;

	/// Display name for error chains
	fn display_name(&self, id: BlockId) -> String {
		match self.get_document(id) {
			Ok(Some(block)) => block.name,
			_ => id.to_string(),
		}
	}
}

impl DocumentStore for HashMap<BlockId, ReusableBlock> {
	fn get_document(&self, id: BlockId) -> BlocksResult<Option<ReusableBlock>> {
		Ok(self.get(&id).cloned())
	}
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
	fn get_document(&self, id: BlockId) -> BlocksResult<Option<ReusableBlock>> {
		(**self).get_document(id)
	}

	fn display_name(&self, id: BlockId) -> String {
		(**self).display_name(id)
	}
}
