//! In-memory document store
//!
//! Saves run slug, name and circular reference validation while holding the
//! write lock, so two concurrent edits cannot each pass the cycle check
//! against a graph the other is about to change.
//!
//! Versions come from one counter for the whole store and only move
//! forward, so `(id, version)` never names two different contents, even
//! after a block is deleted and saved again under the same id.

use crate::content::{BlockId, StreamField};
use crate::cycle::CycleDetector;
use crate::document::{DocumentStore, ReusableBlock};
use crate::error::{BlocksError, BlocksResult};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe in-memory store of reusable blocks
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_core::content::{ContentBlock, StreamField};
/// use reinhardt_reusable_blocks_core::store::InMemoryDocumentStore;
///
/// let store = InMemoryDocumentStore::new();
/// let header = store
///     .create("Site Header", StreamField::new().add_block(ContentBlock::rich_text("<h1>Hi</h1>")))
///     .unwrap();
/// assert_eq!(header.slug, "site-header");
/// assert_eq!(store.get_by_slug("site-header").unwrap().id, header.id);
/// ```
#[derive(Default)]
pub struct InMemoryDocumentStore {
	blocks: RwLock<HashMap<BlockId, ReusableBlock>>,
	block_types: Option<Vec<String>>,
	last_version: AtomicU64,
}

impl InMemoryDocumentStore {
	/// Empty store accepting any block type
	pub fn new() -> Self {
		Self::default()
	}

	/// Restrict top-level editor block types accepted by [`save`](Self::save)
	pub fn with_block_types(mut self, block_types: Vec<String>) -> Self {
		self.block_types = Some(block_types);
		self
	}

	/// Create and save a new block
	pub fn create(&self, name: impl Into<String>, content: StreamField) -> BlocksResult<ReusableBlock> {
		self.save(ReusableBlock::new(name, content))
	}

	/// Validate and persist `block`, returning the stored copy
	///
	/// Generates the slug when empty, rejects duplicate slugs and content
	/// that would reference the block itself, assigns the next store version
	/// and sets timestamps. Any version carried by `block` is ignored.
	pub fn save(&self, mut block: ReusableBlock) -> BlocksResult<ReusableBlock> {
		block.clean()?;

		if let Some(allowed) = &self.block_types {
			let rejected = block.disallowed_block_types(allowed);
			if !rejected.is_empty() {
				return Err(BlocksError::Validation(format!(
					"block types not allowed in reusable blocks: {}",
					rejected.join(", ")
				)));
			}
		}

		let mut blocks = self.blocks.write();

		if blocks
			.values()
			.any(|other| other.id != block.id && other.slug == block.slug)
		{
			return Err(BlocksError::DuplicateSlug(block.slug));
		}

		CycleDetector::new(&*blocks).check(block.id, &block.content)?;

		let now = Utc::now();
		if let Some(existing) = blocks.get(&block.id) {
			block.created_at = existing.created_at;
		}
		// Only advanced while the write lock is held
		block.version = self.last_version.fetch_add(1, Ordering::Relaxed) + 1;
		block.updated_at = now;

		tracing::debug!(
			block_id = %block.id,
			slug = %block.slug,
			version = block.version,
			"saved reusable block"
		);
		blocks.insert(block.id, block.clone());
		Ok(block)
	}

	/// Stored block by id, published or not
	pub fn get(&self, id: BlockId) -> Option<ReusableBlock> {
		self.blocks.read().get(&id).cloned()
	}

	/// Stored block by slug
	pub fn get_by_slug(&self, slug: &str) -> Option<ReusableBlock> {
		self.blocks
			.read()
			.values()
			.find(|block| block.slug == slug)
			.cloned()
	}

	/// Mark a block as published
	pub fn publish(&self, id: BlockId) -> BlocksResult<()> {
		self.set_live(id, true)
	}

	/// Hide a block from rendering
	pub fn unpublish(&self, id: BlockId) -> BlocksResult<()> {
		self.set_live(id, false)
	}

	fn set_live(&self, id: BlockId, live: bool) -> BlocksResult<()> {
		let mut blocks = self.blocks.write();
		let block = blocks.get_mut(&id).ok_or(BlocksError::NotFound(id))?;
		block.live = live;
		block.updated_at = Utc::now();
		Ok(())
	}

	/// Blocks whose content points at `id`
	pub fn referrers(&self, id: BlockId) -> Vec<BlockId> {
		referrers_of(&self.blocks.read(), id)
	}

	/// Remove a block
	///
	/// Refused with [`BlocksError::InUse`] while other blocks reference it,
	/// unless `force` is set. Forced deletion leaves dangling references,
	/// which render as nothing.
	pub fn delete(&self, id: BlockId, force: bool) -> BlocksResult<ReusableBlock> {
		let mut blocks = self.blocks.write();
		if !blocks.contains_key(&id) {
			return Err(BlocksError::NotFound(id));
		}
		let referrers = referrers_of(&blocks, id);
		if !referrers.is_empty() && !force {
			return Err(BlocksError::InUse { id, referrers });
		}
		if !referrers.is_empty() {
			tracing::warn!(
				block_id = %id,
				referrers = referrers.len(),
				"force-deleting referenced reusable block"
			);
		}
		blocks.remove(&id).ok_or(BlocksError::NotFound(id))
	}

	/// All blocks, most recently updated first
	pub fn list(&self) -> Vec<ReusableBlock> {
		let mut blocks: Vec<ReusableBlock> = self.blocks.read().values().cloned().collect();
		blocks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.slug.cmp(&b.slug)));
		blocks
	}

	/// Number of stored blocks
	pub fn len(&self) -> usize {
		self.blocks.read().len()
	}

	/// Whether the store is empty
	pub fn is_empty(&self) -> bool {
		self.blocks.read().is_empty()
	}

	/// Save every block of a JSON fixture (an array of blocks), in order
	pub fn load_json(&self, json: &str) -> BlocksResult<usize> {
		let fixtures: Vec<ReusableBlock> = serde_json::from_str(json)?;
		let count = fixtures.len();
		for block in fixtures {
			self.save(block)?;
		}
		tracing::info!(count, "loaded reusable block fixtures");
		Ok(count)
	}

	/// Serialize every block as a JSON fixture
	pub fn to_json(&self) -> BlocksResult<String> {
		Ok(serde_json::to_string_pretty(&self.list())?)
	}
}

fn referrers_of(blocks: &HashMap<BlockId, ReusableBlock>, id: BlockId) -> Vec<BlockId> {
	let mut referrers: Vec<BlockId> = blocks
		.values()
		.filter(|block| block.id != id && block.content.references().contains(&id))
		.map(|block| block.id)
		.collect();
	referrers.sort();
	referrers
}

impl DocumentStore for InMemoryDocumentStore {
	fn get_document(&self, id: BlockId) -> BlocksResult<Option<ReusableBlock>> {
		Ok(self.get(id))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::content::ContentBlock;
	use rstest::{fixture, rstest};

	#[fixture]
	fn store() -> InMemoryDocumentStore {
		InMemoryDocumentStore::new()
	}

	fn text(html: &str) -> StreamField {
		StreamField::new().add_block(ContentBlock::rich_text(html))
	}

	#[rstest]
	fn test_create_assigns_slug_and_version(store: InMemoryDocumentStore) {
		// Act
		let block = store.create("Main Layout", text("<p>x</p>")).unwrap();

		// Assert
		assert_eq!(block.slug, "main-layout");
		assert_eq!(block.version, 1);
		assert_eq!(store.len(), 1);
	}

	#[rstest]
	fn test_save_bumps_version_and_keeps_created_at(store: InMemoryDocumentStore) {
		// Arrange
		let mut block = store.create("Header", text("<p>v1</p>")).unwrap();
		let created_at = block.created_at;
		block.content = text("<p>v2</p>");

		// Act
		let saved = store.save(block).unwrap();

		// Assert
		assert_eq!(saved.version, 2);
		assert_eq!(saved.created_at, created_at);
		assert!(saved.updated_at >= created_at);
	}

	#[rstest]
	fn test_recreated_block_never_reuses_a_version(store: InMemoryDocumentStore) {
		// Arrange
		let old = store.create("Old", text("<p>OLD</p>")).unwrap();
		store.delete(old.id, false).unwrap();
		let mut stale = ReusableBlock::new("New", text("<p>NEW</p>")).with_id(old.id);
		stale.version = old.version;

		// Act
		let recreated = store.save(stale).unwrap();

		// Assert
		assert!(recreated.version > old.version);
	}

	#[rstest]
	fn test_versions_increase_across_blocks(store: InMemoryDocumentStore) {
		// Act
		let first = store.create("First", StreamField::new()).unwrap();
		let second = store.create("Second", StreamField::new()).unwrap();
		let first_again = store.save(first.clone()).unwrap();

		// Assert
		assert!(second.version > first.version);
		assert!(first_again.version > second.version);
	}

	#[rstest]
	fn test_duplicate_slug_is_rejected(store: InMemoryDocumentStore) {
		// Arrange
		store.create("Header", StreamField::new()).unwrap();

		// Act
		let result = store.create("header", StreamField::new());

		// Assert
		assert_eq!(result.unwrap_err(), BlocksError::DuplicateSlug("header".to_string()));
		assert_eq!(store.len(), 1);
	}

	#[rstest]
	fn test_cycle_is_rejected_and_not_persisted(store: InMemoryDocumentStore) {
		// Arrange
		let b = store.create("Layout B", StreamField::new()).unwrap();
		let a = store
			.create("Layout A", StreamField::new().add_block(ContentBlock::reference(b.id)))
			.unwrap();
		let mut b_edit = b.clone();
		b_edit.content = StreamField::new().add_block(ContentBlock::reference(a.id));

		// Act
		let result = store.save(b_edit);

		// Assert
		match result {
			Err(BlocksError::CycleDetected { chain, .. }) => assert_eq!(chain, vec![b.id, a.id, b.id]),
			other => panic!("expected cycle, got {:?}", other),
		}
		assert_eq!(store.get(b.id).unwrap(), b);
	}

	#[rstest]
	fn test_block_type_restriction(store: InMemoryDocumentStore) {
		// Arrange
		let store = store.with_block_types(vec!["rich_text".to_string()]);

		// Act
		let rejected = store.create("Raw", StreamField::new().add_block(ContentBlock::raw_html("<hr>")));
		let accepted = store.create("Rich", text("<p>ok</p>"));

		// Assert
		assert!(matches!(rejected, Err(BlocksError::Validation(_))));
		assert!(accepted.is_ok());
	}

	#[rstest]
	fn test_unpublished_block_is_still_stored(store: InMemoryDocumentStore) {
		// Arrange
		let block = store.create("Draft", StreamField::new()).unwrap();

		// Act
		store.unpublish(block.id).unwrap();

		// Assert
		assert!(!store.get(block.id).unwrap().live);
		store.publish(block.id).unwrap();
		assert!(store.get(block.id).unwrap().live);
	}

	#[rstest]
	fn test_publish_unknown_block_is_not_found(store: InMemoryDocumentStore) {
		// Arrange
		let missing = BlockId::new();

		// Act
		let result = store.publish(missing);

		// Assert
		assert_eq!(result, Err(BlocksError::NotFound(missing)));
	}

	#[rstest]
	fn test_delete_refused_while_referenced(store: InMemoryDocumentStore) {
		// Arrange
		let footer = store.create("Footer", StreamField::new()).unwrap();
		let page = store
			.create("Page", StreamField::new().add_block(ContentBlock::reference(footer.id)))
			.unwrap();

		// Act
		let refused = store.delete(footer.id, false);
		let forced = store.delete(footer.id, true);

		// Assert
		assert_eq!(
			refused.unwrap_err(),
			BlocksError::InUse {
				id: footer.id,
				referrers: vec![page.id]
			}
		);
		assert_eq!(forced.unwrap().id, footer.id);
		assert!(store.get(footer.id).is_none());
	}

	#[rstest]
	fn test_list_orders_by_most_recent_update(store: InMemoryDocumentStore) {
		// Arrange
		let first = store.create("First", StreamField::new()).unwrap();
		let second = store.create("Second", StreamField::new()).unwrap();
		std::thread::sleep(std::time::Duration::from_millis(5));
		let first = store.save(first).unwrap();

		// Act
		let listed: Vec<BlockId> = store.list().into_iter().map(|b| b.id).collect();

		// Assert
		assert_eq!(listed, vec![first.id, second.id]);
	}

	#[rstest]
	fn test_json_fixture_round_trip(store: InMemoryDocumentStore) {
		// Arrange
		store.create("Header", text("<h1>Header</h1>")).unwrap();
		store.create("Footer", text("<p>Footer</p>")).unwrap();
		let json = store.to_json().unwrap();
		let restored = InMemoryDocumentStore::new();

		// Act
		let count = restored.load_json(&json).unwrap();

		// Assert
		assert_eq!(count, 2);
		assert_eq!(restored.get_by_slug("footer").unwrap().content, text("<p>Footer</p>"));
	}

	#[rstest]
	fn test_malformed_fixture_is_serialization_error(store: InMemoryDocumentStore) {
		// Act
		let result = store.load_json("{not json");

		// Assert
		assert!(matches!(result, Err(BlocksError::Serialization(_))));
	}
}
