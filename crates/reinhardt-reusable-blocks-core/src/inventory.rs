//! Slot inventory of a layout, for building fill editors

use crate::content::BlockId;
use crate::document::DocumentStore;
use crate::error::{BlocksError, BlocksResult};
use crate::render::{ContentRenderer, DeferredReferences, HtmlBlockRenderer};
use crate::scanner::{SlotInfo, SlotScanner};
use indexmap::IndexMap;
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One fillable slot of a layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInventoryEntry {
	/// Slot id fills must target
	#[serde(rename = "id")]
	pub slot_id: String,
	/// Display label
	pub label: String,
	/// Whether the layout provides default content
	pub has_default: bool,
}

/// Lists the slots of a layout from its current stored content
///
/// Never cached: editors need the slot ids that are valid right now.
pub struct SlotInventory {
	store: Arc<dyn DocumentStore>,
	renderer: Arc<dyn ContentRenderer>,
	scanner: SlotScanner,
}

impl SlotInventory {
	/// Inventory over `store` using the slot attributes of `settings`
	pub fn new(store: Arc<dyn DocumentStore>, settings: &ReusableBlocksSettings) -> Self {
		Self {
			store,
			renderer: Arc::new(HtmlBlockRenderer::new(settings)),
			scanner: SlotScanner::new(settings),
		}
	}

	/// Replace the content renderer
	pub fn with_renderer(mut self, renderer: Arc<dyn ContentRenderer>) -> Self {
		self.renderer = renderer;
		self
	}

	/// Slots of `layout_id` in document order, one entry per slot id
	///
	/// Slot elements with a blank id cannot be filled and are left out.
	/// A repeated id keeps its first position and takes the label and
	/// default flag of its last occurrence, the element a fill would
	/// otherwise appear to target last.
	pub fn inventory(&self, layout_id: BlockId) -> BlocksResult<Vec<SlotInventoryEntry>> {
		let block = match self.store.get_document(layout_id)? {
			Some(block) if block.live => block,
			_ => return Err(BlocksError::NotFound(layout_id)),
		};

		let markup = self
			.renderer
			.render_block_tree(&block.content, &mut DeferredReferences::new());

		let mut entries: IndexMap<String, SlotInventoryEntry> = IndexMap::new();
		for slot in self.scanner.scan(&markup).into_iter().filter(SlotInfo::is_fillable) {
			let has_default = slot.has_default();
			entries.insert(
				slot.slot_id.clone(),
				SlotInventoryEntry {
					slot_id: slot.slot_id,
					label: slot.label,
					has_default,
				},
			);
		}

		Ok(entries.into_values().collect())
	}
}
