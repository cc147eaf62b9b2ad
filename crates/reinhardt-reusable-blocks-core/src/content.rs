//! StreamField content model for reusable blocks
//!
//! A reusable block's body is a [`StreamField`]: an ordered list of typed
//! [`ContentBlock`]s. Blocks serialize in the usual StreamField shape,
//! `{"type": "rich_text", "value": "<p>Hello</p>"}`.
//!
//! Layouts are ordinary reusable blocks whose content contains
//! [`SlotPlaceholder`]s. Pages embed a layout through a [`LayoutBlock`]
//! and supply [`SlotFill`]s matched to placeholders by slot id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Reusable block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
	/// Generate a new random identifier
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	/// Wrap an existing UUID
	pub fn from_uuid(uuid: Uuid) -> Self {
		Self(uuid)
	}

	/// Underlying UUID
	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for BlockId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for BlockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl FromStr for BlockId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

/// A single typed content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
	/// Rich text, stored as sanitized HTML
	RichText(String),

	/// Raw HTML, emitted verbatim
	RawHtml(String),

	/// Chooser reference to another reusable block (`None` when unset)
	ReusableBlock(Option<BlockId>),

	/// Layout reference with per-page slot fills
	Layout(LayoutBlock),

	/// Slot placeholder authored inside a layout
	Slot(SlotPlaceholder),
}

impl ContentBlock {
	/// Rich text block
	pub fn rich_text(html: impl Into<String>) -> Self {
		Self::RichText(html.into())
	}

	/// Raw HTML block
	pub fn raw_html(html: impl Into<String>) -> Self {
		Self::RawHtml(html.into())
	}

	/// Chooser reference to `id`
	pub fn reference(id: BlockId) -> Self {
		Self::ReusableBlock(Some(id))
	}

	/// Layout reference to `layout` with the given fills
	pub fn layout(layout: BlockId, slot_content: Vec<SlotFill>) -> Self {
		Self::Layout(LayoutBlock {
			layout,
			slot_content,
		})
	}

	/// Slot placeholder
	pub fn slot(placeholder: SlotPlaceholder) -> Self {
		Self::Slot(placeholder)
	}

	/// Block type name as it appears in serialized content
	pub fn block_type(&self) -> &'static str {
		match self {
			Self::RichText(_) => "rich_text",
			Self::RawHtml(_) => "raw_html",
			Self::ReusableBlock(_) => "reusable_block",
			Self::Layout(_) => "layout",
			Self::Slot(_) => "slot",
		}
	}
}

/// Ordered sequence of content blocks
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_core::content::{ContentBlock, StreamField};
///
/// let body = StreamField::new()
///     .add_block(ContentBlock::rich_text("<p>Intro</p>"))
///     .add_block(ContentBlock::raw_html("<hr>"));
/// assert_eq!(body.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamField {
	blocks: Vec<ContentBlock>,
}

impl StreamField {
	/// Empty stream field
	pub fn new() -> Self {
		Self { blocks: Vec::new() }
	}

	/// Append a block
	pub fn add_block(mut self, block: ContentBlock) -> Self {
		self.blocks.push(block);
		self
	}

	/// Append a block in place
	pub fn push(&mut self, block: ContentBlock) {
		self.blocks.push(block);
	}

	/// Blocks in order
	pub fn blocks(&self) -> &[ContentBlock] {
		&self.blocks
	}

	/// Iterate over blocks
	pub fn iter(&self) -> std::slice::Iter<'_, ContentBlock> {
		self.blocks.iter()
	}

	/// Number of top-level blocks
	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	/// Whether there are no blocks
	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	/// Ids of every document this content points at, in first-seen order
	///
	/// Looks inside layout fills and slot defaults, since both are part of
	/// this document's own content.
	pub fn references(&self) -> Vec<BlockId> {
		let mut found = Vec::new();
		collect_references(self, &mut found);
		found
	}
}

fn collect_references(content: &StreamField, found: &mut Vec<BlockId>) {
	for block in content.iter() {
		match block {
			ContentBlock::ReusableBlock(Some(id)) => push_unique(found, *id),
			ContentBlock::Layout(layout) => {
				push_unique(found, layout.layout);
				for fill in &layout.slot_content {
					collect_references(&fill.content, found);
				}
			}
			ContentBlock::Slot(slot) => collect_references(&slot.default_content, found),
			ContentBlock::ReusableBlock(None)
			| ContentBlock::RichText(_)
			| ContentBlock::RawHtml(_) => {}
		}
	}
}

fn push_unique(found: &mut Vec<BlockId>, id: BlockId) {
	if !found.contains(&id) {
		found.push(id);
	}
}

impl FromIterator<ContentBlock> for StreamField {
	fn from_iter<I: IntoIterator<Item = ContentBlock>>(iter: I) -> Self {
		Self {
			blocks: iter.into_iter().collect(),
		}
	}
}

impl<'a> IntoIterator for &'a StreamField {
	type Item = &'a ContentBlock;
	type IntoIter = std::slice::Iter<'a, ContentBlock>;

	fn into_iter(self) -> Self::IntoIter {
		self.blocks.iter()
	}
}

/// Slot placeholder authored in a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPlaceholder {
	/// Identifier pages use to target this slot
	pub slot_id: String,

	/// Display label (falls back to `slot_id`)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,

	/// Content shown when no fill is supplied
	#[serde(default)]
	pub default_content: StreamField,
}

impl SlotPlaceholder {
	/// Placeholder without label or default content
	pub fn new(slot_id: impl Into<String>) -> Self {
		Self {
			slot_id: slot_id.into(),
			label: None,
			default_content: StreamField::new(),
		}
	}

	/// Set the display label
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Set the default content
	pub fn with_default(mut self, content: StreamField) -> Self {
		self.default_content = content;
		self
	}
}

/// Page-supplied content for one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotFill {
	/// Target slot id, matched by string equality
	pub slot_id: String,

	/// Content placed into the slot
	#[serde(default)]
	pub content: StreamField,
}

impl SlotFill {
	/// Fill for `slot_id`
	pub fn new(slot_id: impl Into<String>, content: StreamField) -> Self {
		Self {
			slot_id: slot_id.into(),
			content,
		}
	}
}

/// Layout reference embedded in a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
	/// Referenced layout document
	pub layout: BlockId,

	/// Fills for the layout's slots
	#[serde(default)]
	pub slot_content: Vec<SlotFill>,
}

impl LayoutBlock {
	/// Fills keyed by slot id
	pub fn fills(&self) -> SlotFills {
		self.slot_content.iter().cloned().collect()
	}
}

/// Slot fills keyed by slot id
///
/// Keeps first-insertion order. Inserting an id twice replaces the earlier
/// content.
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_core::content::{ContentBlock, SlotFills, StreamField};
///
/// let mut fills = SlotFills::new();
/// fills.insert("main", StreamField::new().add_block(ContentBlock::rich_text("<p>A</p>")));
/// fills.insert("main", StreamField::new().add_block(ContentBlock::rich_text("<p>B</p>")));
/// assert_eq!(fills.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotFills {
	fills: IndexMap<String, StreamField>,
}

impl SlotFills {
	/// No fills
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the content for `slot_id`
	pub fn insert(&mut self, slot_id: impl Into<String>, content: StreamField) {
		self.fills.insert(slot_id.into(), content);
	}

	/// Builder form of [`insert`](Self::insert)
	pub fn with(mut self, slot_id: impl Into<String>, content: StreamField) -> Self {
		self.insert(slot_id, content);
		self
	}

	/// Content for `slot_id`
	pub fn get(&self, slot_id: &str) -> Option<&StreamField> {
		self.fills.get(slot_id)
	}

	/// Number of distinct slot ids
	pub fn len(&self) -> usize {
		self.fills.len()
	}

	/// Whether no fills are present
	pub fn is_empty(&self) -> bool {
		self.fills.is_empty()
	}

	/// Iterate in insertion order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &StreamField)> {
		self.fills.iter().map(|(k, v)| (k.as_str(), v))
	}
}

impl FromIterator<SlotFill> for SlotFills {
	fn from_iter<I: IntoIterator<Item = SlotFill>>(iter: I) -> Self {
		let mut fills = Self::new();
		for fill in iter {
			fills.insert(fill.slot_id, fill.content);
		}
		fills
	}
}
