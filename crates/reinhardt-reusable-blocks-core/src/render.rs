//! Content tree rendering
//!
//! A [`ContentRenderer`] turns a [`StreamField`] into markup. References to
//! other documents are not expanded here: each becomes an empty placeholder
//! element pointing into a [`DeferredReferences`] table, which the
//! compositor resolves afterwards under its depth and time limits.
//!
//! Placeholder values carry a token unique to their table, so authored
//! markup that happens to use [`PLACEHOLDER_ATTRIBUTE`] is never mistaken
//! for a placeholder.

use crate::content::{BlockId, ContentBlock, LayoutBlock, SlotPlaceholder, StreamField};
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use uuid::Uuid;

/// Attribute on placeholder elements; its value is `{token}:{index}`
pub const PLACEHOLDER_ATTRIBUTE: &str = "data-reusable-block-ref";

/// A reference left for the compositor to expand
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredReference {
	/// Chooser reference to a whole block
	Block(BlockId),
	/// Layout reference with its fills
	Layout(LayoutBlock),
}

impl DeferredReference {
	/// Referenced document
	pub fn target(&self) -> BlockId {
		match self {
			Self::Block(id) => *id,
			Self::Layout(layout) => layout.layout,
		}
	}
}

/// Table of references collected while rendering one content tree
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredReferences {
	token: String,
	entries: Vec<DeferredReference>,
}

impl Default for DeferredReferences {
	fn default() -> Self {
		Self {
			token: Uuid::new_v4().simple().to_string(),
			entries: Vec::new(),
		}
	}
}

impl DeferredReferences {
	/// Empty table with a fresh placeholder token
	pub fn new() -> Self {
		Self::default()
	}

	/// Placeholder element for the reference at `index`
	pub fn placeholder(&self, index: usize) -> String {
		format!("<div {PLACEHOLDER_ATTRIBUTE}=\"{}:{index}\"></div>", self.token)
	}

	/// Whether a placeholder attribute value was issued by this table
	pub fn owns(&self, value: &str) -> bool {
		self.index_of(value).is_some()
	}

	/// Reference a placeholder attribute value points to
	///
	/// `None` for values issued by another table or authored by hand.
	pub fn resolve(&self, value: &str) -> Option<&DeferredReference> {
		self.index_of(value).and_then(|index| self.entries.get(index))
	}

	fn index_of(&self, value: &str) -> Option<usize> {
		value
			.strip_prefix(self.token.as_str())?
			.strip_prefix(':')?
			.parse()
			.ok()
	}

	/// Record a reference and return its index
	pub fn push(&mut self, reference: DeferredReference) -> usize {
		self.entries.push(reference);
		self.entries.len() - 1
	}

	/// Reference at `index`
	pub fn get(&self, index: usize) -> Option<&DeferredReference> {
		self.entries.get(index)
	}

	/// Number of recorded references
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing was recorded
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate in recording order
	pub fn iter(&self) -> std::slice::Iter<'_, DeferredReference> {
		self.entries.iter()
	}
}

/// Renders a content tree to markup
///
/// Implementations must not mutate `content` and must return the same
/// markup for the same input.
pub trait ContentRenderer: Send + Sync {
	/// Render `content`, recording document references in `deferred`
	fn render_block_tree(&self, content: &StreamField, deferred: &mut DeferredReferences) -> String;
}

/// HTML renderer for the built-in block types
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
/// use reinhardt_reusable_blocks_core::content::{ContentBlock, SlotPlaceholder, StreamField};
/// use reinhardt_reusable_blocks_core::render::{ContentRenderer, DeferredReferences, HtmlBlockRenderer};
///
/// let renderer = HtmlBlockRenderer::new(&ReusableBlocksSettings::default());
/// let content = StreamField::new().add_block(ContentBlock::slot(
///     SlotPlaceholder::new("main").with_label("Main"),
/// ));
///
/// let html = renderer.render_block_tree(&content, &mut DeferredReferences::new());
/// assert_eq!(html, r#"<div data-slot="main" data-slot-label="Main"></div>"#);
/// ```
#[derive(Debug, Clone)]
pub struct HtmlBlockRenderer {
	slot_attribute: String,
	slot_label_attribute: String,
}

impl HtmlBlockRenderer {
	/// Renderer emitting the slot attributes named in `settings`
	pub fn new(settings: &ReusableBlocksSettings) -> Self {
		Self {
			slot_attribute: settings.slot_attribute.clone(),
			slot_label_attribute: settings.slot_label_attribute.clone(),
		}
	}

	fn render_into(&self, content: &StreamField, deferred: &mut DeferredReferences, out: &mut String) {
		for block in content.iter() {
			match block {
				ContentBlock::RichText(html) | ContentBlock::RawHtml(html) => out.push_str(html),
				// Unset chooser renders nothing
				ContentBlock::ReusableBlock(None) => {}
				ContentBlock::ReusableBlock(Some(id)) => {
					let index = deferred.push(DeferredReference::Block(*id));
					out.push_str(&deferred.placeholder(index));
				}
				ContentBlock::Layout(layout) => {
					let index = deferred.push(DeferredReference::Layout(layout.clone()));
					out.push_str(&deferred.placeholder(index));
				}
				ContentBlock::Slot(slot) => self.render_slot(slot, deferred, out),
			}
		}
	}

	fn render_slot(&self, slot: &SlotPlaceholder, deferred: &mut DeferredReferences, out: &mut String) {
		out.push_str("<div ");
		out.push_str(&self.slot_attribute);
		out.push_str("=\"");
		out.push_str(&escape_attribute(&slot.slot_id));
		out.push('"');
		if let Some(label) = &slot.label {
			out.push(' ');
			out.push_str(&self.slot_label_attribute);
			out.push_str("=\"");
			out.push_str(&escape_attribute(label));
			out.push('"');
		}
		out.push('>');
		self.render_into(&slot.default_content, deferred, out);
		out.push_str("</div>");
	}
}

impl ContentRenderer for HtmlBlockRenderer {
	fn render_block_tree(&self, content: &StreamField, deferred: &mut DeferredReferences) -> String {
		let mut out = String::new();
		self.render_into(content, deferred, &mut out);
		out
	}
}

/// Escape a value for a double-quoted HTML attribute
pub fn escape_attribute(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'"' => escaped.push_str("&quot;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'\'' => escaped.push_str("&#x27;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::content::SlotFill;
	use rstest::{fixture, rstest};

	#[fixture]
	fn renderer() -> HtmlBlockRenderer {
		HtmlBlockRenderer::new(&ReusableBlocksSettings::default())
	}

	#[rstest]
	fn test_text_blocks_are_emitted_verbatim(renderer: HtmlBlockRenderer) {
		// Arrange
		let content = StreamField::new()
			.add_block(ContentBlock::rich_text("<p>Rich</p>"))
			.add_block(ContentBlock::raw_html("<script>x()</script>"));
		let mut deferred = DeferredReferences::new();

		// Act
		let html = renderer.render_block_tree(&content, &mut deferred);

		// Assert
		assert_eq!(html, "<p>Rich</p><script>x()</script>");
		assert!(deferred.is_empty());
	}

	#[rstest]
	fn test_references_become_indexed_placeholders(renderer: HtmlBlockRenderer) {
		// Arrange
		let (a, b) = (BlockId::new(), BlockId::new());
		let content = StreamField::new()
			.add_block(ContentBlock::reference(a))
			.add_block(ContentBlock::ReusableBlock(None))
			.add_block(ContentBlock::layout(b, vec![SlotFill::new("main", StreamField::new())]));
		let mut deferred = DeferredReferences::new();

		// Act
		let html = renderer.render_block_tree(&content, &mut deferred);

		// Assert
		assert_eq!(html, format!("{}{}", deferred.placeholder(0), deferred.placeholder(1)));
		assert!(html.starts_with(r#"<div data-reusable-block-ref=""#));
		assert_eq!(deferred.get(0), Some(&DeferredReference::Block(a)));
		assert_eq!(deferred.get(1).map(DeferredReference::target), Some(b));
	}

	#[rstest]
	fn test_slot_renders_default_and_escapes_attributes(renderer: HtmlBlockRenderer) {
		// Arrange
		let content = StreamField::new().add_block(ContentBlock::slot(
			SlotPlaceholder::new("main")
				.with_label("Main \"area\"")
				.with_default(StreamField::new().add_block(ContentBlock::rich_text("<p>Default</p>"))),
		));

		// Act
		let html = renderer.render_block_tree(&content, &mut DeferredReferences::new());

		// Assert
		assert_eq!(
			html,
			r#"<div data-slot="main" data-slot-label="Main &quot;area&quot;"><p>Default</p></div>"#
		);
	}

	#[rstest]
	fn test_custom_slot_attributes() {
		// Arrange
		let settings =
			ReusableBlocksSettings::default().with_slot_attributes("data-region", "data-region-name");
		let renderer = HtmlBlockRenderer::new(&settings);
		let content = StreamField::new().add_block(ContentBlock::slot(SlotPlaceholder::new("side")));

		// Act
		let html = renderer.render_block_tree(&content, &mut DeferredReferences::new());

		// Assert
		assert_eq!(html, r#"<div data-region="side"></div>"#);
	}

	#[rstest]
	fn test_placeholder_values_resolve_only_in_their_own_table() {
		// Arrange
		let id = BlockId::new();
		let mut deferred = DeferredReferences::new();
		let index = deferred.push(DeferredReference::Block(id));
		let other = DeferredReferences::new();
		let placeholder = deferred.placeholder(index);
		let value = placeholder
			.split('"')
			.nth(1)
			.unwrap();

		// Act
		let own = deferred.resolve(value);
		let foreign = other.resolve(value);

		// Assert
		assert_eq!(own, Some(&DeferredReference::Block(id)));
		assert!(deferred.owns(value));
		assert!(foreign.is_none());
		assert!(!deferred.owns("0"));
		assert!(!deferred.owns("note"));
		assert!(deferred.resolve("0").is_none());
	}
}
