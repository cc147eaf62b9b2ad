//! Slot compositor
//!
//! Renders a layout document with page-supplied slot fills:
//!
//! ```text
//! load -> render base markup -> scan slots -> fill slots -> expand references -> serialize
//! ```
//!
//! References to other documents are rendered as placeholders first and
//! expanded afterwards, one nesting level deeper each time. A nested render
//! past the depth ceiling is replaced by a visible marker. A missing
//! document renders as nothing. Running past the render deadline aborts
//! the whole render.

use crate::cache::{BaseMarkupCache, BaseRender, InMemoryBaseMarkupCache};
use crate::content::{BlockId, SlotFills, StreamField};
use crate::document::{DocumentStore, ReusableBlock};
use crate::error::{BlocksError, BlocksResult};
use crate::markup::{self, MarkupFragment};
use crate::render::{
	ContentRenderer, DeferredReference, DeferredReferences, HtmlBlockRenderer, PLACEHOLDER_ATTRIBUTE,
};
use crate::scanner::SlotScanner;
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Markup emitted in place of a layout nested past the depth ceiling
pub const MAX_DEPTH_MARKER: &str = r#"<div class="reusable-block-error" data-error="max-depth">Maximum nesting depth exceeded</div>"#;

/// Deadline shared by every level of one top-level render
#[derive(Debug, Clone, Copy)]
pub struct RenderDeadline {
	started: Instant,
	timeout: Duration,
}

impl RenderDeadline {
	/// Deadline `timeout` from now
	pub fn start(timeout: Duration) -> Self {
		Self {
			started: Instant::now(),
			timeout,
		}
	}

	/// Time since the render started
	pub fn elapsed(&self) -> Duration {
		self.started.elapsed()
	}

	/// Fail with [`BlocksError::RenderTimeout`] once the deadline has passed
	pub fn check(&self) -> BlocksResult<()> {
		let elapsed = self.elapsed();
		if elapsed > self.timeout {
			return Err(BlocksError::RenderTimeout {
				elapsed,
				timeout: self.timeout,
			});
		}
		Ok(())
	}
}

/// Renders layouts with slot fills under depth and time limits
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
/// use reinhardt_reusable_blocks_core::compositor::SlotCompositor;
/// use reinhardt_reusable_blocks_core::content::{ContentBlock, SlotFills, SlotPlaceholder, StreamField};
/// use reinhardt_reusable_blocks_core::store::InMemoryDocumentStore;
///
/// let store = Arc::new(InMemoryDocumentStore::new());
/// let layout = store
///     .create(
///         "Two Column",
///         StreamField::new().add_block(ContentBlock::slot(
///             SlotPlaceholder::new("main")
///                 .with_default(StreamField::new().add_block(ContentBlock::rich_text("<p>Default</p>"))),
///         )),
///     )
///     .unwrap();
///
/// let compositor = SlotCompositor::new(store, &ReusableBlocksSettings::default());
/// let fills = SlotFills::new().with(
///     "main",
///     StreamField::new().add_block(ContentBlock::rich_text("<p>Custom</p>")),
/// );
///
/// let html = compositor.render(layout.id, &fills).unwrap();
/// assert_eq!(html, r#"<div data-slot="main"><p>Custom</p></div>"#);
/// ```
pub struct SlotCompositor {
	store: Arc<dyn DocumentStore>,
	renderer: Arc<dyn ContentRenderer>,
	scanner: SlotScanner,
	max_depth: usize,
	timeout: Duration,
	cache: Option<Arc<dyn BaseMarkupCache>>,
}

impl SlotCompositor {
	/// Compositor reading from `store`, configured by `settings`
	///
	/// Uses [`HtmlBlockRenderer`] and, when `settings.cache.enabled` is set,
	/// an [`InMemoryBaseMarkupCache`]. A nesting depth of 0 is raised to 1 so
	/// the top-level layout always renders.
	pub fn new(store: Arc<dyn DocumentStore>, settings: &ReusableBlocksSettings) -> Self {
		if settings.max_nesting_depth == 0 {
			tracing::warn!("max_nesting_depth of 0 would reject every render, using 1");
		}
		let cache: Option<Arc<dyn BaseMarkupCache>> = if settings.cache.enabled {
			let mut cache = InMemoryBaseMarkupCache::new();
			if let Some(ttl) = settings.cache.ttl() {
				cache = cache.with_ttl(ttl);
			}
			Some(Arc::new(cache))
		} else {
			None
		};

		Self {
			store,
			renderer: Arc::new(HtmlBlockRenderer::new(settings)),
			scanner: SlotScanner::new(settings),
			max_depth: settings.max_nesting_depth.max(1),
			timeout: settings.render_timeout(),
			cache,
		}
	}

	/// Replace the content renderer
	pub fn with_renderer(mut self, renderer: Arc<dyn ContentRenderer>) -> Self {
		self.renderer = renderer;
		self
	}

	/// Use `cache` for base markup
	pub fn with_cache(mut self, cache: Arc<dyn BaseMarkupCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	/// Document store this compositor reads from
	pub fn store(&self) -> &Arc<dyn DocumentStore> {
		&self.store
	}

	/// Slot scanner configured for this compositor
	pub fn scanner(&self) -> &SlotScanner {
		&self.scanner
	}

	/// Render `layout_id` at the top level with a fresh deadline
	pub fn render(&self, layout_id: BlockId, fills: &SlotFills) -> BlocksResult<String> {
		let deadline = RenderDeadline::start(self.timeout);
		let result = self.render_at(layout_id, fills, 0, &deadline);
		log_timeout(&result, layout_id);
		result
	}

	/// Render page content, expanding every reference it holds
	///
	/// References in `content` are rendered as top-level layouts.
	pub fn render_page(&self, content: &StreamField) -> BlocksResult<String> {
		let deadline = RenderDeadline::start(self.timeout);
		let mut deferred = DeferredReferences::new();
		let markup = self.renderer.render_block_tree(content, &mut deferred);
		let fragment = MarkupFragment::parse(&markup);
		let result = self
			.expand_references(&fragment, &deferred, 0, &deadline)
			.and_then(|_| fragment.serialize());
		if let Err(BlocksError::RenderTimeout { elapsed, timeout }) = &result {
			tracing::error!(?elapsed, ?timeout, "page render timed out");
		}
		result
	}

	/// Render `layout_id` at nesting `depth` against a shared `deadline`
	///
	/// Fails with [`BlocksError::MaxDepthExceeded`] when `depth` is at or
	/// past the ceiling, [`BlocksError::NotFound`] for a missing or
	/// unpublished document and [`BlocksError::RenderTimeout`] once the
	/// deadline passes. Nested failures of the first two kinds are absorbed
	/// into the returned markup.
	pub fn render_at(
		&self,
		layout_id: BlockId,
		fills: &SlotFills,
		depth: usize,
		deadline: &RenderDeadline,
	) -> BlocksResult<String> {
		if depth >= self.max_depth {
			return Err(BlocksError::MaxDepthExceeded {
				depth,
				max: self.max_depth,
			});
		}
		deadline.check()?;

		// Loading
		let block = self.load(layout_id)?;
		deadline.check()?;

		// Rendering base markup
		let BaseRender { markup, mut deferred } = self.base_render(&block);
		let fragment = MarkupFragment::parse(&markup);

		// Scanning and filling
		let slots = self.scanner.scan_fragment(&fragment);
		let mut rendered_fills: HashMap<&str, String> = HashMap::new();
		for slot in &slots {
			deadline.check()?;
			if !slot.info.is_fillable() {
				continue;
			}
			let Some(content) = fills.get(&slot.info.slot_id) else {
				continue;
			};
			let fill_markup = rendered_fills
				.entry(slot.info.slot_id.as_str())
				.or_insert_with(|| self.renderer.render_block_tree(content, &mut deferred));
			MarkupFragment::replace_children(&slot.element, MarkupFragment::parse(fill_markup));
		}
		tracing::debug!(
			block_id = %layout_id,
			depth,
			slots = slots.len(),
			filled = rendered_fills.len(),
			"filled layout slots"
		);

		// Nested references, from fills and from the layout itself
		self.expand_references(&fragment, &deferred, depth + 1, deadline)?;

		fragment.serialize()
	}

	/// Base markup of `block` without fills, from the cache when configured
	pub fn base_render(&self, block: &ReusableBlock) -> BaseRender {
		let key = (block.id, block.version);
		if let Some(cache) = &self.cache
			&& let Some(hit) = cache.get(&key)
		{
			return hit;
		}

		let mut deferred = DeferredReferences::new();
		let markup = self.renderer.render_block_tree(&block.content, &mut deferred);
		let render = BaseRender { markup, deferred };
		if let Some(cache) = &self.cache {
			cache.set(key, render.clone());
		}
		render
	}

	fn load(&self, id: BlockId) -> BlocksResult<ReusableBlock> {
		match self.store.get_document(id)? {
			Some(block) if block.live => Ok(block),
			_ => Err(BlocksError::NotFound(id)),
		}
	}

	fn expand_references(
		&self,
		fragment: &MarkupFragment,
		deferred: &DeferredReferences,
		depth: usize,
		deadline: &RenderDeadline,
	) -> BlocksResult<()> {
		for element in fragment.elements_with_attribute(PLACEHOLDER_ATTRIBUTE) {
			// Authored markup using the attribute is left as written
			let Some(value) = markup::attribute_value(&element, PLACEHOLDER_ATTRIBUTE)
				.filter(|value| deferred.owns(value))
			else {
				continue;
			};
			deadline.check()?;

			let Some(reference) = deferred.resolve(&value) else {
				tracing::debug!("dropping placeholder without a matching reference");
				MarkupFragment::replace_element(&element, MarkupFragment::parse(""));
				continue;
			};

			let result = match reference {
				DeferredReference::Block(id) => self.render_at(*id, &SlotFills::new(), depth, deadline),
				DeferredReference::Layout(layout) => {
					self.render_at(layout.layout, &layout.fills(), depth, deadline)
				}
			};

			let replacement = match result {
				Ok(html) => html,
				Err(BlocksError::MaxDepthExceeded { depth, max }) => {
					tracing::warn!(
						block_id = %reference.target(),
						depth,
						max,
						"Maximum nesting depth exceeded, rendering marker instead"
					);
					MAX_DEPTH_MARKER.to_string()
				}
				Err(BlocksError::NotFound(id)) => {
					tracing::warn!(block_id = %id, "referenced reusable block not found, rendering nothing");
					String::new()
				}
				Err(err) => return Err(err),
			};
			MarkupFragment::replace_element(&element, MarkupFragment::parse(&replacement));
		}
		Ok(())
	}
}

fn log_timeout(result: &BlocksResult<String>, layout_id: BlockId) {
	if let Err(BlocksError::RenderTimeout { elapsed, timeout }) = result {
		tracing::error!(
			block_id = %layout_id,
			?elapsed,
			?timeout,
			"layout render timed out"
		);
	}
}
