//! # Reinhardt Reusable Blocks
//!
//! Reusable content blocks and slot-based layouts for Reinhardt CMS.
//!
//! A layout is a reusable block whose content contains named slots. Pages
//! reference the layout and fill those slots with their own content, matched
//! purely by slot id.
//!
//! ## Architecture
//!
//! ```text
//! reinhardt-reusable-blocks-core
//! ├── content    - StreamField blocks, slot placeholders and fills
//! ├── document   - ReusableBlock documents, DocumentStore trait
//! ├── store      - In-memory store with save-time validation
//! ├── render     - Content tree renderer with deferred references
//! ├── markup     - Mutable HTML fragment tree
//! ├── scanner    - Slot discovery in rendered markup
//! ├── walker     - Reference graph traversal
//! ├── cycle      - Circular reference detection
//! ├── compositor - Slot filling under depth and time limits
//! ├── inventory  - Slot listing for fill editors
//! └── cache      - Base markup cache keyed by document version
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
//! use reinhardt_reusable_blocks_core::prelude::*;
//!
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let layout = store
//!     .create(
//!         "Article Layout",
//!         StreamField::new()
//!             .add_block(ContentBlock::slot(
//!                 SlotPlaceholder::new("header").with_default(
//!                     StreamField::new().add_block(ContentBlock::rich_text("H")),
//!                 ),
//!             ))
//!             .add_block(ContentBlock::slot(SlotPlaceholder::new("footer"))),
//!     )
//!     .unwrap();
//!
//! let settings = ReusableBlocksSettings::default();
//! let compositor = SlotCompositor::new(store.clone(), &settings);
//! let fills = SlotFills::new().with(
//!     "header",
//!     StreamField::new().add_block(ContentBlock::rich_text("Custom H")),
//! );
//!
//! let html = compositor.render(layout.id, &fills).unwrap();
//! assert_eq!(
//!     html,
//!     r#"<div data-slot="header">Custom H</div><div data-slot="footer"></div>"#
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod compositor;
pub mod content;
pub mod cycle;
pub mod document;
pub mod error;
pub mod inventory;
pub mod markup;
pub mod render;
pub mod scanner;
pub mod store;
pub mod walker;

pub use error::{BlocksError, BlocksResult};

/// Convenient re-exports of commonly used items
pub mod prelude {
	pub use crate::cache::{BaseMarkupCache, InMemoryBaseMarkupCache};
	pub use crate::compositor::{RenderDeadline, SlotCompositor};
	pub use crate::content::{
		BlockId, ContentBlock, LayoutBlock, SlotFill, SlotFills, SlotPlaceholder, StreamField,
	};
	pub use crate::cycle::CycleDetector;
	pub use crate::document::{DocumentStore, ReusableBlock};
	pub use crate::error::{BlocksError, BlocksResult};
	pub use crate::inventory::{SlotInventory, SlotInventoryEntry};
	pub use crate::render::{ContentRenderer, HtmlBlockRenderer};
	pub use crate::scanner::{SlotInfo, SlotScanner};
	pub use crate::store::InMemoryDocumentStore;
	pub use crate::walker::ReferenceWalker;
}
