//! # Reinhardt Reusable Blocks
//!
//! Reusable content blocks and slot-based layouts for Reinhardt CMS.
//!
//! Editors build a layout once as a reusable block containing named slots.
//! Pages reference the layout and fill the slots with their own content.
//! Rendering resolves every reference, fills every slot and guards against
//! runaway nesting and slow renders.
//!
//! ## Feature Flags
//!
//! - `conf` - Settings and their sources
//! - `core` - Content model, store, compositor, scanner and cycle detection
//! - `api` - HTTP endpoints for the slot fill editor
//! - `full` (default) - Everything above
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "core")]
//! # {
//! use std::sync::Arc;
//! use reinhardt_reusable_blocks::conf::ReusableBlocksSettings;
//! use reinhardt_reusable_blocks::core::prelude::*;
//!
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let footer = store
//!     .create(
//!         "Footer",
//!         StreamField::new().add_block(ContentBlock::rich_text("<footer>2026</footer>")),
//!     )
//!     .unwrap();
//!
//! let page = StreamField::new()
//!     .add_block(ContentBlock::rich_text("<h1>Welcome</h1>"))
//!     .add_block(ContentBlock::reference(footer.id));
//!
//! let compositor = SlotCompositor::new(store, &ReusableBlocksSettings::default());
//! assert_eq!(
//!     compositor.render_page(&page).unwrap(),
//!     "<h1>Welcome</h1><footer>2026</footer>"
//! );
//! # }
//! ```

#[cfg(feature = "conf")]
pub use reinhardt_reusable_blocks_conf as conf;

#[cfg(feature = "core")]
pub use reinhardt_reusable_blocks_core as core;

#[cfg(feature = "api")]
pub use reinhardt_reusable_blocks_api as api;

#[cfg(feature = "conf")]
pub use reinhardt_reusable_blocks_conf::{ReusableBlocksSettings, SettingsError};

#[cfg(feature = "core")]
pub use reinhardt_reusable_blocks_core::{BlocksError, BlocksResult};
