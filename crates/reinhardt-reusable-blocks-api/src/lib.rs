//! # Reinhardt Reusable Blocks API
//!
//! HTTP surface used by the slot fill editor.
//!
//! ## Endpoints
//!
//! ```text
//! GET {prefix}/blocks/{id}/slots/   -> {"slots": [{"id", "label", "has_default"}]}
//! GET {prefix}/blocks/{id}/render/  -> {"html": "..."}
//! ```
//!
//! [`SlotsApi`] answers requests without any transport so it can be driven
//! directly from tests; [`ApiServer`] serves it over HTTP/1.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::{Method, StatusCode};
//! use reinhardt_reusable_blocks_api::SlotsApi;
//! use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
//! use reinhardt_reusable_blocks_core::prelude::*;
//!
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let layout = store
//!     .create(
//!         "Layout",
//!         StreamField::new().add_block(ContentBlock::slot(SlotPlaceholder::new("main"))),
//!     )
//!     .unwrap();
//!
//! let api = SlotsApi::new(store, &ReusableBlocksSettings::default());
//! let response = api.handle(&Method::GET, &format!("/reusable-blocks/blocks/{}/slots/", layout.id));
//! assert_eq!(response.status, StatusCode::OK);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod handler;
pub mod server;

pub use error::ApiError;
pub use handler::{ApiResponse, SlotsApi};
pub use server::ApiServer;
