//! Reusable block error types

use crate::content::BlockId;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while storing, validating or rendering reusable blocks
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlocksError {
	/// Document does not exist or is not published
	#[error("Reusable block not found: {0}")]
	NotFound(BlockId),

	/// Saving the content would make a document include itself
	#[error("Circular reference detected: {}", path.join(" → "))]
	CycleDetected {
		/// Document ids in traversal order, starting and ending with the saved document
		chain: Vec<BlockId>,
		/// Display names for `chain`
		path: Vec<String>,
	},

	/// Layout nesting went past the configured ceiling
	#[error("Maximum nesting depth exceeded: depth {depth} > {max}")]
	MaxDepthExceeded {
		/// Depth the render tried to enter
		depth: usize,
		/// Configured maximum
		max: usize,
	},

	/// A top-level render ran past its deadline
	#[error("Render timed out after {elapsed:?} (limit {timeout:?})")]
	RenderTimeout {
		/// Time spent before the render was aborted
		elapsed: Duration,
		/// Configured limit
		timeout: Duration,
	},

	/// Invalid document field
	#[error("Validation error: {0}")]
	Validation(String),

	/// Slug already used by another document
	#[error("Slug already in use: {0}")]
	DuplicateSlug(String),

	/// Document is still referenced by other documents
	#[error("Reusable block {id} is referenced by {} other block(s)", referrers.len())]
	InUse {
		/// Document that was to be deleted
		id: BlockId,
		/// Documents referencing it
		referrers: Vec<BlockId>,
	},

	/// Fixture or content (de)serialization failed
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// Markup could not be produced
	#[error("Markup error: {0}")]
	Markup(String),
}

impl From<serde_json::Error> for BlocksError {
	fn from(err: serde_json::Error) -> Self {
		BlocksError::Serialization(err.to_string())
	}
}

/// Result type for reusable block operations
pub type BlocksResult<T> = Result<T, BlocksError>;
