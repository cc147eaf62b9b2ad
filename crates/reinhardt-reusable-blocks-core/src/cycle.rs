//! Save-time circular reference detection

use crate::content::{BlockId, StreamField};
use crate::document::DocumentStore;
use crate::error::{BlocksError, BlocksResult};
use crate::walker::ReferenceWalker;

/// Rejects content that would make a document reach itself
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use reinhardt_reusable_blocks_core::content::{BlockId, ContentBlock, StreamField};
/// use reinhardt_reusable_blocks_core::cycle::CycleDetector;
/// use reinhardt_reusable_blocks_core::document::ReusableBlock;
///
/// let store: HashMap<BlockId, ReusableBlock> = HashMap::new();
/// let id = BlockId::new();
/// let content = StreamField::new().add_block(ContentBlock::reference(id));
///
/// let err = CycleDetector::new(&store).check(id, &content).unwrap_err();
/// assert!(err.to_string().starts_with("Circular reference detected"));
/// ```
pub struct CycleDetector<'a, S: DocumentStore + ?Sized> {
	store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> CycleDetector<'a, S> {
	/// Detector reading the current graph from `store`
	pub fn new(store: &'a S) -> Self {
		Self { store }
	}

	/// Check `content` proposed for `candidate` before it is persisted
	///
	/// Only the stored graph is read; the candidate's stored content is
	/// ignored since `content` replaces it. On failure the error carries the
	/// chain in traversal order, starting and ending with `candidate`.
	pub fn check(&self, candidate: BlockId, content: &StreamField) -> BlocksResult<()> {
		let walker = ReferenceWalker::new(self.store);
		let path = [candidate];

		for reference in ReferenceWalker::<S>::references_in(content) {
			if let Some(chain) = walker.walk(reference, &path)? {
				let names: Vec<String> =
					chain.iter().map(|id| self.store.display_name(*id)).collect();
				tracing::warn!(
					block_id = %candidate,
					chain = %names.join(" → "),
					"rejected content with circular reference"
				);
				return Err(BlocksError::CycleDetected { chain, path: names });
			}
		}

		Ok(())
	}
}
