//! Reference graph traversal
//!
//! Documents point at each other through chooser references, layout blocks
//! and references nested inside slot fills or slot defaults. The walker
//! follows those edges depth-first with an explicit stack and an explored
//! set, so traversal terminates on any graph.

use crate::content::{BlockId, StreamField};
use crate::document::DocumentStore;
use crate::error::BlocksResult;
use indexmap::IndexSet;
use std::collections::HashSet;

/// Depth-first walker over the document reference graph
pub struct ReferenceWalker<'a, S: DocumentStore + ?Sized> {
	store: &'a S,
}

struct Frame {
	id: BlockId,
	edges: Vec<BlockId>,
	next: usize,
}

impl<'a, S: DocumentStore + ?Sized> ReferenceWalker<'a, S> {
	/// Walker reading documents from `store`
	pub fn new(store: &'a S) -> Self {
		Self { store }
	}

	/// Direct references of `content`, in first-seen order
	pub fn references_in(content: &StreamField) -> IndexSet<BlockId> {
		content.references().into_iter().collect()
	}

	/// Documents the stored document `id` points at in one hop
	///
	/// A missing document is a dead end and yields an empty set.
	pub fn enumerate_references(&self, id: BlockId) -> BlocksResult<IndexSet<BlockId>> {
		match self.store.get_document(id)? {
			Some(block) => Ok(Self::references_in(&block.content)),
			None => {
				tracing::debug!(block_id = %id, "dangling reference treated as dead end");
				Ok(IndexSet::new())
			}
		}
	}

	/// Search forward from `start` for any document already on `path`
	///
	/// `path` is the ordered chain from the traversal root to the node that
	/// references `start`. Returns the full chain (`path`, the nodes walked,
	/// then the repeated id) when a cycle closes, `None` otherwise.
	///
	/// Cycles among documents that are not on `path` are skipped through the
	/// explored set and never reported.
	pub fn walk(&self, start: BlockId, path: &[BlockId]) -> BlocksResult<Option<Vec<BlockId>>> {
		if path.contains(&start) {
			let mut chain = path.to_vec();
			chain.push(start);
			return Ok(Some(chain));
		}

		let mut explored: HashSet<BlockId> = HashSet::new();
		explored.insert(start);
		let mut stack = vec![Frame {
			id: start,
			edges: self.enumerate_references(start)?.into_iter().collect(),
			next: 0,
		}];

		while let Some(frame) = stack.last_mut() {
			let Some(&target) = frame.edges.get(frame.next) else {
				stack.pop();
				continue;
			};
			frame.next += 1;

			if path.contains(&target) {
				let mut chain = path.to_vec();
				chain.extend(stack.iter().map(|f| f.id));
				chain.push(target);
				return Ok(Some(chain));
			}

			if explored.insert(target) {
				let edges = self.enumerate_references(target)?.into_iter().collect();
				stack.push(Frame {
					id: target,
					edges,
					next: 0,
				});
			}
		}

		Ok(None)
	}

	/// Every document reachable from `id`, excluding `id` itself unless a cycle leads back
	pub fn reachable(&self, id: BlockId) -> BlocksResult<IndexSet<BlockId>> {
		let mut seen = IndexSet::new();
		let mut pending: Vec<BlockId> = self.enumerate_references(id)?.into_iter().rev().collect();
		while let Some(next) = pending.pop() {
			if seen.insert(next) {
				let edges = self.enumerate_references(next)?;
				pending.extend(edges.into_iter().rev());
			}
		}
		Ok(seen)
	}
}
