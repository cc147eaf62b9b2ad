//! Base markup cache
//!
//! Caches the output of rendering a layout's own content, before slots are
//! filled or references expanded. Entries are keyed by document id and
//! content version, so a save never serves stale markup.

use crate::content::BlockId;
use crate::render::DeferredReferences;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Rendered base markup and the references its placeholders point at
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRender {
	/// Markup with slot and reference placeholders
	pub markup: String,
	/// References indexed by the placeholders
	pub deferred: DeferredReferences,
}

/// Cache key: document id and content version
pub type BaseMarkupKey = (BlockId, u64);

/// Storage for rendered base markup
pub trait BaseMarkupCache: Send + Sync {
	/// Cached render for `key`
	fn get(&self, key: &BaseMarkupKey) -> Option<BaseRender>;

	/// Store a render
	fn set(&self, key: BaseMarkupKey, value: BaseRender);

	/// Drop every version cached for `id`
	fn invalidate(&self, id: BlockId);

	/// Drop everything
	fn clear(&self);
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStatistics {
	/// Number of cache hits
	pub hits: u64,
	/// Number of cache misses
	pub misses: u64,
	/// Total number of lookups
	pub total_requests: u64,
	/// Current number of entries
	pub entry_count: u64,
}

impl CacheStatistics {
	/// Hit rate (0.0 to 1.0)
	pub fn hit_rate(&self) -> f64 {
		if self.total_requests == 0 {
			0.0
		} else {
			self.hits as f64 / self.total_requests as f64
		}
	}
}

struct CacheEntry {
	value: BaseRender,
	expires_at: Option<Instant>,
}

impl CacheEntry {
	fn is_expired(&self) -> bool {
		self.expires_at.is_some_and(|at| Instant::now() >= at)
	}
}

/// In-memory base markup cache
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_core::cache::{BaseMarkupCache, BaseRender, InMemoryBaseMarkupCache};
/// use reinhardt_reusable_blocks_core::content::BlockId;
/// use reinhardt_reusable_blocks_core::render::DeferredReferences;
///
/// let cache = InMemoryBaseMarkupCache::new();
/// let id = BlockId::new();
/// cache.set((id, 1), BaseRender { markup: "<p>x</p>".to_string(), deferred: DeferredReferences::new() });
///
/// assert!(cache.get(&(id, 1)).is_some());
/// assert!(cache.get(&(id, 2)).is_none());
/// assert_eq!(cache.statistics().hits, 1);
/// ```
#[derive(Default)]
pub struct InMemoryBaseMarkupCache {
	entries: RwLock<HashMap<BaseMarkupKey, CacheEntry>>,
	ttl: Option<Duration>,
	hits: AtomicU64,
	misses: AtomicU64,
}

impl InMemoryBaseMarkupCache {
	/// Cache without expiry
	pub fn new() -> Self {
		Self::default()
	}

	/// Expire entries `ttl` after they are stored
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);
		self
	}

	/// Remove expired entries
	pub fn cleanup_expired(&self) {
		self.entries.write().retain(|_, entry| !entry.is_expired());
	}

	/// Hit and miss counters
	pub fn statistics(&self) -> CacheStatistics {
		let hits = self.hits.load(Ordering::Relaxed);
		let misses = self.misses.load(Ordering::Relaxed);
		CacheStatistics {
			hits,
			misses,
			total_requests: hits + misses,
			entry_count: self.entries.read().len() as u64,
		}
	}
}

impl BaseMarkupCache for InMemoryBaseMarkupCache {
	fn get(&self, key: &BaseMarkupKey) -> Option<BaseRender> {
		let found = self
			.entries
			.read()
			.get(key)
			.filter(|entry| !entry.is_expired())
			.map(|entry| entry.value.clone());
		match found {
			Some(value) => {
				self.hits.fetch_add(1, Ordering::Relaxed);
				tracing::debug!(block_id = %key.0, version = key.1, "base markup cache hit");
				Some(value)
			}
			None => {
				self.misses.fetch_add(1, Ordering::Relaxed);
				tracing::debug!(block_id = %key.0, version = key.1, "base markup cache miss");
				None
			}
		}
	}

	fn set(&self, key: BaseMarkupKey, value: BaseRender) {
		let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
		let mut entries = self.entries.write();
		// Older versions of the same document can never be requested again
		entries.retain(|(id, version), _| *id != key.0 || *version >= key.1);
		entries.insert(key, CacheEntry { value, expires_at });
	}

	fn invalidate(&self, id: BlockId) {
		self.entries.write().retain(|(cached, _), _| *cached != id);
	}

	fn clear(&self) {
		self.entries.write().clear();
	}
}
