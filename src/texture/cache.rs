//! Bounded cache of optimized texture variants
//!
//! Entries are keyed by (texture, role, LOD level) and charged against a
//! [`MemoryBudget`]. Every insertion is followed by a synchronous budget check;
//! when over budget, entries are evicted in the order given by the active
//! [`CacheStrategy`] until usage fits again.
//!
//! Entries can be pinned for the current frame. Pinned entries, and the entry
//! whose insertion triggered the check, are never eviction candidates.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};

use super::budget::MemoryBudget;
use super::config::CacheStrategy;
use super::pipeline::variant_memory;
use super::role::TextureRole;
use super::texture::{Texture, TextureId, TextureVariant};

/// Cache key: texture identity, role and LOD level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub texture: TextureId,
    pub role: TextureRole,
    pub lod_level: u32,
}

impl CacheKey {
    pub fn new(texture: TextureId, role: TextureRole, lod_level: u32) -> Self {
        Self { texture, role, lod_level }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.texture.0, self.role, self.lod_level)
    }
}

/// One cached source texture and its optimized variants
#[derive(Debug)]
pub struct TextureCacheEntry {
    /// The material system owns the source; the cache only observes it
    source: Weak<Texture>,
    role: TextureRole,
    variants: BTreeMap<u32, Arc<TextureVariant>>,
    last_used: u64,
    memory_bytes: u64,
    source_bytes: u64,
    importance: f32,
    references: u32,
    pinned_frame: Option<u64>,
}

impl TextureCacheEntry {
    /// Entry holding a freshly built variant, with one reference
    pub fn new(source: &Arc<Texture>, variant: Arc<TextureVariant>, last_used: u64) -> Self {
        let role = variant.role;
        let memory_bytes = variant_memory(&variant);
        let mut variants = BTreeMap::new();
        variants.insert(variant.lod_level, variant);

        Self {
            source: Arc::downgrade(source),
            role,
            variants,
            last_used,
            memory_bytes,
            source_bytes: source.memory_bytes(),
            importance: role.importance(),
            references: 1,
            pinned_frame: None,
        }
    }

    /// Source texture, if the material system still holds it
    pub fn source(&self) -> Option<Arc<Texture>> {
        self.source.upgrade()
    }

    pub fn role(&self) -> TextureRole {
        self.role
    }

    pub fn variant(&self, lod_level: u32) -> Option<&Arc<TextureVariant>> {
        self.variants.get(&lod_level)
    }

    pub fn variants(&self) -> impl Iterator<Item = &Arc<TextureVariant>> {
        self.variants.values()
    }

    pub fn last_used(&self) -> u64 {
        self.last_used
    }

    pub fn memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    /// Uncompressed full-resolution footprint of the source
    pub fn source_bytes(&self) -> u64 {
        self.source_bytes
    }

    pub fn importance(&self) -> f32 {
        self.importance
    }

    pub fn references(&self) -> u32 {
        self.references
    }
}

/// Bounded texture variant cache with pluggable eviction
pub struct TextureCache {
    entries: HashMap<CacheKey, TextureCacheEntry>,
    budget: MemoryBudget,
    strategy: CacheStrategy,
    /// Frame whose pins are honored, `None` outside a frame
    active_frame: Option<u64>,
    hits: u64,
    misses: u64,
}

impl TextureCache {
    /// Create a cache with a byte budget and eviction strategy
    pub fn new(budget_bytes: u64, strategy: CacheStrategy) -> Self {
        Self {
            entries: HashMap::new(),
            budget: MemoryBudget::new(budget_bytes),
            strategy,
            active_frame: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up the variant for `key`, refreshing its recency and reference count
    ///
    /// Counts a hit when found; callers record misses with [`record_miss`].
    ///
    /// [`record_miss`]: TextureCache::record_miss
    pub fn touch(&mut self, key: &CacheKey, stamp: u64) -> Option<Arc<TextureVariant>> {
        let entry = self.entries.get_mut(key)?;
        let variant = entry.variant(key.lod_level).cloned()?;
        entry.last_used = stamp;
        entry.references = entry.references.saturating_add(1);
        self.hits += 1;
        Some(variant)
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Read an entry without touching it
    pub fn get(&self, key: &CacheKey) -> Option<&TextureCacheEntry> {
        self.entries.get(key)
    }

    /// Insert an entry and enforce the budget
    ///
    /// An existing entry under the same key is replaced. Returns the keys that
    /// were evicted to get back under budget; `key` itself is never among them.
    pub fn insert(&mut self, key: CacheKey, entry: TextureCacheEntry) -> Vec<CacheKey> {
        self.insert_protected(key, entry, &[])
    }

    /// Insert like [`insert`], also sparing the keys in `protect`
    ///
    /// [`insert`]: TextureCache::insert
    pub fn insert_protected(
        &mut self,
        key: CacheKey,
        entry: TextureCacheEntry,
        protect: &[CacheKey],
    ) -> Vec<CacheKey> {
        self.remove(&key);

        self.budget.add(entry.memory_bytes);
        self.entries.insert(key, entry);

        let mut spared = Vec::with_capacity(protect.len() + 1);
        spared.push(key);
        spared.extend_from_slice(protect);
        self.enforce_budget(&spared)
    }

    /// Remove an entry, releasing its variants
    pub fn remove(&mut self, key: &CacheKey) -> Option<TextureCacheEntry> {
        let entry = self.entries.remove(key)?;
        self.budget.remove(entry.memory_bytes);
        Some(entry)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&CacheKey, &TextureCacheEntry)> {
        self.entries.iter()
    }

    /// Drop every entry and reset counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.budget.reset();
        self.hits = 0;
        self.misses = 0;
    }

    // --- Frame pinning ---

    /// Start honoring pins for `frame`; pins from earlier frames lapse
    ///
    /// Pins stay in force after the frame's update until the next call, so
    /// variants bound for rendering survive insertions in between.
    pub fn begin_frame(&mut self, frame: u64) {
        self.active_frame = Some(frame);
    }

    /// Protect `key` from eviction until the next frame begins
    ///
    /// Returns false when no frame is active or the key is not resident.
    pub fn pin(&mut self, key: &CacheKey) -> bool {
        let Some(frame) = self.active_frame else {
            return false;
        };
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.pinned_frame = Some(frame);
                true
            }
            None => false,
        }
    }

    pub fn is_pinned(&self, key: &CacheKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| self.is_entry_pinned(entry))
    }

    fn is_entry_pinned(&self, entry: &TextureCacheEntry) -> bool {
        self.active_frame.is_some() && entry.pinned_frame == self.active_frame
    }

    // --- Budget and eviction ---

    pub fn memory_used(&self) -> u64 {
        self.budget.used()
    }

    pub fn budget(&self) -> &MemoryBudget {
        &self.budget
    }

    pub fn strategy(&self) -> CacheStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: CacheStrategy) {
        self.strategy = strategy;
    }

    /// Change the budget and evict down to it
    pub fn set_budget(&mut self, budget_bytes: u64) -> Vec<CacheKey> {
        self.budget.set_budget(budget_bytes);
        self.enforce_budget(&[])
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f32 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f32 / lookups as f32
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Eviction candidates, first to go first
    ///
    /// Excludes pinned entries and the keys in `protect`.
    pub fn eviction_order(&self, protect: &[CacheKey]) -> Vec<CacheKey> {
        let mut candidates: Vec<Candidate<'_>> = self
            .entries
            .iter()
            .filter(|(key, entry)| !protect.contains(*key) && !self.is_entry_pinned(entry))
            .collect();

        match self.strategy {
            CacheStrategy::Lru => candidates.sort_by(by_recency),
            CacheStrategy::Importance => candidates.sort_by(|a, b| {
                a.1.importance
                    .partial_cmp(&b.1.importance)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| by_recency(a, b))
            }),
            CacheStrategy::Distance => candidates.sort_by(|a, b| {
                a.1.references.cmp(&b.1.references).then_with(|| by_recency(a, b))
            }),
        }

        candidates.into_iter().map(|(key, _)| *key).collect()
    }

    /// Evict until usage fits the budget
    fn enforce_budget(&mut self, protect: &[CacheKey]) -> Vec<CacheKey> {
        if !self.budget.is_over_budget() {
            return Vec::new();
        }

        let mut evicted = Vec::new();
        for key in self.eviction_order(protect) {
            if !self.budget.is_over_budget() {
                break;
            }
            if let Some(entry) = self.remove(&key) {
                log::debug!(
                    "Evicted texture cache entry {} ({} bytes, {} variants)",
                    key,
                    entry.memory_bytes,
                    entry.variants.len()
                );
                evicted.push(key);
            }
        }

        if self.budget.is_over_budget() {
            log::warn!(
                "Texture cache over budget after eviction: {} / {} bytes held by in-use entries",
                self.budget.used(),
                self.budget.budget()
            );
        }

        evicted
    }
}

type Candidate<'a> = (&'a CacheKey, &'a TextureCacheEntry);

/// Oldest first, then by key
fn by_recency(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.1.last_used.cmp(&b.1.last_used).then_with(|| a.0.cmp(b.0))
}
