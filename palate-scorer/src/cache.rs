//! Memoised similarity results with write-driven invalidation.
//!
//! Entries are keyed by the unordered user pair and the category, so a result
//! computed for `(alice, bob)` also serves `(bob, alice)`. Whenever a note is
//! written the owner's entries in that category are dropped and the owner's
//! generation for the category is bumped. A computation records the
//! generations it started from in a [`CacheTicket`]; if either user wrote in
//! the meantime the finished result is discarded instead of cached.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use palate_core::{Category, NoteWriteObserver, SimilarityResult, UserId};

type PairKey = (UserId, UserId, Category);
type OwnerKey = (UserId, Category);

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<PairKey, SimilarityResult>,
    generations: HashMap<OwnerKey, u64>,
}

impl CacheState {
    fn generation(&self, user: &UserId, category: Category) -> u64 {
        self.generations
            .get(&(user.clone(), category))
            .copied()
            .unwrap_or_default()
    }

    fn ticket(&self, user_a: &UserId, user_b: &UserId, category: Category) -> CacheTicket {
        CacheTicket {
            category,
            first: self.generation(user_a, category),
            second: self.generation(user_b, category),
        }
    }
}

/// Generations observed when a computation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket {
    category: Category,
    first: u64,
    second: u64,
}

/// Thread-safe cache of pairwise similarity results.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    state: Mutex<CacheState>,
}

fn pair_key(user_a: &UserId, user_b: &UserId, category: Category) -> PairKey {
    if user_a <= user_b {
        (user_a.clone(), user_b.clone(), category)
    } else {
        (user_b.clone(), user_a.clone(), category)
    }
}

impl SimilarityCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("similarity cache lock poisoned; discarding cached results");
            let mut state = poisoned.into_inner();
            state.entries.clear();
            self.state.clear_poison();
            state
        })
    }

    /// Look up a cached result, oriented so `user_a` is the caller's first
    /// user.
    #[must_use]
    pub fn get(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        category: Category,
    ) -> Option<SimilarityResult> {
        let state = self.lock();
        let cached = state.entries.get(&pair_key(user_a, user_b, category))?.clone();
        drop(state);
        Some(if cached.is_for(user_a, user_b) {
            cached
        } else {
            cached.swapped()
        })
    }

    /// Record the current generations of a pair before computing it.
    #[must_use]
    pub fn ticket(&self, user_a: &UserId, user_b: &UserId, category: Category) -> CacheTicket {
        self.lock().ticket(user_a, user_b, category)
    }

    /// Store a freshly computed result unless either user wrote a note in the
    /// category since `ticket` was taken.
    ///
    /// Returns whether the result was cached.
    pub fn store(&self, ticket: CacheTicket, result: &SimilarityResult) -> bool {
        let mut state = self.lock();
        if ticket.category != result.category
            || state.ticket(&result.user_a, &result.user_b, result.category) != ticket
        {
            log::debug!(
                "discarding stale {} similarity for {} and {}",
                result.category,
                result.user_a,
                result.user_b
            );
            return false;
        }
        let key = pair_key(&result.user_a, &result.user_b, result.category);
        let canonical = if result.user_a <= result.user_b {
            result.clone()
        } else {
            result.clone().swapped()
        };
        state.entries.insert(key, canonical);
        true
    }

    /// Drop every entry involving `owner` in `category`.
    pub fn invalidate(&self, owner: &UserId, category: Category) {
        let mut state = self.lock();
        let generation = state
            .generations
            .entry((owner.clone(), category))
            .or_default();
        *generation = generation.wrapping_add(1);
        state.entries.retain(|(first, second, cached_category), _| {
            *cached_category != category || (first != owner && second != owner)
        });
    }

    /// Number of cached pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Report whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoteWriteObserver for SimilarityCache {
    fn note_written(&self, owner: &UserId, category: Category) {
        self.invalidate(owner, category);
    }
}
