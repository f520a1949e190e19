//! In-memory store implementations and note fixtures used by unit and
//! behaviour tests across the workspace.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    Category, GourmetFriendPin, Note, NoteExtension, NoteStore, PinStore, Rating, StoreError,
    UserId, VenueId,
};

/// Fixed instant all fixture timestamps are offset from.
pub fn fixture_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Build a note `minutes` after [`fixture_epoch`].
///
/// # Panics
/// Panics when `rating` is outside `1..=10`.
pub fn note_at(
    id: &str,
    owner: &str,
    rating: u8,
    minutes: i64,
    extension: NoteExtension,
) -> Note {
    Note {
        id: id.into(),
        owner_id: owner.into(),
        rating: Rating::new(rating).expect("fixture rating must be within 1..=10"),
        experienced_at: fixture_epoch() + Duration::minutes(minutes),
        extension,
    }
}

/// Restaurant extension for a dish, optionally at a venue.
pub fn dish(name: &str, venue: Option<&str>) -> NoteExtension {
    NoteExtension::Restaurant {
        dish_name: name.to_owned(),
        venue_id: venue.map(VenueId::from),
    }
}

/// Wine extension.
pub fn wine(name: &str, vintage: Option<u16>) -> NoteExtension {
    NoteExtension::Wine {
        wine_name: name.to_owned(),
        vintage,
    }
}

/// Spirit extension.
pub fn spirit(name: &str) -> NoteExtension {
    NoteExtension::Spirit {
        spirit_name: name.to_owned(),
    }
}

/// Build one restaurant note per `(dish, rating)` pair for `owner`.
///
/// Note ids are `{owner}-{index}` and timestamps increase with the index.
pub fn dishes_for(owner: &str, ratings: &[(&str, u8)]) -> Vec<Note> {
    ratings
        .iter()
        .zip(0_i64..)
        .map(|((name, rating), index)| {
            note_at(
                &format!("{owner}-{index}"),
                owner,
                *rating,
                index,
                dish(name, None),
            )
        })
        .collect()
}

/// In-memory [`NoteStore`].
///
/// Users can be marked unavailable to simulate upstream failures.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RwLock<Vec<Note>>,
    unavailable: RwLock<BTreeSet<UserId>>,
    fetches: AtomicUsize,
}

impl MemoryNoteStore {
    /// Create a store holding the given notes.
    pub fn with_notes<I>(notes: I) -> Self
    where
        I: IntoIterator<Item = Note>,
    {
        Self {
            notes: RwLock::new(notes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Add or replace a note by id.
    pub fn upsert(&self, note: Note) {
        let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
        notes.retain(|existing| existing.id != note.id);
        notes.push(note);
    }

    /// Make every fetch for `user` fail.
    pub fn mark_unavailable(&self, user: &str) {
        self.unavailable
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.into());
    }

    /// Number of `notes_for` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored note.
    pub fn all_notes(&self) -> Vec<Note> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_unavailable(&self, user: &UserId) -> bool {
        self.unavailable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(user)
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn notes_for(&self, owner: &UserId, category: Category) -> Result<Vec<Note>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.is_unavailable(owner) {
            return Err(StoreError::Backend {
                operation: "load notes",
                message: format!("notes for {owner} are unavailable"),
            });
        }
        let notes = self.notes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(notes
            .iter()
            .filter(|note| &note.owner_id == owner && note.category() == category)
            .cloned()
            .collect())
    }

    async fn authors(&self) -> Result<Vec<UserId>, StoreError> {
        let notes = self.notes.read().unwrap_or_else(PoisonError::into_inner);
        let authors: BTreeSet<UserId> = notes.iter().map(|note| note.owner_id.clone()).collect();
        Ok(authors.into_iter().collect())
    }
}

/// In-memory [`PinStore`] keyed by `(pinner, pinned)`.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    pins: Mutex<BTreeMap<(UserId, UserId), GourmetFriendPin>>,
    writes: AtomicUsize,
    failing: RwLock<bool>,
}

impl MemoryPinStore {
    /// Create a store holding the given pins.
    pub fn with_pins<I>(pins: I) -> Self
    where
        I: IntoIterator<Item = GourmetFriendPin>,
    {
        let pins = pins
            .into_iter()
            .map(|pin| ((pin.pinner_id.clone(), pin.pinned_id.clone()), pin))
            .collect();
        Self {
            pins: Mutex::new(pins),
            ..Self::default()
        }
    }

    /// Number of mutating calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail.
    pub fn fail_all(&self) {
        *self.failing.write().unwrap_or_else(PoisonError::into_inner) = true;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.failing.read().unwrap_or_else(PoisonError::into_inner) {
            return Err(StoreError::Backend {
                operation: "access pins",
                message: "pin store unavailable".to_owned(),
            });
        }
        Ok(())
    }

    fn key(pinner: &UserId, pinned: &UserId) -> (UserId, UserId) {
        (pinner.clone(), pinned.clone())
    }
}

#[async_trait]
impl PinStore for MemoryPinStore {
    async fn find_pin(
        &self,
        pinner: &UserId,
        pinned: &UserId,
    ) -> Result<Option<GourmetFriendPin>, StoreError> {
        self.check_available()?;
        let pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(pins.get(&Self::key(pinner, pinned)).cloned())
    }

    async fn pins_by(&self, pinner: &UserId) -> Result<Vec<GourmetFriendPin>, StoreError> {
        self.check_available()?;
        let pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(pins
            .values()
            .filter(|pin| &pin.pinner_id == pinner)
            .cloned()
            .collect())
    }

    async fn upsert_pin(&self, pin: GourmetFriendPin) -> Result<GourmetFriendPin, StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        let key = Self::key(&pin.pinner_id, &pin.pinned_id);
        let stored = match pins.remove(&key) {
            Some(mut existing) => {
                existing.merge_categories(pin.categories);
                existing
            }
            None => pin,
        };
        pins.insert(key, stored.clone());
        Ok(stored)
    }

    async fn remove_pin(&self, pinner: &UserId, pinned: &UserId) -> Result<bool, StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(pins.remove(&Self::key(pinner, pinned)).is_some())
    }

    async fn remove_category(
        &self,
        pinner: &UserId,
        pinned: &UserId,
        category: Category,
    ) -> Result<Option<GourmetFriendPin>, StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut pins = self.pins.lock().unwrap_or_else(PoisonError::into_inner);
        let key = Self::key(pinner, pinned);
        let Some(mut pin) = pins.remove(&key) else {
            return Ok(None);
        };
        pin.categories.remove(&category);
        if pin.categories.is_empty() {
            return Ok(None);
        }
        pins.insert(key, pin.clone());
        Ok(Some(pin))
    }
}
