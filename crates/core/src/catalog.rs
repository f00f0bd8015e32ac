//! Track catalog: the producer-curated set of sellable items.
//!
//! Ids are dense and allocation-ordered, so the backing store is a
//! `Vec<Track>` indexed by id. Deleting a track resets its slot to the
//! vacant value but never frees the id; existence checks are therefore
//! allocation-based (`id < next_id`), not liveness-based. The
//! [`TrackStatus`] tag records liveness separately so a reader can tell
//! a real track from a vacated slot.

use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::types::TrackId;

/// Hard ceiling on the `end` argument to [`Catalog::list`], independent
/// of how many tracks actually exist.
pub const PAGINATION_CEILING: u64 = 100;

/// Liveness tag for a catalog slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    Live,
    Deleted,
}

/// One sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Asking price. Authoritative for new purchase requests only; each
    /// transaction snapshots it at request time.
    pub price: u64,
    pub status: TrackStatus,
}

impl Track {
    /// The empty/zero value returned for ids that were never allocated
    /// or whose slot was vacated by [`Catalog::delete`].
    pub fn vacant() -> Self {
        Self {
            id: 0,
            title: String::new(),
            artist: String::new(),
            price: 0,
            status: TrackStatus::Deleted,
        }
    }
}

/// In-memory authoritative track store.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Slot `i` holds the track with id `i`, possibly vacated.
    tracks: Vec<Track>,
    /// Next id to allocate. Monotonic, never reused.
    next_id: TrackId,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids allocated so far, deleted ids included.
    pub fn allocated(&self) -> u64 {
        self.next_id
    }

    /// `Ok` iff `id` was ever allocated. Deleted ids pass.
    fn check_allocated(&self, id: TrackId) -> Result<(), MarketError> {
        if id < self.next_id {
            Ok(())
        } else {
            Err(MarketError::NotFound {
                entity: "track",
                id,
            })
        }
    }

    /// Store a new track under the next id and return it.
    ///
    /// No uniqueness constraint on title or artist. The counter
    /// increment and the insert happen together; callers serialize
    /// access so the pair is atomic.
    pub fn add(&mut self, title: String, artist: String, price: u64) -> Track {
        let track = Track {
            id: self.next_id,
            title,
            artist,
            price,
            status: TrackStatus::Live,
        };
        self.tracks.push(track.clone());
        self.next_id += 1;
        track
    }

    /// Replace every field of an allocated track.
    ///
    /// Updating a deleted slot succeeds and brings it back to `Live`;
    /// the allocation-based check does not distinguish deleted ids.
    pub fn update(
        &mut self,
        id: TrackId,
        title: String,
        artist: String,
        price: u64,
    ) -> Result<Track, MarketError> {
        self.check_allocated(id)?;
        let track = Track {
            id,
            title,
            artist,
            price,
            status: TrackStatus::Live,
        };
        self.tracks[id as usize] = track.clone();
        Ok(track)
    }

    /// Vacate an allocated slot.
    ///
    /// Deleting an already-deleted id succeeds and rewrites the vacant
    /// slot; the id itself is never reassigned.
    pub fn delete(&mut self, id: TrackId) -> Result<(), MarketError> {
        self.check_allocated(id)?;
        self.tracks[id as usize] = Track::vacant();
        Ok(())
    }

    /// Point lookup. Never fails: unallocated and deleted ids both
    /// yield [`Track::vacant`]; callers inspect the fields to detect
    /// absence.
    pub fn get(&self, id: TrackId) -> Track {
        self.tracks
            .get(id as usize)
            .cloned()
            .unwrap_or_else(Track::vacant)
    }

    /// List slots with index in `[start, min(end, allocated))`, in id
    /// order. Vacated slots appear as their vacant values.
    ///
    /// The ceiling check runs first: it must fire even on an empty
    /// catalog. `end` past the allocated range is clamped down rather
    /// than rejected.
    pub fn list(&self, start: u64, end: u64) -> Result<Vec<Track>, MarketError> {
        if end >= PAGINATION_CEILING {
            return Err(MarketError::PaginationLimitExceeded(format!(
                "end {end} exceeds the pagination ceiling of {PAGINATION_CEILING}"
            )));
        }
        if start >= self.next_id {
            return Err(MarketError::OutOfRange(format!(
                "start {start} is past the last allocated track id"
            )));
        }
        if start > end {
            return Err(MarketError::OutOfRange(format!(
                "start {start} is greater than end {end}"
            )));
        }
        let end = end.min(self.next_id);
        Ok(self.tracks[start as usize..end as usize].to_vec())
    }
}
