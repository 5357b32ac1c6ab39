//! Transient per-(track, zone) state
//!
//! States are created lazily on first containment check and survive an
//! explicit exit so a quick re-entry reuses the entry. Only the lost-track
//! reaper (or a full reset) deletes them.

use crate::domain::types::{BBox, TrackId};
use rustc_hash::FxHashMap;
use std::time::Duration;

/// State of one track relative to one zone
#[derive(Debug, Clone)]
pub struct TrackState {
    pub track_id: TrackId,
    pub zone_id: String,
    pub is_inside: bool,
    /// Monotonic time of the most recent outside -> inside transition
    pub entered_at: Option<Duration>,
    /// Monotonic time the track was last confirmed inside
    pub last_seen_at: Option<Duration>,
    /// Set once the dwell-threshold event has fired for the current
    /// inside-interval; cleared on exit
    pub dwell_emitted: bool,
    /// Cached for lost-exit payloads
    pub confidence: f64,
    pub bbox: BBox,
}

impl TrackState {
    fn new(track_id: TrackId, zone_id: &str) -> Self {
        Self {
            track_id,
            zone_id: zone_id.to_string(),
            is_inside: false,
            entered_at: None,
            last_seen_at: None,
            dwell_emitted: false,
            confidence: 0.0,
            bbox: BBox::default(),
        }
    }

    /// Continuous dwell duration, floored at zero
    ///
    /// Uses `last_seen_at` when set, otherwise `now`; zero until an entry has
    /// been observed.
    pub fn dwell(&self, now: Duration) -> Duration {
        match self.entered_at {
            Some(entered_at) => self.last_seen_at.unwrap_or(now).saturating_sub(entered_at),
            None => Duration::ZERO,
        }
    }
}

/// Store of track states keyed by (track id, zone id)
#[derive(Default)]
pub struct TrackStateStore {
    states: FxHashMap<(TrackId, String), TrackState>,
}

impl TrackStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the state for a pair, creating an Outside state on first access
    pub fn get_or_create(&mut self, track_id: TrackId, zone_id: &str) -> &mut TrackState {
        self.states
            .entry((track_id, zone_id.to_string()))
            .or_insert_with(|| TrackState::new(track_id, zone_id))
    }

    pub fn get(&self, track_id: TrackId, zone_id: &str) -> Option<&TrackState> {
        self.states.get(&(track_id, zone_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackState> {
        self.states.values()
    }

    pub fn remove(&mut self, track_id: TrackId, zone_id: &str) -> Option<TrackState> {
        self.states.remove(&(track_id, zone_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
