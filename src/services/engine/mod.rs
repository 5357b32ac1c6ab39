//! ROI engine: frame processing and lost-track reconciliation
//!
//! One engine instance owns the zone registry and track-state store for a
//! single camera. It is synchronous and single-threaded: the driver loop
//! calls `process_frame` once per video frame and hands the returned events
//! to whatever publishes them. Separate cameras get separate instances.


use crate::domain::event::{RoiEvent, RoiEventKind};
use crate::domain::geometry;
use crate::domain::types::{Detection, TrackId};
use crate::infra::clock::{Clock, SystemClock};
use crate::services::registry::ZoneRegistry;
use crate::services::store::TrackStateStore;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How long a track may be absent from the detection stream before a
/// lost-exit is synthesized; shorter gaps are treated as frame drops
pub const DEFAULT_LOST_TOLERANCE: Duration = Duration::from_secs(1);

/// Per-camera region-of-interest engine
pub struct RoiEngine {
    registry: ZoneRegistry,
    store: TrackStateStore,
    clock: Arc<dyn Clock>,
    lost_tolerance: Duration,
}

impl RoiEngine {
    /// Create an engine over a prepared registry, using real time
    pub fn new(registry: ZoneRegistry) -> Self {
        Self::with_clock(registry, Arc::new(SystemClock::new()))
    }

    /// Create an engine with an injected clock (tests, replays)
    pub fn with_clock(registry: ZoneRegistry, clock: Arc<dyn Clock>) -> Self {
        Self { registry, store: TrackStateStore::new(), clock, lost_tolerance: DEFAULT_LOST_TOLERANCE }
    }

    pub fn with_lost_tolerance(mut self, tolerance: Duration) -> Self {
        self.lost_tolerance = tolerance;
        self
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ZoneRegistry {
        &mut self.registry
    }

    /// Process one frame's detections against all active zones
    ///
    /// Returns the events generated this frame: enters/exits/dwell crossings
    /// in detection order x zone iteration order, then lost-exits from the
    /// reaper. The engine retains none of them.
    pub fn process_frame(&mut self, detections: &[Detection]) -> Vec<RoiEvent> {
        let now = self.clock.monotonic();
        let wall = self.clock.wall();

        let mut events = Vec::new();
        let mut seen: FxHashSet<TrackId> = FxHashSet::default();

        let registry = &self.registry;
        let store = &mut self.store;

        for det in detections {
            // Detections without a stable identity never touch zone state
            if !det.track_id.is_tracked() {
                continue;
            }
            seen.insert(det.track_id);

            for zone in registry.active_zones() {
                let point = geometry::reference_point(&det.bbox, zone.reference_point);
                let inside = zone.contains(point);
                let state = store.get_or_create(det.track_id, &zone.id);

                match (state.is_inside, inside) {
                    (false, true) => {
                        state.is_inside = true;
                        state.entered_at = Some(now);
                        state.last_seen_at = Some(now);
                        state.dwell_emitted = false;
                        state.confidence = det.confidence;
                        state.bbox = det.bbox;

                        events.push(RoiEvent::new(
                            RoiEventKind::Enter,
                            zone,
                            det.track_id,
                            det.confidence,
                            det.bbox,
                            wall,
                            0.0,
                        ));
                        info!(
                            track_id = %det.track_id,
                            zone_id = %zone.id,
                            aisle_id = %zone.aisle_id,
                            "zone_enter"
                        );
                    }
                    (true, true) => {
                        state.last_seen_at = Some(now);
                        state.confidence = det.confidence;
                        state.bbox = det.bbox;

                        // Fire the dwell event exactly once per continuous
                        // inside-interval; the flag is cleared on exit.
                        if let Some(threshold) = registry.dwell_threshold(&zone.id) {
                            let dwell = state.dwell(now);
                            if !state.dwell_emitted && dwell >= threshold {
                                state.dwell_emitted = true;
                                events.push(RoiEvent::new(
                                    RoiEventKind::DwellThreshold,
                                    zone,
                                    det.track_id,
                                    det.confidence,
                                    det.bbox,
                                    wall,
                                    dwell.as_secs_f64(),
                                ));
                                info!(
                                    track_id = %det.track_id,
                                    zone_id = %zone.id,
                                    dwell_sec = %dwell.as_secs_f64(),
                                    threshold_sec = %threshold.as_secs_f64(),
                                    "dwell_threshold"
                                );
                            }
                        }
                    }
                    (true, false) => {
                        let dwell = state.dwell(now);
                        state.is_inside = false;
                        state.entered_at = None;
                        state.last_seen_at = None;
                        state.dwell_emitted = false;

                        // State entry is retained for cheap re-entry
                        events.push(RoiEvent::new(
                            RoiEventKind::Exit,
                            zone,
                            det.track_id,
                            det.confidence,
                            det.bbox,
                            wall,
                            dwell.as_secs_f64(),
                        ));
                        info!(
                            track_id = %det.track_id,
                            zone_id = %zone.id,
                            dwell_sec = %dwell.as_secs_f64(),
                            "zone_exit"
                        );
                    }
                    (false, false) => {}
                }
            }
        }

        self.reap_lost_tracks(&seen, now, &mut events);

        events
    }

    /// Synthesize exits for tracks that vanished from the detection stream
    ///
    /// A track still marked inside whose absence exceeds the lost tolerance
    /// gets an exit built from its cached payload; its state entry is then
    /// deleted, unlike a normal exit. Stale states whose zone is gone from
    /// the registry are dropped without an event.
    fn reap_lost_tracks(
        &mut self,
        seen: &FxHashSet<TrackId>,
        now: Duration,
        events: &mut Vec<RoiEvent>,
    ) {
        let wall = self.clock.wall();

        let stale: Vec<(TrackId, String)> = self
            .store
            .iter()
            .filter(|state| state.is_inside && !seen.contains(&state.track_id))
            .filter(|state| match state.last_seen_at {
                Some(last_seen) => now.saturating_sub(last_seen) >= self.lost_tolerance,
                None => true,
            })
            .map(|state| (state.track_id, state.zone_id.clone()))
            .collect();

        for (track_id, zone_id) in stale {
            let Some(state) = self.store.remove(track_id, &zone_id) else {
                continue;
            };
            let Some(zone) = self.registry.get(&zone_id) else {
                debug!(track_id = %track_id, zone_id = %zone_id, "stale_state_dropped");
                continue;
            };

            let dwell = state.dwell(now);
            events.push(RoiEvent::new(
                RoiEventKind::Exit,
                zone,
                track_id,
                state.confidence,
                state.bbox,
                wall,
                dwell.as_secs_f64(),
            ));
            info!(
                track_id = %track_id,
                zone_id = %zone_id,
                dwell_sec = %dwell.as_secs_f64(),
                "zone_exit_lost"
            );
        }
    }

    /// Whether a track is currently classified inside a zone
    pub fn is_track_inside(&self, track_id: TrackId, zone_id: &str) -> bool {
        self.store.get(track_id, zone_id).map(|s| s.is_inside).unwrap_or(false)
    }

    /// Current dwell in seconds for a pair, 0.0 when no state exists
    pub fn current_dwell(&self, track_id: TrackId, zone_id: &str) -> f64 {
        match self.store.get(track_id, zone_id) {
            Some(state) => state.dwell(self.clock.monotonic()).as_secs_f64(),
            None => 0.0,
        }
    }

    /// Number of live (track, zone) state entries
    pub fn state_count(&self) -> usize {
        self.store.len()
    }

    /// Clear all track states; zones and thresholds survive
    pub fn reset(&mut self) {
        self.store.clear();
        info!("track_states_reset");
    }

    /// Clear zones, thresholds, and track states
    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.store.clear();
        info!("engine_cleared");
    }
}
