use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::clocking::ClockingScheme;
use crate::coord::{Dimensions, Topology};
use crate::layout::GateLayout;

/// Identifies one logical layout owner.
pub type SessionId = Uuid;

struct Entry {
    layout: GateLayout,
    last_touch: Instant,
}

/// Session-scoped layout service: one layout per session key,
/// created on first use and evicted explicitly or after idling.
///
/// The store hands out one mutable borrow at a time, which is how the
/// single-writer contract of `GateLayout` is upheld: callers serialize
/// access per session key through this service.
pub struct LayoutStore {
    default_dimensions: Dimensions,
    default_topology: Topology,
    default_clocking: ClockingScheme,
    entries: HashMap<SessionId, Entry>,
}

impl LayoutStore {
    pub fn new(
        default_dimensions: Dimensions,
        default_topology: Topology,
        default_clocking: ClockingScheme,
    ) -> Self {
        Self {
            default_dimensions,
            default_topology,
            default_clocking,
            entries: HashMap::new(),
        }
    }

    pub fn new_session(&self) -> SessionId {
        Uuid::new_v4()
    }

    /// Fetch the session's layout, creating a fresh one with the
    /// store's defaults on first use. Touches the idle timer.
    pub fn get_or_create(&mut self, id: SessionId) -> &mut GateLayout {
        let entry = self.entries.entry(id).or_insert_with(|| {
            log::info!("creating layout for session {id}");
            Entry {
                layout: GateLayout::new(
                    self.default_dimensions,
                    self.default_topology,
                    self.default_clocking,
                ),
                last_touch: Instant::now(),
            }
        });
        entry.last_touch = Instant::now();
        &mut entry.layout
    }

    pub fn get(&self, id: &SessionId) -> Option<&GateLayout> {
        self.entries.get(id).map(|e| &e.layout)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut GateLayout> {
        self.entries.get_mut(id).map(|e| {
            e.last_touch = Instant::now();
            &mut e.layout
        })
    }

    /// Replace the session's layout wholesale, e.g. after an import.
    pub fn replace(&mut self, id: SessionId, layout: GateLayout) {
        self.entries.insert(
            id,
            Entry {
                layout,
                last_touch: Instant::now(),
            },
        );
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<GateLayout> {
        self.entries.remove(id).map(|e| e.layout)
    }

    /// Drop every session idle for longer than `max_idle`. Returns the
    /// number of evicted sessions.
    pub fn evict_idle(&mut self, max_idle: Duration) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries
            .retain(|_, e| now.duration_since(e.last_touch) <= max_idle);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::info!("evicted {evicted} idle session(s)");
        }
        evicted
    }

    pub fn session_count(&self) -> usize {
        self.entries.len()
    }
}
