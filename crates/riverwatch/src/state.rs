//! Authoritative per-output and per-seat state.
//!
//! The [`OutputTable`] is mutated only on the dispatch thread (single-writer
//! discipline, so no locking here); consumers observe it through cloned
//! [`StatusSnapshot`]s published behind a lock by the client.
//!
//! Every `apply_*` method decodes one wire event, updates the table, and
//! returns the [`StatusEvent`] to publish. Events addressed to an output
//! that is unknown or already removed return `None` and are dropped.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::event::StatusEvent;
use crate::tags::{decode_tags, decode_view_tags};

/// State of one live output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputState {
    /// Registry name of the `wl_output` global; unique while the output lives.
    pub id: u32,
    /// Connector name (e.g. `DP-1`) once advertised by the output.
    pub name: Option<String>,
    /// Tags currently focused on this output, sorted ascending.
    pub focused_tags: Vec<u8>,
    /// Union of tags occupied by this output's views, sorted ascending.
    pub view_tags: Vec<u8>,
    /// Tags with at least one urgent view, sorted ascending. Stays empty on
    /// compositors that predate the urgent_tags protocol event.
    pub urgent_tags: Vec<u8>,
}

/// State of the tracked seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatState {
    /// Title of the focused view; empty when no view is focused.
    pub active_window_title: String,
    /// Registry name of the output the seat currently focuses, if known.
    pub focused_output: Option<u32>,
}

/// Immutable view of the whole table, cheap to clone around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Live outputs keyed by registry name.
    pub outputs: BTreeMap<u32, OutputState>,
    /// The tracked seat.
    pub seat: SeatState,
}

/// Single-writer table of all protocol state.
#[derive(Debug, Default)]
pub struct OutputTable {
    outputs: BTreeMap<u32, OutputState>,
    seat: SeatState,
}

impl OutputTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure an entry exists for `id`; tag sets start empty.
    pub fn upsert(&mut self, id: u32) -> &mut OutputState {
        self.outputs.entry(id).or_insert_with(|| {
            trace!("tracking output {}", id);
            OutputState {
                id,
                ..OutputState::default()
            }
        })
    }

    /// Record the connector name advertised by an output.
    pub fn set_output_name(&mut self, id: u32, name: String) {
        if let Some(output) = self.outputs.get_mut(&id) {
            output.name = Some(name);
        }
    }

    /// Drop the entry for `id`, returning the removal event if it was live.
    pub fn remove(&mut self, id: u32) -> Option<StatusEvent> {
        if self.outputs.remove(&id).is_some() {
            debug!("output {} removed", id);
            if self.seat.focused_output == Some(id) {
                self.seat.focused_output = None;
            }
            Some(StatusEvent::OutputRemoved { output_id: id })
        } else {
            None
        }
    }

    /// Look up a live output.
    pub fn get(&self, id: u32) -> Option<&OutputState> {
        self.outputs.get(&id)
    }

    /// Registry names of all live outputs, ascending.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.outputs.keys().copied()
    }

    /// The tracked seat.
    pub fn seat(&self) -> &SeatState {
        &self.seat
    }

    /// Decode and store a `focused_tags` bitfield for `id`.
    pub fn apply_focused_tags(&mut self, id: u32, bits: u32) -> Option<StatusEvent> {
        let output = self.outputs.get_mut(&id)?;
        let tags = decode_tags(bits);
        output.focused_tags = tags.clone();
        Some(StatusEvent::FocusedTagsChanged {
            output_id: id,
            tags,
        })
    }

    /// Decode and store a `view_tags` payload for `id`.
    pub fn apply_view_tags(&mut self, id: u32, raw: &[u8]) -> Option<StatusEvent> {
        let output = self.outputs.get_mut(&id)?;
        let tags = decode_view_tags(raw);
        output.view_tags = tags.clone();
        Some(StatusEvent::ViewTagsChanged {
            output_id: id,
            tags,
        })
    }

    /// Decode and store an `urgent_tags` bitfield for `id`.
    pub fn apply_urgent_tags(&mut self, id: u32, bits: u32) -> Option<StatusEvent> {
        let output = self.outputs.get_mut(&id)?;
        let tags = decode_tags(bits);
        output.urgent_tags = tags.clone();
        Some(StatusEvent::UrgentTagsChanged {
            output_id: id,
            tags,
        })
    }

    /// Store the focused view title from the seat status.
    pub fn apply_focused_view(&mut self, title: String) -> StatusEvent {
        self.seat.active_window_title = title.clone();
        StatusEvent::ActiveWindowChanged { title }
    }

    /// Track which output the seat focuses. No client event is published
    /// for this; it is observable through snapshots.
    pub fn set_focused_output(&mut self, id: Option<u32>) {
        self.seat.focused_output = id;
    }

    /// Clone the whole table for cross-thread consumption.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            outputs: self.outputs.clone(),
            seat: self.seat.clone(),
        }
    }
}
