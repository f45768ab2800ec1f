//! Typed events published by the status client.
//!
//! Every state change decoded from the wire is republished as exactly one
//! [`StatusEvent`]. The enum is closed, so consumers handle every event kind
//! exhaustively at compile time instead of poking at untyped payloads.

/// A decoded state change, ready for consumer delivery.
///
/// Tag lists are always sorted ascending, deduplicated, and contain only
/// indices in `0..=31`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Initial discovery and binding completed; snapshots are now populated.
    /// Published exactly once per successful connection lifecycle.
    Ready,
    /// The set of focused tags on an output changed.
    FocusedTagsChanged { output_id: u32, tags: Vec<u8> },
    /// The union of tags occupied by views on an output changed.
    ViewTagsChanged { output_id: u32, tags: Vec<u8> },
    /// The set of tags with at least one urgent view changed.
    UrgentTagsChanged { output_id: u32, tags: Vec<u8> },
    /// The focused view's title changed. An empty title means no view is
    /// focused.
    ActiveWindowChanged { title: String },
    /// The compositor retracted an output; its state has been dropped.
    OutputRemoved { output_id: u32 },
}

impl StatusEvent {
    /// The kind discriminant, for filtering.
    pub fn kind(&self) -> EventKind {
        match self {
            StatusEvent::Ready => EventKind::Ready,
            StatusEvent::FocusedTagsChanged { .. } => EventKind::FocusedTags,
            StatusEvent::ViewTagsChanged { .. } => EventKind::ViewTags,
            StatusEvent::UrgentTagsChanged { .. } => EventKind::UrgentTags,
            StatusEvent::ActiveWindowChanged { .. } => EventKind::ActiveWindow,
            StatusEvent::OutputRemoved { .. } => EventKind::OutputRemoved,
        }
    }

    /// The output this event concerns, if it is output-scoped.
    pub fn output_id(&self) -> Option<u32> {
        match self {
            StatusEvent::FocusedTagsChanged { output_id, .. }
            | StatusEvent::ViewTagsChanged { output_id, .. }
            | StatusEvent::UrgentTagsChanged { output_id, .. }
            | StatusEvent::OutputRemoved { output_id } => Some(*output_id),
            StatusEvent::Ready | StatusEvent::ActiveWindowChanged { .. } => None,
        }
    }
}

/// Event kind discriminant used by [`EventFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    FocusedTags,
    ViewTags,
    UrgentTags,
    ActiveWindow,
    OutputRemoved,
}

/// Subscription filter: by kind, by output id, both, or neither (all events).
///
/// An output-scoped filter only ever matches output-scoped events; `Ready`
/// and `ActiveWindowChanged` carry no output id and are excluded by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFilter {
    kind: Option<EventKind>,
    output: Option<u32>,
}

impl EventFilter {
    /// Match every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match events of one kind.
    pub fn kind(kind: EventKind) -> Self {
        Self {
            kind: Some(kind),
            output: None,
        }
    }

    /// Match events scoped to one output.
    pub fn output(output_id: u32) -> Self {
        Self {
            kind: None,
            output: Some(output_id),
        }
    }

    /// Narrow this filter to one output.
    pub fn for_output(mut self, output_id: u32) -> Self {
        self.output = Some(output_id);
        self
    }

    /// Whether `event` passes this filter.
    pub fn matches(&self, event: &StatusEvent) -> bool {
        if let Some(kind) = self.kind
            && event.kind() != kind
        {
            return false;
        }
        if let Some(output) = self.output
            && event.output_id() != Some(output)
        {
            return false;
        }
        true
    }
}
