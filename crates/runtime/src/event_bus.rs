use std::collections::VecDeque;

use crate::frame::Frame;

/// What happened, for the activity log shown next to the globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    FetchStarted,
    SnapshotApplied,
    FetchFailed,
    FetchSuperseded,
    FeatureFocused,
    Unmounted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::FetchStarted => "fetch_started",
            EventKind::SnapshotApplied => "snapshot_applied",
            EventKind::FetchFailed => "fetch_failed",
            EventKind::FetchSuperseded => "fetch_superseded",
            EventKind::FeatureFocused => "feature_focused",
            EventKind::Unmounted => "unmounted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Bounded event log. Oldest entries are dropped once `capacity` is reached.
#[derive(Debug)]
pub struct EventBus {
    capacity: usize,
    events: VecDeque<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: VecDeque::new(),
        }
    }

    pub fn emit(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventKind};
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        let f = Frame::first(0.1).next(0.1).next(0.1);
        bus.emit(f, EventKind::SnapshotApplied, "12 markers");
        let events: Vec<_> = bus.events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].frame_index, 2);
        assert_eq!(events[0].kind.as_str(), "snapshot_applied");
    }

    #[test]
    fn drops_oldest_past_capacity() {
        let mut bus = EventBus::with_capacity(2);
        let f = Frame::first(0.1);
        bus.emit(f, EventKind::FetchStarted, "a");
        bus.emit(f, EventKind::FetchFailed, "b");
        bus.emit(f, EventKind::FetchStarted, "c");
        let msgs: Vec<_> = bus.events().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec!["b", "c"]);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(Frame::first(1.0), EventKind::Unmounted, "m");
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.is_empty());
    }
}
