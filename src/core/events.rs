//! Change notifications published by the timeline.
//! Observers subscribe and receive events over crossbeam channels.

use crossbeam::channel::{self, Receiver, Sender};

use crate::core::clip::ClipId;
use crate::core::time::Seconds;

/// Something about the timeline changed
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    ClipAdded(ClipId),
    ClipRemoved(ClipId),
    ClipChanged(ClipId),
    PlayheadMoved(Seconds),
    SelectionChanged,
    /// Two-click cut state changed: `Some(time)` when an anchor is pending
    CutAnchorChanged(Option<Seconds>),
    Cleared,
}

/// Fan-out of timeline events to any number of subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<Sender<TimelineEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer
    pub fn subscribe(&mut self) -> Receiver<TimelineEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: TimelineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// A cloned timeline starts without observers.
impl Clone for EventHub {
    fn clone(&self) -> Self {
        Self::default()
    }
}
