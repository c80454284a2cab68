// src/feed/trigger.rs
// Sentinel visibility -> fetch trigger, with unmounted-sentinel suppression.

use tracing::debug;

use super::state::FeedState;

/// Translates "the sentinel scrolled into view" events into fetch requests.
///
/// The sentinel only exists while the feed shows content with more pages
/// available, so enter events arriving in any other state are dropped here.
/// Collapsing rapid repeat events while a fetch is in flight is the gate's
/// job, not ours.
#[derive(Debug, Default)]
pub struct VisibilityTrigger {
    enter_events: u64,
    forwarded: u64,
}

impl VisibilityTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one enter event given the currently rendered state.
    /// Returns true when the event should reach the gate.
    pub fn on_enter(&mut self, state: FeedState) -> bool {
        self.enter_events += 1;
        if !state.has_more() {
            debug!(
                ?state,
                enter_events = self.enter_events,
                "Sentinel not mounted, ignoring visibility event"
            );
            return false;
        }
        self.forwarded += 1;
        true
    }

    pub fn enter_events(&self) -> u64 {
        self.enter_events
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_with_a_mounted_sentinel() {
        let mut trigger = VisibilityTrigger::new();
        assert!(trigger.on_enter(FeedState::Content { has_more: true }));
        assert!(!trigger.on_enter(FeedState::ContentExhausted));
        assert!(!trigger.on_enter(FeedState::Loading));
        assert!(!trigger.on_enter(FeedState::Error));
        assert!(!trigger.on_enter(FeedState::Empty));
        assert_eq!(trigger.enter_events(), 5);
        assert_eq!(trigger.forwarded(), 1);
    }
}
