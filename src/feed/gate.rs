// src/feed/gate.rs
// Concurrency guard: at most one outstanding fetch, none once exhausted.

/// Serializes "fetch next page" requests.
///
/// Viewport visibility events fire repeatedly and in rapid succession
/// (scroll jitter, resizes); without this gate the same page would be
/// requested several times and merged out of order. The aggregator updates
/// the gate and the accumulator inside one critical section, so a trigger
/// arriving exactly at completion cannot slip in a double fetch.
#[derive(Debug, Default)]
pub struct FetchGate {
    in_flight: bool,
    exhausted: bool,
}

impl FetchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the single fetch slot. Returns false (and the caller
    /// must not fetch) while a fetch is outstanding or the feed is settled.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight || self.exhausted {
            tracing::debug!(
                in_flight = self.in_flight,
                exhausted = self.exhausted,
                "Suppressed fetch trigger"
            );
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the slot after the fetch completed, success or failure.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    /// Mirror the accumulator's settled determination.
    pub fn set_exhausted(&mut self, exhausted: bool) {
        self.exhausted = exhausted;
    }

    /// Reopen for a new epoch.
    pub fn reset(&mut self) {
        self.in_flight = false;
        self.exhausted = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }
}
