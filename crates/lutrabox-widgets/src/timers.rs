//! Cooldown deadlines per region.
//!
//! The host asks for expired deadlines with the current instant and feeds
//! each one back as [`PageEvent::CooldownElapsed`](crate::PageEvent).

use std::collections::HashMap;
use std::time::Instant;

/// Pending cooldowns keyed by region id.
#[derive(Debug, Default)]
pub struct CooldownTimers {
    pending: HashMap<String, Instant>,
}

impl CooldownTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deadline. A later schedule for the same region replaces it.
    pub fn schedule(&mut self, region: impl Into<String>, deadline: Instant) {
        self.pending.insert(region.into(), deadline);
    }

    /// Remove and return the regions whose deadline is at or before `now`,
    /// earliest first.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<String> {
        let mut ready: Vec<(String, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(region, deadline)| (region.clone(), *deadline))
            .collect();
        ready.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        for (region, _) in &ready {
            self.pending.remove(region);
        }
        ready.into_iter().map(|(region, _)| region).collect()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
