// Per-ship "busy until" times learned from cooldowns and transit arrivals
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ReadinessCache {
    ready_times: HashMap<String, DateTime<Utc>>,
}

impl ReadinessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest time the ship is known to be free again. Elapsed entries are
    /// dropped on read, so this never returns a time in the past.
    pub fn get(&mut self, ship_symbol: &str) -> Option<DateTime<Utc>> {
        self.get_at(ship_symbol, Utc::now())
    }

    pub fn get_at(&mut self, ship_symbol: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let ready_at = *self.ready_times.get(ship_symbol)?;
        if ready_at <= now {
            self.ready_times.remove(ship_symbol);
            debug!("🗑️ Readiness for {} elapsed at {}", ship_symbol, ready_at.format("%H:%M:%S UTC"));
            return None;
        }
        Some(ready_at)
    }

    pub fn set(&mut self, ship_symbol: &str, ready_at: DateTime<Utc>) {
        debug!("💾 {} busy until {}", ship_symbol, ready_at.format("%H:%M:%S UTC"));
        self.ready_times.insert(ship_symbol.to_string(), ready_at);
    }

    pub fn clear(&mut self, ship_symbol: &str) {
        self.ready_times.remove(ship_symbol);
    }

    /// Ships still busy at `now`, soonest first
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<(String, DateTime<Utc>)> {
        let mut active: Vec<(String, DateTime<Utc>)> = self
            .ready_times
            .iter()
            .filter(|(_, ready_at)| **ready_at > now)
            .map(|(ship, ready_at)| (ship.clone(), *ready_at))
            .collect();
        active.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        active
    }

    pub fn len(&self) -> usize {
        self.ready_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready_times.is_empty()
    }
}
