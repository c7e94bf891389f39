pub mod driver;

use crate::config::Config;
use crate::creature::{Creature, TickReport};
use crate::error::SimError;
use crate::persistence::PersistedRecord;
use crate::stats::{ActionView, CreatureMetrics};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// The live creature plus the bookkeeping of the running session.
///
/// Shared as `Arc<RwLock<SimulationState>>`; every mutation goes through the write lock.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub creature: Creature,
    pub tick: u64,
    events: VecDeque<String>,
    event_log_len: usize,
    action_bar_slots: usize,
}

impl SimulationState {
    pub fn new(creature: Creature, config: &Config) -> Self {
        Self {
            creature,
            tick: 0,
            events: VecDeque::new(),
            event_log_len: config.simulation.event_log_len,
            action_bar_slots: config.simulation.action_bar_slots,
        }
    }

    pub fn tick(&mut self, config: &Config) -> TickReport {
        let report = self.creature.tick();
        self.tick += 1;

        let interval = config.simulation.snapshot_interval_ticks;
        if interval > 0 && self.tick % interval == 0 {
            self.creature.snapshot();
        }

        for event in &report.events {
            log::debug!("{}", event);
            self.push_event(event.clone());
        }
        if let Some(stage) = report.promoted_to {
            self.push_event(format!("{} is now {}", self.creature.name(), stage));
        }

        report
    }

    pub fn apply_action(&mut self, slot: usize) -> Result<String, SimError> {
        let outcome = self.creature.apply_action(slot)?;
        log::info!("{}", outcome);
        self.push_event(outcome.clone());
        Ok(outcome)
    }

    pub fn metrics(&self) -> CreatureMetrics {
        CreatureMetrics::compute(self.tick, &self.creature)
    }

    pub fn action_bar(&self) -> Vec<ActionView> {
        self.creature
            .action_bar(self.action_bar_slots)
            .into_iter()
            .enumerate()
            .map(|(slot, action)| ActionView::from_action(slot, action))
            .collect()
    }

    /// Most recent messages, oldest first.
    pub fn recent_events(&self) -> Vec<String> {
        self.events.iter().cloned().collect()
    }

    pub fn record(&self, now: DateTime<Utc>) -> PersistedRecord {
        self.creature.to_persisted_record(now)
    }

    fn push_event(&mut self, event: String) {
        if self.event_log_len == 0 {
            return;
        }
        while self.events.len() >= self.event_log_len {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
