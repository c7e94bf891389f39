pub mod action;
pub mod history;
pub mod parameter;

use crate::error::SimError;
use crate::persistence::PersistedRecord;
use crate::species::{Maturity, SpeciesDefinition, StageConfig};
use action::{Action, NO_ACTION};
use chrono::{DateTime, Utc};
use history::{History, StateSnapshot};
use parameter::{Parameter, ParameterKind, Vitals};
use std::fmt;
use std::sync::Arc;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub age: u64,
    /// Messages produced by ambient actions that fired.
    pub events: Vec<String>,
    pub promoted_to: Option<Maturity>,
}

/// Number of whole ticks that fit in `elapsed_hours` of wall-clock time.
pub fn offline_ticks(elapsed_hours: f64, game_days_per_real_hour: f64) -> u64 {
    let days = elapsed_hours * game_days_per_real_hour;
    if days.is_finite() && days > 0.0 {
        days.floor() as u64
    } else {
        0
    }
}

#[derive(Debug, Clone)]
pub struct Creature {
    species: Arc<SpeciesDefinition>,
    name: String,
    age: u64,
    /// Ticks since entering the current stage.
    stage_age: u64,
    maturity: Maturity,
    vitals: Vitals,
    player_actions: Vec<Action>,
    creature_actions: Vec<Action>,
    history: History,
}

impl Creature {
    pub fn new(species: Arc<SpeciesDefinition>, name: impl Into<String>) -> Result<Self, SimError> {
        Self::at_stage(species, name.into(), Maturity::Cub)
    }

    fn at_stage(species: Arc<SpeciesDefinition>, name: String, maturity: Maturity) -> Result<Self, SimError> {
        // Update order always follows the cub declaration, whatever stage we start in.
        let mut vitals = Vitals::from_templates(&species.stage(Maturity::Cub).parameters)?;
        let stage = species.stage(maturity);
        vitals.rebound_to(stage);
        let (player_actions, creature_actions) = stage.materialize_actions();

        Ok(Self {
            species,
            name,
            age: 0,
            stage_age: 0,
            maturity,
            vitals,
            player_actions,
            creature_actions,
            history: History::new(),
        })
    }

    pub fn species(&self) -> &Arc<SpeciesDefinition> {
        &self.species
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn stage_age(&self) -> u64 {
        self.stage_age
    }

    pub fn maturity(&self) -> Maturity {
        self.maturity
    }

    pub fn stage_config(&self) -> &StageConfig {
        self.species.stage(self.maturity)
    }

    pub fn parameter(&self, kind: ParameterKind) -> Option<&Parameter> {
        self.vitals.get(kind)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.vitals.iter()
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn player_actions(&self) -> &[Action] {
        &self.player_actions
    }

    pub fn creature_actions(&self) -> &[Action] {
        &self.creature_actions
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Player actions padded with [`NO_ACTION`] up to `slots` entries.
    pub fn action_bar(&self, slots: usize) -> Vec<&Action> {
        let mut bar: Vec<&Action> = self.player_actions.iter().take(slots).collect();
        bar.resize(slots, &NO_ACTION);
        bar
    }

    /// Runs every parameter's decay rule once. Age and stage are untouched.
    pub fn update(&mut self) {
        let stage = self.species.stage(self.maturity);
        self.vitals.update(stage);
    }

    /// One simulation step: decay, ageing, action timers, then the promotion check.
    pub fn tick(&mut self) -> TickReport {
        self.update();
        self.age += 1;
        self.stage_age += 1;

        for action in &mut self.player_actions {
            action.advance();
        }

        let mut events = Vec::new();
        for action in &mut self.creature_actions {
            if action.advance() {
                let outcome = action.apply(&mut self.vitals);
                events.push(format!("{} {}", self.name, outcome));
            }
        }

        let promoted_to = self.check_promotion();

        TickReport {
            age: self.age,
            events,
            promoted_to,
        }
    }

    /// Runs `ticks` steps and returns the stages entered along the way.
    pub fn advance(&mut self, ticks: u64) -> Vec<Maturity> {
        let mut promotions = Vec::new();
        for _ in 0..ticks {
            let report = self.tick();
            for event in &report.events {
                log::debug!("{}", event);
            }
            promotions.extend(report.promoted_to);
        }
        promotions
    }

    fn check_promotion(&mut self) -> Option<Maturity> {
        let next = self.maturity.next()?;
        if self.stage_age < self.stage_config().days {
            return None;
        }
        self.update_stage(next).then_some(next)
    }

    /// Moves the creature to a later stage: parameters take the new bounds (values kept,
    /// re-clamped) and the action roster is rebuilt from the new stage.
    /// Returns false without touching anything if `next` is not later than the current stage.
    pub fn update_stage(&mut self, next: Maturity) -> bool {
        if next <= self.maturity {
            return false;
        }

        let stage = self.species.stage(next);
        self.vitals.rebound_to(stage);
        let (player_actions, creature_actions) = stage.materialize_actions();
        self.player_actions = player_actions;
        self.creature_actions = creature_actions;
        self.maturity = next;
        self.stage_age = 0;

        log::info!("{} grew up: now {} at age {}", self.name, next, self.age);
        true
    }

    pub fn capture(&self) -> StateSnapshot {
        StateSnapshot::capture(self.age, &self.vitals)
    }

    /// Appends the current state to the history.
    pub fn snapshot(&mut self) {
        let snapshot = self.capture();
        self.history.push(snapshot);
    }

    /// Applies the player action in `slot` and describes the result.
    pub fn apply_action(&mut self, slot: usize) -> Result<String, SimError> {
        let action = self
            .player_actions
            .get_mut(slot)
            .ok_or(SimError::UnknownAction(slot))?;
        if !action.is_enabled() {
            return Err(SimError::ActionUnavailable(action.label().to_string()));
        }

        let outcome = action.apply(&mut self.vitals);
        Ok(format!("{} {}", self.name, outcome))
    }

    pub fn summary(&self) -> String {
        let params: Vec<String> = self
            .vitals
            .iter()
            .map(|p| format!("{} {:.1}/{:.1}", p.kind(), p.value(), p.max()))
            .collect();
        format!(
            "{} the {} ({}, day {}): {}",
            self.name,
            self.species.name(),
            self.maturity,
            self.age,
            params.join(", ")
        )
    }

    pub fn to_persisted_record(&self, now: DateTime<Utc>) -> PersistedRecord {
        let snapshot = self.capture();
        PersistedRecord {
            timestamp: now,
            species: self.species.id().to_string(),
            name: self.name.clone(),
            age: snapshot.age,
            maturity: self.maturity,
            stage_age: self.stage_age,
            params: snapshot.values,
        }
    }

    /// Rebuilds a creature from a saved record and replays the ticks that would have
    /// happened during `elapsed_hours` of downtime.
    pub fn from_persisted_record(
        record: &PersistedRecord,
        species: Arc<SpeciesDefinition>,
        elapsed_hours: f64,
        game_days_per_real_hour: f64,
    ) -> Result<Self, SimError> {
        if record.species != species.id() {
            return Err(SimError::CorruptPersistedState(format!(
                "record is for species {}, not {}",
                record.species,
                species.id()
            )));
        }

        if record.stage_age > record.age {
            return Err(SimError::CorruptPersistedState(format!(
                "stage age {} exceeds age {}",
                record.stage_age, record.age
            )));
        }
        if record.maturity != Maturity::Cub && record.age == 0 {
            return Err(SimError::CorruptPersistedState(format!(
                "{} creature cannot have age 0",
                record.maturity
            )));
        }

        let mut creature = Self::at_stage(species, record.name.clone(), record.maturity)?;
        creature.age = record.age;
        creature.stage_age = record.stage_age;

        let kinds = creature.stage_config().kinds();
        for kind in kinds {
            let value = record.params.get(&kind).copied().ok_or_else(|| {
                SimError::CorruptPersistedState(format!("missing value for {}", kind))
            })?;
            if let Some(param) = creature.vitals.get_mut(kind) {
                param
                    .set_value(value)
                    .map_err(|e| SimError::CorruptPersistedState(e.to_string()))?;
            }
        }
        creature.snapshot();

        let ticks = offline_ticks(elapsed_hours, game_days_per_real_hour);
        if ticks > 0 {
            let promotions = creature.advance(ticks);
            log::info!(
                "Caught up {} ticks for {} ({:.2}h offline, {} promotions)",
                ticks,
                creature.name,
                elapsed_hours,
                promotions.len()
            );
        }

        Ok(creature)
    }
}

impl fmt::Display for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::action::ActionKind;
    use crate::species::SpeciesCatalog;
    use std::collections::BTreeMap;

    fn kitten() -> Creature {
        let catalog = SpeciesCatalog::builtin();
        Creature::new(catalog.get("cat").unwrap(), "Whiskers").unwrap()
    }

    #[test]
    fn test_creature_creation() {
        let creature = kitten();
        assert_eq!(creature.age(), 0);
        assert_eq!(creature.maturity(), Maturity::Cub);
        assert_eq!(creature.parameter(ParameterKind::Health).unwrap().value(), 10.0);
        assert_eq!(creature.parameter(ParameterKind::Satiety).unwrap().range(), (0.0, 25.0));
        assert_eq!(creature.player_actions().len(), 1);
        assert_eq!(creature.creature_actions()[0].kind(), ActionKind::PlayRope);
        assert!(creature.history().is_empty());
    }

    #[test]
    fn test_feed_scenario() {
        let mut creature = kitten();

        creature.update();
        assert_eq!(creature.parameter(ParameterKind::Satiety).unwrap().value(), 4.0);

        let outcome = creature.apply_action(0).unwrap();
        assert_eq!(creature.parameter(ParameterKind::Satiety).unwrap().value(), 24.0);
        assert!(outcome.starts_with("Whiskers eats"));
    }

    #[test]
    fn test_double_update_is_twice_the_step() {
        let mut creature = kitten();
        creature.update();
        creature.update();
        assert_eq!(creature.parameter(ParameterKind::Satiety).unwrap().value(), 3.0);
    }

    #[test]
    fn test_unknown_action_slot() {
        let mut creature = kitten();
        assert!(matches!(creature.apply_action(3), Err(SimError::UnknownAction(3))));
    }

    #[test]
    fn test_action_bar_padding() {
        let creature = kitten();
        let bar = creature.action_bar(4);
        assert_eq!(bar.len(), 4);
        assert_eq!(bar[0].kind(), ActionKind::Feed);
        assert!(bar[1..].iter().all(|a| std::ptr::eq(*a, &NO_ACTION)));
    }

    #[test]
    fn test_promotion_is_stage_relative() {
        let mut creature = kitten();

        creature.advance(3);
        assert_eq!(creature.maturity(), Maturity::Cub);

        let report = creature.tick();
        assert_eq!(report.promoted_to, Some(Maturity::Young));
        assert_eq!(creature.stage_age(), 0);
        assert_eq!(creature.parameter(ParameterKind::Health).unwrap().range(), (0.0, 50.0));

        // Young lasts 10 ticks on its own, not 10 ticks from birth.
        creature.advance(9);
        assert_eq!(creature.maturity(), Maturity::Young);
        creature.tick();
        assert_eq!(creature.maturity(), Maturity::Adult);
        assert_eq!(creature.age(), 14);
    }

    #[test]
    fn test_promotion_regenerates_actions() {
        let mut creature = kitten();
        creature.advance(4);

        let kinds: Vec<ActionKind> = creature.creature_actions().iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![ActionKind::PlayRope, ActionKind::Sleep]);
        assert_eq!(creature.player_actions()[0].amount(), Some(25.0));
    }

    #[test]
    fn test_old_is_terminal() {
        let mut creature = kitten();
        let promotions = creature.advance(4 + 10 + 20 + 12 + 50);
        assert_eq!(promotions, vec![Maturity::Young, Maturity::Adult, Maturity::Old]);
        assert_eq!(creature.maturity(), Maturity::Old);
        assert!(!creature.update_stage(Maturity::Young));
        assert_eq!(creature.maturity(), Maturity::Old);
    }

    #[test]
    fn test_age_and_stage_are_monotonic() {
        let mut creature = kitten();
        let mut last_age = creature.age();
        let mut last_stage = creature.maturity();
        for _ in 0..60 {
            creature.tick();
            assert!(creature.age() > last_age);
            assert!(creature.maturity() >= last_stage);
            last_age = creature.age();
            last_stage = creature.maturity();
        }
    }

    #[test]
    fn test_transition_reclamps_values() {
        let mut creature = kitten();
        creature.advance(4 + 10);
        creature.apply_action(0).unwrap();
        creature.apply_action(0).unwrap();
        assert_eq!(creature.parameter(ParameterKind::Satiety).unwrap().value(), 25.0);

        creature.update_stage(Maturity::Old);
        let satiety = creature.parameter(ParameterKind::Satiety).unwrap();
        assert_eq!(satiety.range(), (0.0, 20.0));
        assert_eq!(satiety.value(), 20.0);
    }

    #[test]
    fn test_ambient_actions_fire_messages() {
        let mut creature = kitten();
        creature.update_stage(Maturity::Old);

        let before = creature.vitals().clone();
        let mut fired = Vec::new();
        for _ in 0..30 {
            fired.extend(creature.tick().events);
        }
        assert_eq!(fired, vec!["Whiskers is sleeping".to_string()]);
        assert_ne!(creature.vitals(), &before);
    }

    #[test]
    fn test_snapshot_appends() {
        let mut creature = kitten();
        for n in 1..=5 {
            creature.tick();
            creature.snapshot();
            assert_eq!(creature.history().len(), n);
        }
        let ages: Vec<u64> = creature.history().iter().map(|s| s.age).collect();
        assert_eq!(ages, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            creature.history().param_history(ParameterKind::Satiety),
            vec![4.0, 3.0, 2.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_offline_ticks() {
        assert_eq!(offline_ticks(4.0, 0.5), 2);
        assert_eq!(offline_ticks(3.0, 0.5), 1);
        assert_eq!(offline_ticks(-5.0, 0.5), 0);
        assert_eq!(offline_ticks(f64::NAN, 0.5), 0);
    }

    #[test]
    fn test_catch_up_batch_equals_stepwise() {
        let creature = kitten();
        let record = creature.to_persisted_record(Utc::now());
        let species = creature.species().clone();

        let batch = Creature::from_persisted_record(&record, species.clone(), 4.0, 0.5).unwrap();
        let mut stepwise = Creature::from_persisted_record(&record, species, 0.0, 0.5).unwrap();
        stepwise.tick();
        stepwise.tick();

        assert_eq!(batch.age(), 2);
        assert_eq!(batch.age(), stepwise.age());
        assert_eq!(batch.vitals(), stepwise.vitals());
        assert_eq!(batch.parameter(ParameterKind::Satiety).unwrap().value(), 3.0);
    }

    #[test]
    fn test_catch_up_crosses_stages() {
        let creature = kitten();
        let record = creature.to_persisted_record(Utc::now());

        let restored =
            Creature::from_persisted_record(&record, creature.species().clone(), 30.0, 0.5).unwrap();
        assert_eq!(restored.age(), 15);
        assert_eq!(restored.maturity(), Maturity::Adult);
        assert_eq!(restored.stage_age(), 1);
    }

    #[test]
    fn test_restore_rejects_bad_records() {
        let creature = kitten();
        let species = creature.species().clone();

        let mut record = creature.to_persisted_record(Utc::now());
        record.params = BTreeMap::from([(ParameterKind::Health, 3.0)]);
        assert!(matches!(
            Creature::from_persisted_record(&record, species.clone(), 0.0, 0.5),
            Err(SimError::CorruptPersistedState(_))
        ));

        let mut record = creature.to_persisted_record(Utc::now());
        record.species = "dog".to_string();
        assert!(matches!(
            Creature::from_persisted_record(&record, species, 0.0, 0.5),
            Err(SimError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_restore_rejects_inconsistent_ages() {
        let creature = kitten();
        let species = creature.species().clone();

        let mut record = creature.to_persisted_record(Utc::now());
        record.age = 2;
        record.stage_age = 5;
        assert!(matches!(
            Creature::from_persisted_record(&record, species.clone(), 0.0, 0.5),
            Err(SimError::CorruptPersistedState(_))
        ));

        let mut record = creature.to_persisted_record(Utc::now());
        record.maturity = Maturity::Adult;
        assert!(matches!(
            Creature::from_persisted_record(&record, species, 0.0, 0.5),
            Err(SimError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_restore_keeps_cub_update_order() {
        use crate::creature::parameter::ParameterTemplate;

        let health = |value| ParameterTemplate::new(ParameterKind::Health, value, 0.0, 20.0);
        let satiety = |value| ParameterTemplate::new(ParameterKind::Satiety, value, 0.0, 25.0);
        let stages = Maturity::ALL
            .iter()
            .map(|&maturity| {
                let parameters = if maturity == Maturity::Cub {
                    vec![health(10.0), satiety(8.0)]
                } else {
                    vec![satiety(8.0), health(10.0)]
                };
                let config = StageConfig {
                    days: if maturity == Maturity::Cub { 1 } else { 50 },
                    parameters,
                    player_actions: Vec::new(),
                    creature_actions: Vec::new(),
                };
                (maturity, config)
            })
            .collect::<BTreeMap<_, _>>();
        let species = Arc::new(SpeciesDefinition::new("ferret", "Ferret", "", stages).unwrap());

        let mut live = Creature::new(species.clone(), "Slinky").unwrap();
        live.tick();
        assert_eq!(live.maturity(), Maturity::Young);
        live.vitals.get_mut(ParameterKind::Satiety).unwrap().set_value(6.5).unwrap();

        let record = live.to_persisted_record(Utc::now());
        let mut restored = Creature::from_persisted_record(&record, species, 0.0, 0.5).unwrap();
        let kinds: Vec<ParameterKind> = restored.parameters().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![ParameterKind::Health, ParameterKind::Satiety]);

        // Health reads satiety 6.5 before it drops to 5.5, so neither creature starves yet.
        live.tick();
        restored.tick();
        assert_eq!(restored.vitals(), live.vitals());
        assert_eq!(restored.parameter(ParameterKind::Health).unwrap().value(), 10.0);
    }

    #[test]
    fn test_summary() {
        let creature = kitten();
        assert_eq!(
            creature.to_string(),
            "Whiskers the Cat (cub, day 0): Health 10.0/20.0, Satiety 5.0/25.0"
        );
    }
}
