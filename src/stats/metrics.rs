use crate::creature::action::{Action, ActionKind};
use crate::creature::Creature;
use crate::species::Maturity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterReading {
    pub kind: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    /// Position of the value inside its range, 0.0 to 1.0.
    pub fill: f64,
}

/// Everything the view needs to draw one action button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionView {
    pub slot: usize,
    pub kind: ActionKind,
    pub label: String,
    pub asset: String,
    pub enabled: bool,
    pub cooldown: u32,
}

impl ActionView {
    pub fn from_action(slot: usize, action: &Action) -> Self {
        Self {
            slot,
            kind: action.kind(),
            label: action.label().to_string(),
            asset: action.asset().to_string(),
            enabled: action.is_enabled(),
            cooldown: action.countdown(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureMetrics {
    pub tick: u64,
    pub name: String,
    pub species: String,
    pub image: String,
    pub age: u64,
    pub maturity: Maturity,
    pub stage_age: u64,
    pub stage_days: u64,
    pub parameters: Vec<ParameterReading>,
    pub history_len: usize,
    pub summary: String,
}

impl CreatureMetrics {
    pub fn compute(tick: u64, creature: &Creature) -> Self {
        let parameters = creature
            .parameters()
            .map(|p| {
                let span = p.max() - p.min();
                let fill = if span > 0.0 { (p.value() - p.min()) / span } else { 1.0 };
                ParameterReading {
                    kind: p.kind().to_string(),
                    value: p.value(),
                    min: p.min(),
                    max: p.max(),
                    fill,
                }
            })
            .collect();

        Self {
            tick,
            name: creature.name().to_string(),
            species: creature.species().name().to_string(),
            image: creature.species().image().to_string(),
            age: creature.age(),
            maturity: creature.maturity(),
            stage_age: creature.stage_age(),
            stage_days: creature.stage_config().days,
            parameters,
            history_len: creature.history().len(),
            summary: creature.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::action::NO_ACTION;
    use crate::species::SpeciesCatalog;

    #[test]
    fn test_metrics_for_new_creature() {
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("cat").unwrap(), "Whiskers").unwrap();

        let metrics = CreatureMetrics::compute(7, &creature);
        assert_eq!(metrics.tick, 7);
        assert_eq!(metrics.species, "Cat");
        assert_eq!(metrics.maturity, Maturity::Cub);
        assert_eq!(metrics.stage_days, 4);
        assert_eq!(metrics.parameters.len(), 2);
        assert_eq!(metrics.parameters[0].kind, "Health");
        assert_eq!(metrics.parameters[0].fill, 0.5);
        assert_eq!(metrics.parameters[1].fill, 0.2);
    }

    #[test]
    fn test_action_view_of_placeholder() {
        let view = ActionView::from_action(3, &NO_ACTION);
        assert_eq!(view.slot, 3);
        assert!(!view.enabled);
        assert_eq!(view.kind, ActionKind::NoAction);
    }
}
