use super::{Maturity, SpeciesDefinition, SpeciesSpec, StageConfig};
use crate::creature::action::{ActionKind, ActionTemplate};
use crate::creature::parameter::{ParameterKind, ParameterTemplate};
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    species: Vec<SpeciesSpec>,
}

/// Read-only table of every species a new creature can be created from, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    species: BTreeMap<String, Arc<SpeciesDefinition>>,
}

impl SpeciesCatalog {
    pub fn new(definitions: impl IntoIterator<Item = SpeciesDefinition>) -> Result<Self, SimError> {
        let mut species = BTreeMap::new();
        for definition in definitions {
            let id = definition.id().to_string();
            if species.insert(id.clone(), Arc::new(definition)).is_some() {
                return Err(SimError::InvalidSpecies {
                    species: id,
                    reason: "declared more than once".to_string(),
                });
            }
        }
        Ok(Self { species })
    }

    /// Cat, dog and mouse.
    pub fn builtin() -> Self {
        let species = [cat(), dog(), mouse()]
            .into_iter()
            .filter_map(|definition| match definition {
                Ok(d) => Some((d.id().to_string(), Arc::new(d))),
                Err(e) => {
                    log::error!("Skipping built-in species: {}", e);
                    None
                }
            })
            .collect();
        Self { species }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SimError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        let definitions = file
            .species
            .into_iter()
            .map(SpeciesDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions)
    }

    pub fn get(&self, id: &str) -> Result<Arc<SpeciesDefinition>, SimError> {
        self.species
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::UnknownSpecies(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpeciesDefinition>> {
        self.species.values()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

fn stage(
    days: u64,
    health: (f64, f64, f64),
    satiety: (f64, f64, f64),
    feed: f64,
    creature_actions: Vec<ActionTemplate>,
) -> StageConfig {
    StageConfig {
        days,
        parameters: vec![
            ParameterTemplate::new(ParameterKind::Health, health.0, health.1, health.2),
            ParameterTemplate::new(ParameterKind::Satiety, satiety.0, satiety.1, satiety.2),
        ],
        player_actions: vec![ActionTemplate::feed(feed)],
        creature_actions,
    }
}

fn builtin(id: &str, name: &str, stages: [StageConfig; 4]) -> Result<SpeciesDefinition, SimError> {
    let stages = Maturity::ALL.into_iter().zip(stages).collect();
    SpeciesDefinition::new(id, name, format!("images/{}.png", id), stages)
}

fn cat() -> Result<SpeciesDefinition, SimError> {
    use ActionKind::{PlayRope, Sleep};
    builtin(
        "cat",
        "Cat",
        [
            stage(4, (10.0, 0.0, 20.0), (5.0, 0.0, 25.0), 20.0, vec![ActionTemplate::ambient(PlayRope, 100)]),
            stage(
                10,
                (0.0, 0.0, 50.0),
                (0.0, 0.0, 30.0),
                25.0,
                vec![ActionTemplate::ambient(PlayRope, 100), ActionTemplate::ambient(Sleep, 120)],
            ),
            stage(
                20,
                (0.0, 0.0, 45.0),
                (0.0, 0.0, 25.0),
                20.0,
                vec![ActionTemplate::ambient(Sleep, 60), ActionTemplate::ambient(PlayRope, 180)],
            ),
            stage(12, (0.0, 0.0, 35.0), (0.0, 0.0, 20.0), 10.0, vec![ActionTemplate::ambient(Sleep, 30)]),
        ],
    )
}

fn dog() -> Result<SpeciesDefinition, SimError> {
    use ActionKind::{PlayTail, Sleep};
    builtin(
        "dog",
        "Dog",
        [
            stage(4, (12.0, 0.0, 25.0), (7.0, 0.0, 25.0), 20.0, vec![ActionTemplate::ambient(PlayTail, 100)]),
            stage(
                11,
                (0.0, 0.0, 50.0),
                (0.0, 0.0, 30.0),
                25.0,
                vec![ActionTemplate::ambient(PlayTail, 100), ActionTemplate::ambient(Sleep, 120)],
            ),
            stage(
                20,
                (0.0, 0.0, 45.0),
                (0.0, 0.0, 25.0),
                20.0,
                vec![ActionTemplate::ambient(Sleep, 60), ActionTemplate::ambient(PlayTail, 180)],
            ),
            stage(12, (0.0, 0.0, 35.0), (0.0, 0.0, 20.0), 10.0, vec![ActionTemplate::ambient(Sleep, 30)]),
        ],
    )
}

fn mouse() -> Result<SpeciesDefinition, SimError> {
    builtin(
        "mouse",
        "Mouse",
        [
            stage(4, (5.0, 0.0, 15.0), (5.0, 0.0, 15.0), 20.0, Vec::new()),
            stage(11, (0.0, 0.0, 50.0), (0.0, 0.0, 30.0), 25.0, Vec::new()),
            stage(20, (0.0, 0.0, 45.0), (0.0, 0.0, 25.0), 20.0, Vec::new()),
            stage(12, (0.0, 0.0, 35.0), (0.0, 0.0, 20.0), 10.0, Vec::new()),
        ],
    )
}
