pub mod catalog;

use crate::creature::action::{Action, ActionTemplate};
use crate::creature::parameter::{ParameterKind, ParameterTemplate, UpdateRule};
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use catalog::SpeciesCatalog;

/// Life phases in the order a creature passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    Cub,
    Young,
    Adult,
    Old,
}

impl Maturity {
    pub const ALL: [Maturity; 4] = [Maturity::Cub, Maturity::Young, Maturity::Adult, Maturity::Old];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The stage that follows, or `None` for `Old`.
    pub fn next(&self) -> Option<Maturity> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Maturity::Cub => "cub",
            Maturity::Young => "young",
            Maturity::Adult => "adult",
            Maturity::Old => "old",
        };
        write!(f, "{}", name)
    }
}

/// Everything a species declares for one maturity stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Ticks spent in this stage before moving on.
    pub days: u64,
    pub parameters: Vec<ParameterTemplate>,
    #[serde(default)]
    pub player_actions: Vec<ActionTemplate>,
    #[serde(default)]
    pub creature_actions: Vec<ActionTemplate>,
}

impl StageConfig {
    pub fn template(&self, kind: ParameterKind) -> Option<&ParameterTemplate> {
        self.parameters.iter().find(|t| t.kind == kind)
    }

    pub fn kinds(&self) -> BTreeSet<ParameterKind> {
        self.parameters.iter().map(|t| t.kind).collect()
    }

    /// Fresh player and ambient action instances for one creature.
    pub fn materialize_actions(&self) -> (Vec<Action>, Vec<Action>) {
        let player = self.player_actions.iter().map(Action::player).collect();
        let ambient = self.creature_actions.iter().map(Action::ambient).collect();
        (player, ambient)
    }
}

/// Shape of a species as written in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub id: String,
    pub name: String,
    pub image: String,
    pub stages: BTreeMap<Maturity, StageConfig>,
}

/// Immutable stage table of one species. Shared by every creature of that species.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDefinition {
    id: String,
    name: String,
    image: String,
    /// Indexed by `Maturity::index`; always holds all four stages.
    stages: Vec<StageConfig>,
}

impl SpeciesDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
        mut stages: BTreeMap<Maturity, StageConfig>,
    ) -> Result<Self, SimError> {
        let id = id.into();

        let mut ordered = Vec::with_capacity(Maturity::ALL.len());
        for stage in Maturity::ALL {
            let config = stages.remove(&stage).ok_or_else(|| SimError::MissingStageConfig {
                species: id.clone(),
                stage,
            })?;
            ordered.push(config);
        }

        validate_stages(&id, &ordered)?;

        Ok(Self {
            id,
            name: name.into(),
            image: image.into(),
            stages: ordered,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn stage(&self, maturity: Maturity) -> &StageConfig {
        &self.stages[maturity.index()]
    }
}

impl TryFrom<SpeciesSpec> for SpeciesDefinition {
    type Error = SimError;

    fn try_from(spec: SpeciesSpec) -> Result<Self, Self::Error> {
        SpeciesDefinition::new(spec.id, spec.name, spec.image, spec.stages)
    }
}

fn validate_stages(species: &str, stages: &[StageConfig]) -> Result<(), SimError> {
    let invalid = |reason: String| SimError::InvalidSpecies {
        species: species.to_string(),
        reason,
    };

    let expected = stages[0].kinds();
    for (maturity, stage) in Maturity::ALL.iter().zip(stages) {
        if stage.kinds().len() != stage.parameters.len() {
            return Err(invalid(format!("stage {} declares a parameter twice", maturity)));
        }
        if stage.kinds() != expected {
            return Err(invalid(format!(
                "stage {} declares different parameters than stage cub",
                maturity
            )));
        }
        for template in &stage.parameters {
            template.instantiate()?;
            if let UpdateRule::StarveBelow { source, .. } = template.rule() {
                if stage.template(source).is_none() {
                    return Err(invalid(format!(
                        "{} in stage {} depends on undeclared {}",
                        template.kind, maturity, source
                    )));
                }
            }
        }
    }

    Ok(())
}
