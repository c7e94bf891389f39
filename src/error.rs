use crate::creature::parameter::ParameterKind;
use crate::species::Maturity;
use thiserror::Error;

/// Errors raised by the creature model, the species catalog and persistence.
#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter was declared with a value outside its range (or an inverted range).
    #[error("{kind:?} value {value} is outside [{min}, {max}]")]
    InvalidParameterValue {
        kind: ParameterKind,
        value: f64,
        min: f64,
        max: f64,
    },
    /// A non-numeric value was written to a parameter.
    #[error("{kind:?} expects a finite number, got {found}")]
    InvalidParameterType { kind: ParameterKind, found: String },
    #[error("species {species} has no configuration for stage {stage}")]
    MissingStageConfig { species: String, stage: Maturity },
    #[error("invalid species {species}: {reason}")]
    InvalidSpecies { species: String, reason: String },
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
    #[error("no action in slot {0}")]
    UnknownAction(usize),
    #[error("{0} is not available right now")]
    ActionUnavailable(String),
    #[error("corrupt persisted state: {0}")]
    CorruptPersistedState(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
