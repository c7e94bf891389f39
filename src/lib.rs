pub mod config;
pub mod creature;
pub mod error;
pub mod persistence;
pub mod server;
pub mod simulation;
pub mod species;
pub mod stats;

pub use creature::Creature;
pub use error::SimError;
pub use species::{Maturity, SpeciesCatalog, SpeciesDefinition};
