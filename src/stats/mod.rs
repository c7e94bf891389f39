pub mod metrics;

pub use metrics::{ActionView, CreatureMetrics, ParameterReading};
