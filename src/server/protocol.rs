use crate::creature::parameter::ParameterKind;
use crate::simulation::SimulationState;
use crate::stats::{ActionView, CreatureMetrics};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "update")]
    Update {
        metrics: CreatureMetrics,
        actions: Vec<ActionView>,
        events: Vec<String>,
    },
    #[serde(rename = "action_result")]
    ActionResult {
        slot: usize,
        ok: bool,
        message: String,
    },
    #[serde(rename = "history")]
    History {
        parameter: ParameterKind,
        ages: Vec<u64>,
        values: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "get_state")]
    GetState,
    #[serde(rename = "apply_action")]
    ApplyAction { slot: usize },
    #[serde(rename = "get_history")]
    GetHistory { parameter: ParameterKind },
}

impl ServerMessage {
    pub fn update(state: &SimulationState) -> Self {
        ServerMessage::Update {
            metrics: state.metrics(),
            actions: state.action_bar(),
            events: state.recent_events(),
        }
    }

    pub fn action_result(slot: usize, result: Result<String, String>) -> Self {
        match result {
            Ok(message) => ServerMessage::ActionResult {
                slot,
                ok: true,
                message,
            },
            Err(message) => ServerMessage::ActionResult {
                slot,
                ok: false,
                message,
            },
        }
    }

    pub fn history(state: &SimulationState, parameter: ParameterKind) -> Self {
        let (ages, values) = state
            .creature
            .history()
            .param_series(parameter)
            .into_iter()
            .unzip();
        ServerMessage::History {
            parameter,
            ages,
            values,
        }
    }
}
