use super::protocol::ServerMessage;
use crate::creature::parameter::ParameterKind;
use crate::simulation::SimulationState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The server's view of the shared session. Reads take the read lock; actions take the
/// write lock, so they never interleave with a tick.
#[derive(Clone)]
pub struct StateStream {
    state: Arc<RwLock<SimulationState>>,
}

impl StateStream {
    pub fn new(state: Arc<RwLock<SimulationState>>) -> Self {
        Self { state }
    }

    pub async fn update_message(&self) -> ServerMessage {
        let state = self.state.read().await;
        ServerMessage::update(&state)
    }

    pub async fn history_message(&self, parameter: ParameterKind) -> ServerMessage {
        let state = self.state.read().await;
        ServerMessage::history(&state, parameter)
    }

    pub async fn apply_action(&self, slot: usize) -> ServerMessage {
        let mut state = self.state.write().await;
        let result = state.apply_action(slot).map_err(|e| e.to_string());
        ServerMessage::action_result(slot, result)
    }
}
