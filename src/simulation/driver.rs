use super::SimulationState;
use crate::config::Config;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Handle on a running tick loop.
pub struct TickHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Stops the loop before it schedules another tick and waits for it to exit.
    /// A tick already holding the lock is allowed to finish.
    pub async fn cancel(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            log::error!("Tick driver task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Ticks the shared state every `tick_interval_ms` until cancelled.
pub fn spawn(state: Arc<RwLock<SimulationState>>, config: Config) -> TickHandle {
    let (shutdown, mut cancelled) = watch::channel(false);

    let task = tokio::spawn(async move {
        let period = Duration::from_millis(config.simulation.tick_interval_ms.max(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                changed = cancelled.changed() => {
                    if changed.is_err() || *cancelled.borrow() {
                        break;
                    }
                }

                _ = ticker.tick() => {
                    let mut sim = state.write().await;
                    let report = sim.tick(&config);
                    if let Some(stage) = report.promoted_to {
                        log::info!("{} reached stage {} at age {}", sim.creature.name(), stage, report.age);
                    }
                    log::debug!("Tick {}: {}", sim.tick, sim.creature.summary());
                }
            }
        }

        log::info!("Tick driver stopped");
    });

    TickHandle { shutdown, task }
}
