use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::controller::{SimulationController, StepOutcome};
use crate::error::SimulationError;

/// Steps a started controller once per `period` until its run ends.
///
/// Setting the shutdown flag stops the run before the next tick; a step already in
/// progress always finishes. A dropped sender just means nobody will ask to stop.
pub async fn drive(
    controller: &mut SimulationController,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<StepOutcome, SimulationError> {
    if *shutdown.borrow() {
        controller.stop();
        return Ok(StepOutcome::Idle);
    }

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut outcome = StepOutcome::Idle;
    let mut shutdown_open = true;

    while controller.is_running() {
        tokio::select! {
            _ = ticker.tick() => {
                outcome = controller.step()?;
                debug!("Tick: {:?}", outcome);
            }
            changed = shutdown.changed(), if shutdown_open => {
                match changed {
                    Ok(()) if *shutdown.borrow() => {
                        info!("Shutdown requested, stopping simulation");
                        controller.stop();
                    }
                    Ok(()) => {}
                    Err(_) => shutdown_open = false,
                }
            }
        }
    }

    Ok(outcome)
}
