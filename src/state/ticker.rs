use crate::state::RadarEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Drive the simulation for one tracking session.
///
/// The first tick fires immediately, then once per `period`. The loop ends
/// as soon as the session it was started for is no longer current; stopping
/// tracking also aborts the task outright.
pub(crate) async fn run_ticker(engine: Arc<RadarEngine>, generation: u64, period: Duration) {
    let mut ticker = interval(period);

    // Skip missed ticks rather than bursting to catch up
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if !engine.tick_session(generation) {
            debug!(generation = generation, "Tracking session ended, ticker exiting");
            break;
        }
    }
}
