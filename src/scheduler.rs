//! Fixed-interval driver for collection cycles
//!
//! The first cycle starts one interval after [`Scheduler::run`] is called.
//! Every tick spawns a cycle and returns to waiting right away, so a cycle
//! that takes longer than the interval overlaps with the next one. Pushes are
//! idempotent, so the last write wins at Statuspage.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, instrument, trace};

use crate::cycle::CollectionCycle;
use crate::source::MetricsSource;
use crate::statuspage::StatusReporter;

pub struct Scheduler<S, R> {
    interval: Duration,
    cycle: Arc<CollectionCycle<S, R>>,
}

impl<S, R> Scheduler<S, R>
where
    S: MetricsSource + 'static,
    R: StatusReporter + 'static,
{
    pub fn new(interval: Duration, cycle: Arc<CollectionCycle<S, R>>) -> Self {
        Self { interval, cycle }
    }

    /// Tick forever
    #[instrument(skip(self), fields(interval = ?self.interval))]
    pub async fn run(self) {
        debug!(
            "scheduling {} components every {:?}",
            self.cycle.queries().len(),
            self.interval
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            trace!("tick, spawning collection cycle");

            let cycle = Arc::clone(&self.cycle);
            tokio::spawn(async move {
                cycle.run_once().await;
            });
        }
    }

    /// Run the scheduler on a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
