use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{
    cycle::{ArtSource, CheckCycle, CycleOutcome, GenreSource, NowPlayingSource, Publisher},
    info, warning,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: usize,
    pub posted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs the check cycle once right away and then every `interval`.
///
/// Cycles run strictly one after another. A failed cycle is logged and
/// the next one runs on schedule.
pub struct Scheduler<N, A, G, P> {
    cycle: CheckCycle<N, A, G, P>,
    interval: Duration,
}

impl<N, A, G, P> Scheduler<N, A, G, P>
where
    N: NowPlayingSource,
    A: ArtSource,
    G: GenreSource,
    P: Publisher,
{
    pub fn new(cycle: CheckCycle<N, A, G, P>, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    pub fn cycle(&self) -> &CheckCycle<N, A, G, P> {
        &self.cycle
    }

    /// Runs until Ctrl-C.
    pub async fn run(mut self) -> CycleStats {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warning!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_until(shutdown, None).await
    }

    /// Runs until `shutdown` resolves or `max_cycles` cycles have run.
    ///
    /// Shutdown is only observed while sleeping, never in the middle of a
    /// cycle.
    pub async fn run_until<F>(&mut self, shutdown: F, max_cycles: Option<usize>) -> CycleStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = CycleStats::default();

        info!("Initial check on startup...");
        loop {
            self.tick(&mut stats).await;

            if max_cycles.is_some_and(|max| stats.cycles >= max) {
                break;
            }

            info!("Sleeping for {} seconds...", self.interval.as_secs());
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down after {} checks.", stats.cycles);
                    break;
                }
                _ = sleep(self.interval) => info!("Running scheduled check..."),
            }
        }

        stats
    }

    async fn tick(&mut self, stats: &mut CycleStats) {
        stats.cycles += 1;
        match self.cycle.run().await {
            Ok(CycleOutcome::Posted { .. }) => stats.posted += 1,
            Ok(CycleOutcome::Skipped(_)) => stats.skipped += 1,
            Err(e) => {
                stats.failed += 1;
                warning!("Check failed: {}", e);
            }
        }
    }
}
