use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};

use crate::aggregator::{format_interval, Aggregator};
use crate::store::Store;

/// Lifecycle of the scheduler loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running { in_flight: usize },
    Stopped,
}

/// Fires one aggregation cycle per tick at a fixed rate.
///
/// Cycles run as independent tasks and may overlap when one takes longer
/// than the interval; the store's atomic claim keeps them on distinct feeds.
pub struct Scheduler<S> {
    aggregator: Aggregator<S>,
    interval: Duration,
    state: watch::Sender<LoopState>,
}

impl<S: Store + Send + Sync + 'static> Scheduler<S> {
    pub fn new(aggregator: Aggregator<S>, interval: Duration) -> Self {
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            aggregator,
            interval,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    /// Run cycles until `shutdown` resolves, then wait for in-flight cycles.
    ///
    /// The first cycle starts immediately. Returns the number of cycles
    /// started.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let reporter = self.aggregator.reporter().clone();
        reporter.info(&format!(
            "Collecting feeds every {}",
            format_interval(self.interval)
        ));

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Burst);

        let mut cycles = JoinSet::new();
        let mut started = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Cycle task failed: {}", e);
                    }
                    self.publish(cycles.len());
                }

                _ = timer.tick() => {
                    let aggregator = self.aggregator.clone();
                    cycles.spawn(async move {
                        if let Err(e) = aggregator.run_cycle().await {
                            aggregator.reporter().error(&e.to_string());
                        }
                    });
                    started += 1;
                    self.publish(cycles.len());
                }
            }
        }

        reporter.info("Shutting down feed aggregator...");
        drop(timer);

        while let Some(joined) = cycles.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Cycle task failed: {}", e);
            }
            self.publish(cycles.len());
        }

        self.state.send_replace(LoopState::Stopped);
        started
    }

    fn publish(&self, in_flight: usize) {
        let state = if in_flight == 0 {
            LoopState::Idle
        } else {
            LoopState::Running { in_flight }
        };
        self.state.send_replace(state);
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {},
                    _ = sigterm.recv() => {},
                }
            }
            _ => {
                tracing::warn!("Failed to install unix signal handlers, falling back to ctrl-c");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for ctrl-c: {}", e);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    }
}
