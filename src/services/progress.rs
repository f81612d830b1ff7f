//! Simulated progress of a reading run.
//!
//! The percentage is paced by a timer rather than by real I/O: each stage
//! animates toward a checkpoint while the real call runs, and the animation
//! is either joined or aborted when that call settles.

use super::orchestrator::ReadingStage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// 0.0..=100.0
    pub percent: f64,
    pub status: String,
    pub stage: ReadingStage,
    /// Bumped on every reset; animations from an older generation stop.
    #[serde(skip)]
    pub generation: u64,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            percent: 0.0,
            status: String::new(),
            stage: ReadingStage::Idle,
            generation: 0,
        }
    }
}

#[derive(Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<ProgressSnapshot>>,
    tick: Duration,
}

impl ProgressTracker {
    pub fn new(tick: Duration) -> Self {
        let (tx, _) = watch::channel(ProgressSnapshot::default());
        Self {
            tx: Arc::new(tx),
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Move to `stage`, replacing the status text when one is given.
    pub fn enter(&self, stage: ReadingStage, status: Option<&str>) {
        self.tx.send_modify(|snapshot| {
            snapshot.stage = stage;
            if let Some(status) = status {
                snapshot.status = status.to_string();
            }
        });
    }

    pub fn set_status(&self, status: &str) {
        self.tx.send_modify(|snapshot| snapshot.status = status.to_string());
    }

    /// Back to 0% with no status. Running animations go stale.
    pub fn reset(&self, stage: ReadingStage) {
        self.tx.send_modify(|snapshot| {
            snapshot.percent = 0.0;
            snapshot.status.clear();
            snapshot.stage = stage;
            snapshot.generation += 1;
        });
    }

    /// Advance toward `target` in equal steps every tick, spreading the
    /// distance over `pacing`. Never moves backwards and never passes 100.
    pub fn animate_to(&self, target: f64, pacing: Duration) -> ProgressAnimation {
        let target = target.clamp(0.0, 100.0);
        let (start, generation) = {
            let current = self.tx.borrow();
            (current.percent, current.generation)
        };
        let ticks = (pacing.as_millis() as f64 / self.tick.as_millis() as f64).max(1.0);
        let step = (target - start) / ticks;

        let tx = self.tx.clone();
        let tick = self.tick;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut settled = false;
                tx.send_if_modified(|snapshot| {
                    if snapshot.generation != generation {
                        settled = true;
                        return false;
                    }
                    let next = (snapshot.percent + step).min(target).clamp(0.0, 100.0);
                    let changed = next > snapshot.percent;
                    if changed {
                        snapshot.percent = next;
                    }
                    settled = snapshot.percent >= target;
                    changed
                });
                if settled {
                    break;
                }
            }
        });

        ProgressAnimation {
            handle: Some(handle),
        }
    }
}

/// A running animation. Dropping it aborts the timer.
#[must_use = "an animation is aborted when dropped"]
pub struct ProgressAnimation {
    handle: Option<JoinHandle<()>>,
}

impl ProgressAnimation {
    /// Wait until the checkpoint is reached.
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    tracing::error!("Progress animation failed: {:?}", err);
                }
            }
        }
    }

    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressAnimation {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
