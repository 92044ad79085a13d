//! Async driver that runs a [`TipPipeline`] against a room subscription.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::NotificationConfig;
use crate::gateway::fanout::{DataChannel, RoomMessage};

use super::pipeline::{PipelineEvent, TipPipeline};

/// How long to sleep when nothing is on screen.
const IDLE_WAKE: Duration = Duration::from_secs(3600);

pub struct TipFeed;

impl TipFeed {
    /// Subscribe to `channel` and start processing in a background task.
    ///
    /// The subscription is taken before this returns, so anything published
    /// afterwards is seen.
    pub fn spawn(
        channel: &dyn DataChannel,
        config: &NotificationConfig,
    ) -> (TipFeedHandle, mpsc::UnboundedReceiver<PipelineEvent>) {
        let rx = channel.subscribe();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let pipeline = TipPipeline::new(config);
        let task = tokio::spawn(run(
            pipeline,
            rx,
            events_tx,
            shutdown_rx,
            config.cleanup_interval,
        ));

        (
            TipFeedHandle {
                shutdown: shutdown_tx,
                task,
            },
            events_rx,
        )
    }
}

/// Cancellation handle for a running feed.
pub struct TipFeedHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<TipPipeline>,
}

impl TipFeedHandle {
    /// Stop the feed, cancel pending timers and hand back the final state.
    pub async fn shutdown(self) -> Option<TipPipeline> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                tracing::error!(error = %e, "tip feed task failed");
                None
            }
        }
    }
}

async fn run(
    mut pipeline: TipPipeline,
    mut rx: broadcast::Receiver<Arc<RoomMessage>>,
    events: mpsc::UnboundedSender<PipelineEvent>,
    mut shutdown: oneshot::Receiver<()>,
    cleanup_every: Duration,
) -> TipPipeline {
    let cleanup_every = cleanup_every.max(Duration::from_millis(1));
    let mut cleanup = time::interval_at(Instant::now() + cleanup_every, cleanup_every);
    cleanup.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let deadline = pipeline
            .next_deadline()
            .unwrap_or_else(|| Instant::now() + IDLE_WAKE);

        let out = tokio::select! {
            _ = &mut shutdown => break,
            msg = rx.recv() => match msg {
                Ok(msg) => pipeline.handle_message(&msg.payload, Instant::now()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "tip feed lagged, messages skipped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = time::sleep_until(deadline) => pipeline.advance(Instant::now()),
            _ = cleanup.tick() => {
                pipeline.cleanup(Instant::now());
                continue;
            }
        };

        if out.into_iter().any(|event| events.send(event).is_err()) {
            tracing::debug!("tip feed consumer gone");
            break;
        }
    }

    pipeline.cancel();
    pipeline
}
