//! Timer-driven frame publisher
//!
//! Captures, transcodes and publishes one frame per timer tick at a fixed
//! rate. There is no overrun handling: a cycle that exceeds the period
//! delays subsequent ticks per the timer's native behavior. The loop ends
//! only on a shutdown signal or the first unrecovered failure.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

use super::topic::FrameTopic;
use crate::error::Result;
use crate::video::FrameEmitter;

/// Timer-driven publisher: one capture+transcode+publish cycle per tick
pub struct FramePublisher {
    emitter: FrameEmitter,
    topic: Arc<FrameTopic>,
    fps: u32,
}

impl FramePublisher {
    pub fn new(emitter: FrameEmitter, topic: Arc<FrameTopic>, fps: u32) -> Self {
        debug_assert!(fps > 0);
        Self {
            emitter,
            topic,
            fps,
        }
    }

    /// Spin until shutdown or the first capture/encode failure.
    ///
    /// A failure is fatal to the loop: it is logged with the sequence
    /// number of the failing cycle and propagated to the caller.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let period = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        let mut ticker = tokio::time::interval(period);

        info!(
            "Publishing {} at {} fps to '{}'",
            self.emitter.device(),
            self.fps,
            self.topic.name()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let frame = self.emitter.next_frame().map_err(|e| {
                        error!(
                            sequence = self.emitter.sequence() + 1,
                            "Publish cycle failed: {e}"
                        );
                        e
                    })?;
                    info!("Publishing frame {}", frame.sequence);
                    self.topic.publish(frame);
                }
                _ = shutdown.recv() => {
                    info!("Publisher shutting down");
                    return Ok(());
                }
            }
        }
    }
}
