//! In-process frame topic
//!
//! A named one-directional pub/sub channel carrying encoded frames. The
//! payload is the full JPEG byte buffer; subscribers that fall behind the
//! ring buffer receive a `Lagged` error and skip ahead.

use tokio::sync::broadcast;

use crate::video::EncodedFrame;

/// Name of the camera frame topic
pub const CAMERA_TOPIC: &str = "camera_topic";

/// Topic ring buffer capacity
const TOPIC_CAPACITY: usize = 16;

/// Named pub/sub topic for encoded frames.
///
/// Publishing is fire-and-forget: with no subscribers the frame is dropped,
/// which is the intended decoupling of producer and consumer lifecycles.
pub struct FrameTopic {
    name: &'static str,
    tx: broadcast::Sender<EncodedFrame>,
}

impl FrameTopic {
    /// Create the camera frame topic
    pub fn camera() -> Self {
        Self::named(CAMERA_TOPIC)
    }

    /// Create a topic with an explicit name
    pub fn named(name: &'static str) -> Self {
        let (tx, _rx) = broadcast::channel(TOPIC_CAPACITY);
        Self { name, tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Publish a frame to all subscribers
    pub fn publish(&self, frame: EncodedFrame) {
        // No subscribers is normal; the send error is deliberately ignored
        let _ = self.tx.send(frame);
    }

    /// Subscribe to future frames
    pub fn subscribe(&self) -> broadcast::Receiver<EncodedFrame> {
        self.tx.subscribe()
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::Resolution;
    use bytes::Bytes;
    use std::time::Instant;

    fn frame(sequence: u64) -> EncodedFrame {
        EncodedFrame::new(
            Bytes::from_static(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]),
            Resolution::VGA,
            sequence,
            Instant::now(),
        )
    }

    #[tokio::test]
    async fn publish_subscribe() {
        let topic = FrameTopic::camera();
        assert_eq!(topic.name(), CAMERA_TOPIC);

        let mut rx = topic.subscribe();
        topic.publish(frame(1));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.sequence, 1);
    }

    #[tokio::test]
    async fn subscribers_see_increasing_sequences() {
        let topic = FrameTopic::camera();
        let mut rx = topic.subscribe();

        for seq in 1..=5 {
            topic.publish(frame(seq));
        }

        let mut last = 0;
        for _ in 0..5 {
            let received = rx.recv().await.unwrap();
            assert!(received.sequence > last);
            last = received.sequence;
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let topic = FrameTopic::camera();
        assert_eq!(topic.subscriber_count(), 0);
        topic.publish(frame(1));

        // Subscribing afterwards sees only future frames
        let mut rx = topic.subscribe();
        topic.publish(frame(2));
        assert_eq!(rx.recv().await.unwrap().sequence, 2);
    }
}
