//! Frame distribution: the pub/sub topic and the timer-driven publisher

pub mod publisher;
pub mod topic;

pub use publisher::FramePublisher;
pub use topic::{FrameTopic, CAMERA_TOPIC};
