//! Pull-driven frame emitter
//!
//! Turns discrete capture+transcode calls into an unbounded supply of
//! encoded frames: one synchronous cycle per `next_frame()` call, no rate
//! limiting. The emitter is not restartable; once a cycle fails, the caller
//! builds a new one (which acquires a fresh device handle).

use super::frame::EncodedFrame;
use super::source::FrameSource;
use super::transcode::Transcoder;
use crate::error::Result;

/// Continuous supply of encoded frames backed by an owned source.
///
/// Dropping the emitter drops the source and releases the camera device.
pub struct FrameEmitter {
    source: Box<dyn FrameSource>,
    transcoder: Transcoder,
    sequence: u64,
}

impl FrameEmitter {
    pub fn new(source: Box<dyn FrameSource>, transcoder: Transcoder) -> Self {
        Self {
            source,
            transcoder,
            sequence: 0,
        }
    }

    /// Perform one capture+transcode cycle. Blocks on the device read.
    pub fn next_frame(&mut self) -> Result<EncodedFrame> {
        let raw = self.source.capture()?;
        self.sequence += 1;
        self.transcoder.process(raw, self.sequence)
    }

    /// Sequence number of the last emitted frame
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Device path of the underlying source
    pub fn device(&self) -> &str {
        self.source.device()
    }
}
