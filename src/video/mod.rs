//! Video capture and transcoding
//!
//! The pipeline is fixed: capture a raw frame, resize, mirror, JPEG-encode.
//! Nothing leaves this module unencoded.

pub mod convert;
pub mod emitter;
pub mod format;
pub mod frame;
pub mod source;
pub mod transcode;

pub use emitter::FrameEmitter;
pub use format::{PixelFormat, Resolution};
pub use frame::{EncodedFrame, RawFrame};
pub use source::{open_source, FrameSource, SourceConfig};
pub use transcode::{ScaleConfig, Transcoder};
