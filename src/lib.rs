//! camdash - webcam streaming dashboard
//!
//! Streams frames from a local camera device two ways: a pull-driven
//! multipart MJPEG endpoint (`/video_feed`) and a timer-driven publisher
//! that pushes encoded frames onto an in-process topic.

pub mod config;
pub mod error;
pub mod state;
pub mod stream;
pub mod video;
pub mod web;

pub use error::{AppError, Result};
