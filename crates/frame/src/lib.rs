//! Frame driving for windowed demos
//!
//! Separates who owns the main loop from what a frame draws:
//! - Surface: window and 2D drawing collaborator
//! - FrameUpdate / CenteredText: per-frame logic
//! - FrameDriver: BlockingLoop (native) or CooperativeLoop (host-scheduled)
//! - ResizeForwarder: host resize notifications applied between frames
//! - HeadlessSurface: recording surface for tests and the CLI

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod driver;
pub mod error;
pub mod headless;
pub mod resize;
pub mod scene;
pub mod surface;

pub use driver::{
    BlockingLoop, CooperativeLoop, FixedTicks, FrameDriver, HostEnvironment, HostScheduler, Paced,
};
pub use error::{FrameError, Result};
pub use headless::{DrawCommand, HeadlessSurface};
pub use resize::ResizeForwarder;
pub use scene::{CenteredText, FrameUpdate};
pub use surface::{Color, Surface, WindowConfig};
