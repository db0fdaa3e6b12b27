//! Frame drivers
//!
//! A native program owns its main loop and runs frames until the window
//! asks to close. An embedded program (a browser page, a plugin host) does
//! not: the host calls back once per frame and decides when to stop. Both
//! shapes implement [`FrameDriver`]; [`HostEnvironment`] picks one at
//! startup.
//!
//! ```text
//! BlockingLoop:     while !should_close { resize; update }
//! CooperativeLoop:  while host.next_frame() { resize; update }
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::Result;
use crate::resize::ResizeForwarder;
use crate::scene::FrameUpdate;
use crate::surface::Surface;

/// Repeatedly invokes a frame update against a surface
pub trait FrameDriver {
    /// Run frames until the driver's stop condition; returns frames drawn
    fn run(
        &mut self,
        surface: &mut dyn Surface,
        scene: &mut dyn FrameUpdate,
        resize: &ResizeForwarder,
    ) -> Result<u64>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

fn step(
    surface: &mut dyn Surface,
    scene: &mut dyn FrameUpdate,
    resize: &ResizeForwarder,
) -> Result<()> {
    resize.apply(surface)?;
    scene.update(surface)
}

/// Native main loop: runs until the window should close
#[derive(Debug, Clone, Default)]
pub struct BlockingLoop {
    max_frames: Option<u64>,
}

impl BlockingLoop {
    /// Loop with no frame limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `limit` frames even if the window stays open
    pub fn max_frames(mut self, limit: Option<u64>) -> Self {
        self.max_frames = limit;
        self
    }
}

impl FrameDriver for BlockingLoop {
    fn run(
        &mut self,
        surface: &mut dyn Surface,
        scene: &mut dyn FrameUpdate,
        resize: &ResizeForwarder,
    ) -> Result<u64> {
        let mut frames = 0u64;
        while !surface.should_close() {
            if self.max_frames.map_or(false, |limit| frames >= limit) {
                debug!(frames, "Frame limit reached");
                break;
            }
            step(surface, scene, resize)?;
            frames += 1;
        }
        info!(frames, driver = self.name(), "Frame loop finished");
        Ok(frames)
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}

/// Host-side frame scheduler for cooperative loops
pub trait HostScheduler {
    /// Wait until the host grants the next frame; `false` ends the loop
    fn next_frame(&mut self) -> bool;
}

/// Grants a fixed number of frames back to back
#[derive(Debug, Clone)]
pub struct FixedTicks {
    remaining: u64,
}

impl FixedTicks {
    /// Scheduler granting exactly `frames` frames
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }
}

impl HostScheduler for FixedTicks {
    fn next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Grants frames at a target rate, sleeping between them
#[derive(Debug, Clone)]
pub struct Paced {
    period: Duration,
    max_frames: Option<u64>,
    granted: u64,
    next_at: Option<Instant>,
}

impl Paced {
    /// Frame rate used when `fps` is 0
    pub const DEFAULT_FPS: u32 = 60;

    /// Scheduler targeting `fps` frames per second (0 = host default)
    pub fn new(fps: u32) -> Self {
        let fps = if fps == 0 { Self::DEFAULT_FPS } else { fps };
        Self {
            period: Duration::from_secs(1) / fps,
            max_frames: None,
            granted: 0,
            next_at: None,
        }
    }

    /// Stop granting after `limit` frames
    pub fn max_frames(mut self, limit: Option<u64>) -> Self {
        self.max_frames = limit;
        self
    }

    /// Time between frames
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl HostScheduler for Paced {
    fn next_frame(&mut self) -> bool {
        if self.max_frames.map_or(false, |limit| self.granted >= limit) {
            return false;
        }
        let now = Instant::now();
        if let Some(at) = self.next_at {
            if at > now {
                std::thread::sleep(at - now);
            }
        }
        self.next_at = Some(Instant::now() + self.period);
        self.granted += 1;
        true
    }
}

/// Embedded main loop: the host scheduler decides when frames happen
///
/// The window's close request is not consulted; an embedded host ends the
/// program by no longer granting frames.
#[derive(Debug, Clone)]
pub struct CooperativeLoop<S> {
    scheduler: S,
}

impl<S: HostScheduler> CooperativeLoop<S> {
    /// Loop driven by `scheduler`
    pub fn new(scheduler: S) -> Self {
        Self { scheduler }
    }
}

impl<S: HostScheduler> FrameDriver for CooperativeLoop<S> {
    fn run(
        &mut self,
        surface: &mut dyn Surface,
        scene: &mut dyn FrameUpdate,
        resize: &ResizeForwarder,
    ) -> Result<u64> {
        let mut frames = 0u64;
        while self.scheduler.next_frame() {
            step(surface, scene, resize)?;
            frames += 1;
        }
        info!(frames, driver = self.name(), "Frame loop finished");
        Ok(frames)
    }

    fn name(&self) -> &'static str {
        "cooperative"
    }
}

/// Where the program runs, which decides who owns the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEnvironment {
    /// Standalone process owning its loop
    Native,
    /// Hosted program called back once per frame
    Embedded,
}

impl HostEnvironment {
    /// Environment of the current build target
    pub fn detect() -> Self {
        if cfg!(target_family = "wasm") {
            HostEnvironment::Embedded
        } else {
            HostEnvironment::Native
        }
    }

    /// Driver for this environment, optionally bounded to `limit` frames
    pub fn driver(self, limit: Option<u64>) -> Box<dyn FrameDriver> {
        match self {
            HostEnvironment::Native => Box::new(BlockingLoop::new().max_frames(limit)),
            HostEnvironment::Embedded => match limit {
                Some(frames) => Box::new(CooperativeLoop::new(FixedTicks::new(frames))),
                None => Box::new(CooperativeLoop::new(Paced::new(0))),
            },
        }
    }
}
