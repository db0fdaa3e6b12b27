//! Forwarding of host resize notifications
//!
//! An embedding host reports size changes from its own callback context,
//! possibly on another thread and possibly mid-frame. The forwarder queues
//! them and the frame driver applies them to the surface before the next
//! frame starts.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::surface::Surface;

/// Cloneable queue of pending window sizes
#[derive(Debug, Clone, Default)]
pub struct ResizeForwarder {
    pending: Arc<Mutex<VecDeque<(i32, i32)>>>,
}

impl ResizeForwarder {
    /// Create an empty forwarder
    pub fn new() -> Self {
        Self::default()
    }

    /// Host callback: the embedding area is now `width` x `height`
    pub fn on_resize(&self, width: i32, height: i32) {
        self.pending.lock().push_back((width, height));
    }

    /// Notifications not yet applied
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Apply queued sizes in arrival order
    ///
    /// Returns how many were applied. Stops at the first size the surface
    /// rejects; later notifications stay queued.
    pub fn apply(&self, surface: &mut dyn Surface) -> Result<usize> {
        let mut applied = 0;
        loop {
            let Some((width, height)) = self.pending.lock().pop_front() else {
                return Ok(applied);
            };
            surface.set_window_size(width, height)?;
            debug!(width, height, "Applied window resize");
            applied += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;
    use crate::surface::WindowConfig;

    #[test]
    fn test_applies_in_order() {
        let mut surface = HeadlessSurface::new(&WindowConfig::default()).unwrap();
        let forwarder = ResizeForwarder::new();
        let host = forwarder.clone();
        host.on_resize(400, 200);
        host.on_resize(800, 600);
        assert_eq!(forwarder.pending(), 2);

        assert_eq!(forwarder.apply(&mut surface).unwrap(), 2);
        assert_eq!(surface.screen_size(), (800, 600));
        assert_eq!(forwarder.pending(), 0);
    }

    #[test]
    fn test_rejected_size_stops_application() {
        let mut surface = HeadlessSurface::new(&WindowConfig::default()).unwrap();
        let forwarder = ResizeForwarder::new();
        forwarder.on_resize(-1, 5);
        forwarder.on_resize(500, 500);

        assert!(forwarder.apply(&mut surface).is_err());
        assert_eq!(surface.screen_size(), (300, 300));
        assert_eq!(forwarder.pending(), 1);
    }

    #[test]
    fn test_notifications_from_another_thread() {
        let forwarder = ResizeForwarder::new();
        let host = forwarder.clone();
        std::thread::spawn(move || host.on_resize(1024, 768))
            .join()
            .unwrap();
        let mut surface = HeadlessSurface::new(&WindowConfig::default()).unwrap();
        forwarder.apply(&mut surface).unwrap();
        assert_eq!(surface.screen_size(), (1024, 768));
    }
}
