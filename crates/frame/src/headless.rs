//! Headless surface that records draw commands
//!
//! Stands in for a real window in tests and in the CLI. Text is measured
//! with a fixed advance of half the font size per character.

use tracing::trace;

use crate::error::{FrameError, Result};
use crate::surface::{Color, Surface, WindowConfig};

/// Drawing operation recorded by [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Background fill
    Clear(Color),
    /// Text placement
    Text {
        /// Text drawn
        text: String,
        /// Left edge
        x: i32,
        /// Top edge
        y: i32,
        /// Font size in pixels
        font_size: i32,
        /// Text color
        color: Color,
    },
}

/// In-memory [`Surface`]
#[derive(Debug)]
pub struct HeadlessSurface {
    title: String,
    width: i32,
    height: i32,
    resizable: bool,
    in_frame: bool,
    current: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
    frames: u64,
    close_after: Option<u64>,
}

impl HeadlessSurface {
    /// Open a headless window
    pub fn new(config: &WindowConfig) -> Result<Self> {
        check_size(config.width, config.height)?;
        Ok(Self {
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            resizable: config.resizable,
            in_frame: false,
            current: Vec::new(),
            last_frame: Vec::new(),
            frames: 0,
            close_after: None,
        })
    }

    /// Report `should_close` once `frames` frames have been presented
    pub fn close_after(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Commands of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    /// Fixed glyph advance for `font_size`
    pub fn advance(font_size: i32) -> i32 {
        font_size / 2
    }

    fn ensure_in_frame(&self) -> Result<()> {
        if !self.in_frame {
            return Err(FrameError::NotInFrame);
        }
        Ok(())
    }
}

fn check_size(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(FrameError::InvalidSize { width, height });
    }
    Ok(())
}

impl Surface for HeadlessSurface {
    fn should_close(&mut self) -> bool {
        self.close_after.map_or(false, |limit| self.frames >= limit)
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.in_frame {
            return Err(FrameError::FrameInProgress);
        }
        self.in_frame = true;
        self.current.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.ensure_in_frame()?;
        self.in_frame = false;
        self.frames += 1;
        self.last_frame = std::mem::take(&mut self.current);
        trace!(frame = self.frames, commands = self.last_frame.len(), "Presented frame");
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.ensure_in_frame()?;
        self.current.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn measure_text(&self, text: &str, font_size: i32) -> i32 {
        text.chars().count() as i32 * Self::advance(font_size)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: i32,
        color: Color,
    ) -> Result<()> {
        self.ensure_in_frame()?;
        self.current.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            font_size,
            color,
        });
        Ok(())
    }

    fn screen_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn set_window_size(&mut self, width: i32, height: i32) -> Result<()> {
        if !self.resizable {
            return Err(FrameError::NotResizable);
        }
        check_size(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_outside_frame_rejected() {
        let mut surface = HeadlessSurface::new(&WindowConfig::default()).unwrap();
        assert_eq!(surface.clear(Color::BLACK), Err(FrameError::NotInFrame));
        assert_eq!(surface.end_frame(), Err(FrameError::NotInFrame));

        surface.begin_frame().unwrap();
        assert_eq!(surface.begin_frame(), Err(FrameError::FrameInProgress));
    }

    #[test]
    fn test_frames_are_recorded() {
        let mut surface = HeadlessSurface::new(&WindowConfig::default())
            .unwrap()
            .close_after(1);
        assert!(!surface.should_close());

        surface.begin_frame().unwrap();
        surface.clear(Color::DARKGRAY).unwrap();
        surface.end_frame().unwrap();

        assert!(surface.should_close());
        assert_eq!(surface.frames_presented(), 1);
        assert_eq!(surface.last_frame(), &[DrawCommand::Clear(Color::DARKGRAY)]);
    }

    #[test]
    fn test_measure_and_resize() {
        let mut surface = HeadlessSurface::new(&WindowConfig::default()).unwrap();
        assert_eq!(surface.measure_text("Hello, emcc!", 22), 132);
        surface.set_window_size(640, 480).unwrap();
        assert_eq!(surface.screen_size(), (640, 480));
        assert!(surface.set_window_size(0, 10).is_err());
        assert_eq!(surface.screen_size(), (640, 480));
    }

    #[test]
    fn test_fixed_size_window_rejects_resize() {
        let config = WindowConfig {
            resizable: false,
            ..WindowConfig::default()
        };
        let mut surface = HeadlessSurface::new(&config).unwrap();
        assert_eq!(surface.set_window_size(640, 480), Err(FrameError::NotResizable));
        assert_eq!(surface.screen_size(), (300, 300));
    }
}
