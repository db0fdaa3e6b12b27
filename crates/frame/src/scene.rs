//! Per-frame update logic

use crate::error::Result;
use crate::surface::{Color, Surface};

/// Logic invoked once per frame by a frame driver
pub trait FrameUpdate {
    /// Draw one complete frame
    fn update(&mut self, surface: &mut dyn Surface) -> Result<()>;
}

/// Single line of text centered in the window
///
/// The text height is a fixed estimate rather than a measurement, so the
/// vertical placement is approximate for fonts other than the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenteredText {
    /// Text to draw
    pub text: String,
    /// Font size in pixels
    pub font_size: i32,
    /// Assumed text height used for vertical centering
    pub text_height: i32,
    /// Background fill
    pub background: Color,
    /// Text color
    pub foreground: Color,
}

impl Default for CenteredText {
    fn default() -> Self {
        Self {
            text: "Hello, emcc!".to_string(),
            font_size: 22,
            text_height: 10,
            background: Color::DARKGRAY,
            foreground: Color::RAYWHITE,
        }
    }
}

impl CenteredText {
    /// Scene drawing `text` with default styling
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Top-left corner of the text for a screen and measured text width
    pub fn position(&self, screen: (i32, i32), text_width: i32) -> (i32, i32) {
        let (width, height) = screen;
        ((width - text_width) / 2, (height - self.text_height) / 2)
    }
}

impl FrameUpdate for CenteredText {
    fn update(&mut self, surface: &mut dyn Surface) -> Result<()> {
        surface.begin_frame()?;
        surface.clear(self.background)?;

        let text_width = surface.measure_text(&self.text, self.font_size);
        let (x, y) = self.position(surface.screen_size(), text_width);
        surface.draw_text(&self.text, x, y, self.font_size, self.foreground)?;

        surface.end_frame()
    }
}
