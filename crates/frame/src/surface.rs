//! Windowing collaborator
//!
//! [`Surface`] is the narrow slice of a windowing/graphics library a frame
//! update needs. Integer coordinates match immediate-mode 2D APIs, where the
//! origin is the top-left corner and text wider than the window lands at a
//! negative x.

use crate::error::Result;

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Dark gray background
    pub const DARKGRAY: Color = Color::rgb(80, 80, 80);
    /// Off-white foreground
    pub const RAYWHITE: Color = Color::rgb(245, 245, 245);
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque color from components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Initial window parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Title bar text
    pub title: String,
    /// Whether the user (or host page) may resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            title: "hello, raylib!".to_string(),
            resizable: true,
        }
    }
}

/// Window and 2D drawing operations used by frame updates
pub trait Surface {
    /// Poll input events and report whether the window should close
    fn should_close(&mut self) -> bool;

    /// Start a frame; drawing is only valid between begin and end
    fn begin_frame(&mut self) -> Result<()>;

    /// Present the frame
    fn end_frame(&mut self) -> Result<()>;

    /// Fill the whole frame with `color`
    fn clear(&mut self, color: Color) -> Result<()>;

    /// Width in pixels of `text` rendered at `font_size`
    fn measure_text(&self, text: &str, font_size: i32) -> i32;

    /// Draw `text` with its top-left corner at `(x, y)`
    fn draw_text(&mut self, text: &str, x: i32, y: i32, font_size: i32, color: Color)
        -> Result<()>;

    /// Current drawable size as `(width, height)`
    fn screen_size(&self) -> (i32, i32);

    /// Resize the window; fixed-size windows refuse
    fn set_window_size(&mut self, width: i32, height: i32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (300, 300));
        assert_eq!(config.title, "hello, raylib!");
        assert!(config.resizable);
    }
}
