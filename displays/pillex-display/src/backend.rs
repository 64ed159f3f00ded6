//! Display backend trait
//!
//! Defines the drawing interface panel drivers implement. Coordinates are
//! pixels with the origin at the top-left corner.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
}

/// Text sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    /// Body text
    #[default]
    Small,
    /// Headline and clock digits
    Large,
}

/// Display backend trait
///
/// Text is drawn at the cursor, top-left aligned, and the cursor advances
/// past it. Drawing only touches the frame buffer until
/// [`present`](DisplayBackend::present).
pub trait DisplayBackend {
    /// Clear the frame buffer
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Invert the whole panel in hardware
    fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError>;

    /// Select the text size for following [`print`](Self::print) calls
    fn set_text_size(&mut self, size: TextSize);

    /// Move the text cursor
    fn set_cursor(&mut self, x: i32, y: i32);

    /// Draw text at the cursor
    fn print(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Draw a one-pixel line
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), DisplayError>;

    /// Draw a rectangle outline
    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), DisplayError>;

    /// Fill a rectangle
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), DisplayError>;

    /// Draw a circle outline around a center point
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: u32) -> Result<(), DisplayError>;

    /// Fill a circle around a center point
    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32) -> Result<(), DisplayError>;

    /// Send the frame buffer to the panel
    fn present(&mut self) -> Result<(), DisplayError>;

    /// Panel size in pixels (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Size of one character cell in pixels (width, height)
    fn char_size(&self, size: TextSize) -> (u32, u32);
}
