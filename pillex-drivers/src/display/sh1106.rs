//! SH1106 OLED Display Driver
//!
//! Driver for 128x64 SH1106-based OLED displays via I2C. Drawing goes
//! into a page-organized frame buffer through embedded-graphics; the
//! buffer is sent to the panel one page at a time on `present`.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use pillex_display::{DisplayBackend, DisplayError, TextSize};
use pillex_hal::I2cBus;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// The 128 visible columns start at RAM column 2
const COLUMN_OFFSET: u8 = 2;

/// Control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// SH1106 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

const INIT_SEQUENCE: [u8; 22] = [
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

fn font(size: TextSize) -> &'static MonoFont<'static> {
    match size {
        TextSize::Small => &FONT_6X10,
        TextSize::Large => &FONT_10X20,
    }
}

/// SH1106 OLED driver
pub struct Sh1106<I> {
    i2c: I,
    address: u8,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH]; PAGES],
    cursor: Point,
    text_size: TextSize,
    /// Inversion last sent to the panel
    inverted: Option<bool>,
    initialized: bool,
}

impl<I: I2cBus> Sh1106<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: [[0; WIDTH]; PAGES],
            cursor: Point::zero(),
            text_size: TextSize::Small,
            inverted: None,
            initialized: false,
        }
    }

    /// Send the power-up sequence and turn the panel on
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.commands(&INIT_SEQUENCE)?;
        self.inverted = Some(false);
        self.initialized = true;
        Ok(())
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.commands(&[cmd::SET_CONTRAST, contrast])
    }

    /// Check a pixel in the frame buffer
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.buffer[y / 8][x] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let cell = &mut self.buffer[y / 8][x];
        if on {
            *cell |= 1 << (y % 8);
        } else {
            *cell &= !(1 << (y % 8));
        }
    }

    fn commands(&mut self, cmds: &[u8]) -> Result<(), DisplayError> {
        let mut frame = [0u8; INIT_SEQUENCE.len() + 1];
        frame[0] = CONTROL_COMMAND;
        frame[1..=cmds.len()].copy_from_slice(cmds);
        self.i2c
            .write(self.address, &frame[..=cmds.len()])
            .map_err(|_| DisplayError::Communication)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        for page in 0..PAGES {
            self.commands(&[
                cmd::SET_PAGE_ADDR | page as u8,
                cmd::SET_LOW_COLUMN | (COLUMN_OFFSET & 0x0F),
                cmd::SET_HIGH_COLUMN | (COLUMN_OFFSET >> 4),
            ])?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(&self.buffer[page]);
            self.i2c
                .write(self.address, &data)
                .map_err(|_| DisplayError::Communication)?;
        }
        Ok(())
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I> OriginDimensions for Sh1106<I> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<I: I2cBus> DrawTarget for Sh1106<I> {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), DisplayError>
    where
        P: IntoIterator<Item = Pixel<BinaryColor>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if x < WIDTH && y < HEIGHT {
                    self.set_pixel(x, y, color.is_on());
                }
            }
        }
        Ok(())
    }
}

impl<I: I2cBus> DisplayBackend for Sh1106<I> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        if self.inverted == Some(inverted) {
            return Ok(());
        }
        let command = if inverted {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        };
        self.commands(&[command])?;
        self.inverted = Some(inverted);
        Ok(())
    }

    fn set_text_size(&mut self, size: TextSize) {
        self.text_size = size;
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(font(self.text_size), BinaryColor::On);
        self.cursor = Text::with_baseline(text, self.cursor, style, Baseline::Top).draw(self)?;
        Ok(())
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), DisplayError> {
        Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(self)
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), DisplayError> {
        Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(self)
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), DisplayError> {
        Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(self)
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, radius: u32) -> Result<(), DisplayError> {
        Circle::with_center(Point::new(cx, cy), 2 * radius + 1)
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(self)
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32) -> Result<(), DisplayError> {
        Circle::with_center(Point::new(cx, cy), 2 * radius + 1)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(self)
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        self.flush()
    }

    fn dimensions(&self) -> (u32, u32) {
        (WIDTH as u32, HEIGHT as u32)
    }

    fn char_size(&self, size: TextSize) -> (u32, u32) {
        let f = font(size);
        (
            f.character_size.width + f.character_spacing,
            f.character_size.height,
        )
    }
}
