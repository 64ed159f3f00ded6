//! Status view layouts
//!
//! Each view clears the frame, draws itself and presents. Only the error
//! view inverts the panel. Layouts adapt to the backend's panel and font
//! sizes; they are tuned for a 128x64 panel.

use core::fmt::Write;

use heapless::String;
use pillex_core::clock::TimeOfDay;
use pillex_core::screen::View;

use crate::backend::{DisplayBackend, DisplayError, TextSize};

/// Spinner dot positions relative to its center, clockwise from the top
const SPINNER: [(i32, i32); 8] = [
    (0, -14),
    (10, -10),
    (14, 0),
    (10, 10),
    (0, 14),
    (-10, 10),
    (-14, 0),
    (-10, -10),
];

/// Draw a view and present it
pub fn render<D: DisplayBackend>(display: &mut D, view: &View<'_>) -> Result<(), DisplayError> {
    display.clear()?;
    display.set_inverted(matches!(view, View::Error(_)))?;

    match *view {
        View::Loading { frame } => loading(display, frame)?,
        View::Time(time) => clock(display, time)?,
        View::Message(text) => message(display, text)?,
        View::Error(code) => error(display, code)?,
        View::TakePill => {
            centered(display, 12, TextSize::Large, "Take pill")?;
            centered(display, 44, TextSize::Small, "Press OK")?;
        }
        View::Success => {
            let (w, _) = display.dimensions();
            let cx = (w / 2) as i32;
            display.draw_line(cx - 20, 24, cx - 8, 36)?;
            display.draw_line(cx - 8, 36, cx + 20, 8)?;
            centered(display, 48, TextSize::Small, "Pill dispensed")?;
        }
        View::PillStuck => {
            centered(display, 4, TextSize::Large, "Stuck!")?;
            centered(display, 32, TextSize::Small, "Pill not dropped")?;
            centered(display, 46, TextSize::Small, "OK = retry")?;
        }
    }

    display.present()
}

fn loading<D: DisplayBackend>(display: &mut D, frame: u32) -> Result<(), DisplayError> {
    let (w, h) = display.dimensions();
    let (_, ch) = display.char_size(TextSize::Small);
    let cx = (w / 2) as i32;
    let cy = ((h - ch) / 2) as i32;
    let active = (frame as usize) % SPINNER.len();

    for (i, (dx, dy)) in SPINNER.iter().enumerate() {
        if i == active {
            display.fill_circle(cx + dx, cy + dy, 3)?;
        } else {
            display.draw_circle(cx + dx, cy + dy, 2)?;
        }
    }
    centered(display, (h - ch) as i32, TextSize::Small, "Dispensing")
}

fn clock<D: DisplayBackend>(display: &mut D, time: TimeOfDay) -> Result<(), DisplayError> {
    let mut text: String<8> = String::new();
    write!(
        text,
        "{:02}:{:02}:{:02}",
        time.hours, time.minutes, time.seconds
    )
    .map_err(|_| DisplayError::Communication)?;

    let (_, h) = display.dimensions();
    let (_, ch) = display.char_size(TextSize::Large);
    centered(display, ((h - ch) / 2) as i32, TextSize::Large, &text)
}

fn message<D: DisplayBackend>(display: &mut D, text: &str) -> Result<(), DisplayError> {
    let (w, h) = display.dimensions();
    let (cw, ch) = display.char_size(TextSize::Small);
    let cols = (w / cw) as usize;
    let rows = (h / ch) as usize;

    display.set_text_size(TextSize::Small);
    for (row, line) in wrap_lines(text, cols).take(rows).enumerate() {
        display.set_cursor(0, (row as u32 * ch) as i32);
        display.print(line)?;
    }
    Ok(())
}

fn error<D: DisplayBackend>(display: &mut D, code: i32) -> Result<(), DisplayError> {
    let mut text: String<16> = String::new();
    write!(text, "Code {}", code).map_err(|_| DisplayError::Communication)?;
    centered(display, 8, TextSize::Large, "ERROR")?;
    centered(display, 40, TextSize::Small, &text)
}

/// Print a single line horizontally centered at `y`
fn centered<D: DisplayBackend>(
    display: &mut D,
    y: i32,
    size: TextSize,
    text: &str,
) -> Result<(), DisplayError> {
    let (w, _) = display.dimensions();
    let (cw, _) = display.char_size(size);
    let width = text.chars().count() as u32 * cw;
    let x = w.saturating_sub(width) / 2;
    display.set_text_size(size);
    display.set_cursor(x as i32, y);
    display.print(text)
}

/// Greedy word wrap into lines of at most `cols` characters
///
/// Words longer than a line are split.
pub fn wrap_lines(text: &str, cols: usize) -> WrapLines<'_> {
    WrapLines {
        rest: text,
        cols: cols.max(1),
    }
}

/// Iterator returned by [`wrap_lines`]
pub struct WrapLines<'a> {
    rest: &'a str,
    cols: usize,
}

impl<'a> Iterator for WrapLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start_matches(' ');
        if rest.is_empty() {
            self.rest = rest;
            return None;
        }

        let Some((cut, next_char)) = rest.char_indices().nth(self.cols) else {
            self.rest = "";
            return Some(rest.trim_end_matches(' '));
        };

        if next_char == ' ' {
            self.rest = &rest[cut..];
            return Some(rest[..cut].trim_end_matches(' '));
        }

        match rest[..cut].rfind(' ') {
            Some(space) if space > 0 => {
                self.rest = &rest[space..];
                Some(rest[..space].trim_end_matches(' '))
            }
            _ => {
                self.rest = &rest[cut..];
                Some(&rest[..cut])
            }
        }
    }
}
