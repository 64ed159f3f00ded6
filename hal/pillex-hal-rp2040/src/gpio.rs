//! Button inputs

use embassy_rp::gpio::{Input, Pin, Pull};
use embassy_rp::Peri;
use pillex_hal::InputPin;

/// Active-low push button with the internal pull-up enabled
pub struct Button<'d> {
    input: Input<'d>,
}

impl<'d> Button<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
        }
    }
}

impl InputPin for Button<'_> {
    fn is_high(&self) -> bool {
        self.input.is_high()
    }
}
