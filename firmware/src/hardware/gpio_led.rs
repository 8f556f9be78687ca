use super::traits::Led;
use embassy_stm32::gpio::Output;

/// User LED on the F429I-DISCO (PG13 green / PG14 red, active high).
pub struct GpioLed<'d> {
    pin: Output<'d>,
}

impl<'d> GpioLed<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> Led for GpioLed<'d> {
    fn on(&mut self) {
        self.pin.set_high();
    }

    fn off(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }
}
