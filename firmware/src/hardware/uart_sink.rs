use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::{Error as UartError, UartTx};
use tokenwire::frame::ByteSink;

/// Byte sink over the blocking TX half of a USART.
///
/// This is the only primitive the log framer consumes; backpressure is the
/// hardware transmit register stalling inside `blocking_write`. A UART error
/// aborts the in-progress frame at the framer level rather than letting a
/// truncated frame masquerade as a complete one.
pub struct UartSink<'d> {
    tx: UartTx<'d, Blocking>,
}

impl<'d> UartSink<'d> {
    pub fn new(tx: UartTx<'d, Blocking>) -> Self {
        Self { tx }
    }
}

impl<'d> ByteSink for UartSink<'d> {
    type Error = UartError;

    fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
        self.tx.blocking_write(&[byte])
    }
}
