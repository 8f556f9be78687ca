pub mod gpio_led;
pub mod traits;
pub mod uart_sink;
