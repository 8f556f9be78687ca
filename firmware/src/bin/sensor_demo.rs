//! STM32F429I-DISCO Sensor Demo with Tokenized UART Logging
//! =============================================================================================
//!
//! This firmware simulates a sensor, batches the readings, and reports batch
//! statistics over UART using tokenized logging: every log statement is
//! reduced at compile time to a 32-bit token plus varint-encoded arguments
//! and transmitted as a `$`-prefixed Base64 frame terminated by `\n`.
//!
//! Hardware (F429I-DISCO):
//!   PG13 -> green LED, heartbeat (500 ms toggle)
//!   PG14 -> red LED, pulsed after each processed batch
//!   PA9  -> USART1 TX, 115200 8N1 (tokenized log stream)
//!
//! Features:
//! 1. 180 MHz sysclk from the 8 MHz HSE
//! 2. Simulated sensor reading every 500 ms, batched 16 at a time
//! 3. Integer mean per batch, logged as a tokenized frame
//! 4. Build metadata (git commit/branch/dirty, build timestamp) embedded in
//!    the `.build_metadata` section and announced at startup
//! 5. defmt over RTT for probe-side diagnostics

#![no_std]
#![no_main]

use defmt_rtt as _; // Global logger
use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    time::Hertz,
    usart::{self, UartTx},
};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex,
    channel::{Channel, Sender},
};
use embassy_time::{Duration, Ticker, Timer};
use heapless::Vec;
use panic_probe as _; // Panic handler

use f429_disco_demo::build_meta;
use f429_disco_demo::hardware::{gpio_led::GpioLed, traits::Led, uart_sink::UartSink};
use f429_disco_demo::logging::TokenLogger;
use f429_disco_demo::token_log;

/// One simulated sample; the values are arbitrary demo data.
#[derive(Clone, Copy, defmt::Format)]
struct SensorReading {
    timestamp_ms: u32,
    raw_value: i16,
}

const BATCH_SIZE: usize = 16;
const SAMPLE_PERIOD: Duration = Duration::from_millis(500);

// Channel from the sampling task to the batching/logging loop
static READINGS: Channel<ThreadModeRawMutex, SensorReading, 4> = Channel::new();

type DemoLogger = TokenLogger<UartSink<'static>>;

#[derive(Debug, defmt::Format)]
enum BatchError {
    Empty,
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // 8 MHz HSE -> /4 -> *180 -> /2 = 180 MHz sysclk
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL180,
            divp: Some(PllPDiv::DIV2),
            divq: Some(PllQDiv::DIV8),
            divr: None,
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
    }
    let p = embassy_stm32::init(config);

    defmt::info!("system up, metadata crc32 {=u32:#x}", build_meta::stored_crc());

    // USART1 on PA9, blocking TX only; this is the tokenized log transport.
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = 115_200;
    let tx = UartTx::new_blocking(p.USART1, p.PA9, uart_config).unwrap();

    // The logger is owned by this task alone, so frames never interleave.
    let mut log: DemoLogger = TokenLogger::new(UartSink::new(tx));

    token_log!(log, Info, "=== STM32F429I-DISCO sensor demo ===").unwrap();
    token_log!(
        log,
        Info,
        "git: %s dirty=%u @ %s",
        build_meta::GIT_COMMIT,
        build_meta::GIT_DIRTY,
        build_meta::GIT_BRANCH,
    )
    .unwrap();
    token_log!(log, Info, "built: %s %s", build_meta::BUILD_DATE, build_meta::BUILD_TIME).unwrap();

    let green = GpioLed::new(Output::new(p.PG13, Level::Low, Speed::Low));
    let mut red = GpioLed::new(Output::new(p.PG14, Level::Low, Speed::Low));

    spawner.spawn(heartbeat(green)).unwrap();
    spawner.spawn(sample_sensor(READINGS.sender(), SAMPLE_PERIOD)).unwrap();

    let mut readings: Vec<SensorReading, BATCH_SIZE> = Vec::new();
    let mut batch_count: u32 = 0;

    loop {
        let reading = READINGS.receive().await;
        // A full buffer can only happen if processing below ever lags a
        // whole batch; drop the sample rather than block the channel.
        let _ = readings.push(reading);

        if readings.is_full() {
            batch_count += 1;
            token_log!(
                log,
                Info,
                "--- batch #%u (t=%u ms) ---",
                batch_count,
                reading.timestamp_ms,
            )
            .unwrap();

            let mean = process_batch(&mut log, &readings).unwrap();
            defmt::debug!("batch {=u32} mean {=i32}", batch_count, mean);
            readings.clear();

            // Red pulse as the processing acknowledgement
            red.on();
            Timer::after_millis(100).await;
            red.off();
        }
    }
}

/// Logs each reading, then the integer mean of the batch.
fn process_batch(log: &mut DemoLogger, batch: &[SensorReading]) -> Result<i32, BatchError> {
    if batch.is_empty() {
        token_log!(log, Warn, "process_batch called with an empty batch").unwrap();
        return Err(BatchError::Empty);
    }

    let mut sum: i32 = 0;
    for reading in batch {
        sum += reading.raw_value as i32;
        token_log!(log, Debug, "  t=%u  raw=%d", reading.timestamp_ms, reading.raw_value).unwrap();
    }

    let mean = sum / batch.len() as i32;
    token_log!(log, Info, "batch mean=%d n=%u", mean, batch.len() as u32).unwrap();
    Ok(mean)
}

/// Green LED heartbeat.
#[embassy_executor::task]
async fn heartbeat(mut led: GpioLed<'static>) {
    let mut ticker = Ticker::every(Duration::from_millis(500));
    loop {
        led.toggle();
        ticker.next().await;
    }
}

/// Produces one simulated reading per period: a sawtooth in [-50, 49].
#[embassy_executor::task]
async fn sample_sensor(
    sender: Sender<'static, ThreadModeRawMutex, SensorReading, 4>,
    period: Duration,
) {
    let mut ticker = Ticker::every(period);
    let mut tick_ms: u32 = 0;
    loop {
        ticker.next().await;
        tick_ms += period.as_millis() as u32;
        let raw_value = ((tick_ms / 500) % 100) as i16 - 50;
        sender.send(SensorReading { timestamp_ms: tick_ms, raw_value }).await;
    }
}
