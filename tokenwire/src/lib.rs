//! Wire-side building blocks for the STM32F429I-DISCO demo firmware
//! =============================================================================================
//!
//! Two independent leaf components, both target-independent and heap-free:
//!
//! - [`frame`] — the tokenized log framer: Base64-encodes an opaque binary
//!   payload onto a byte sink as a single `$`...`\n` frame.
//! - [`meta`] — the build-metadata record encoder: packs commit/branch/build
//!   timestamp into a fixed 71-byte, CRC-32-verified record for embedding in
//!   the firmware image.
//!
//! [`payload`] is the producer side of the log payload (token + varint args);
//! the framer itself never interprets payload bytes.
//!
//! Nothing here touches hardware: the firmware crate supplies the byte sink
//! (UART) and places the metadata record into its link section.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod frame;
pub mod meta;
pub mod payload;
