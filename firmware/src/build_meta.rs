//! Build-time metadata embedded in the `.build_metadata` link section.
//!
//! The record is readable from a flashed image or the ELF without running
//! the firmware:
//!
//! ```text
//! arm-none-eabi-objcopy -O binary --only-section=.build_metadata \
//!     target/thumbv7em-none-eabihf/release/sensor_demo meta.bin
//! ```
//!
//! Layout and CRC are defined by [`tokenwire::meta`]; the git values and the
//! build timestamp are captured by `build.rs` and injected as env vars. The
//! `build_meta.x` linker fragment keeps the section in FLASH.

use tokenwire::meta;

pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const GIT_BRANCH: &str = env!("GIT_BRANCH");
pub const GIT_DIRTY: bool = matches!(env!("GIT_DIRTY").as_bytes(), [b'1']);
pub const BUILD_DATE: &str = env!("BUILD_DATE");
pub const BUILD_TIME: &str = env!("BUILD_TIME");

#[unsafe(link_section = ".build_metadata")]
#[used]
pub static BUILD_METADATA: [u8; meta::RECORD_SIZE] =
    meta::encode_record(GIT_COMMIT, GIT_DIRTY, GIT_BRANCH, BUILD_DATE, BUILD_TIME);

/// CRC-32 stored in the record, for the startup banner.
pub fn stored_crc() -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&BUILD_METADATA[meta::CRC_OFFSET..]);
    u32::from_le_bytes(bytes)
}
