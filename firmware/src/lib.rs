#![no_std]

pub mod build_meta;
pub mod hardware;
pub mod logging;
