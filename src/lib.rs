#![doc = include_str!("../README.md")]
pub mod configuration;
pub mod gesture;
pub mod host;
pub mod input;
pub mod logging;
pub mod math;
pub mod output;
pub mod profile;
pub mod replay;
pub mod session;
