//! Initialization configuration for the [`Device`].

#[allow(unused_imports)] // docs
use crate::Device;

mod device_config;
pub use device_config::DeviceConfig;
