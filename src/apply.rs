//! Pushing the requested [`DeviceOptions`] onto a freshly added device.

use thiserror::Error;

use crate::options::{DeviceOptions, Setting};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("not supported by this device")]
    Unsupported,
    #[error("invalid value")]
    Invalid,
}

/// A device handle configuration can be applied to.
pub trait ConfigurableDevice {
    fn sysname(&self) -> &str;

    /// Whether the device has pointer acceleration at all.
    fn accel_is_available(&self) -> bool;

    fn apply(&mut self, setting: Setting) -> Result<(), ConfigError>;
}

/// Apply every set option to `device`, returning how many were accepted.
///
/// Failures are logged and never stop the remaining settings; acceleration
/// settings are skipped entirely on devices without acceleration.
pub fn apply_device_config(device: &mut dyn ConfigurableDevice, options: &DeviceOptions) -> usize {
    let accel = device.accel_is_available();
    let mut applied = 0;

    for setting in options.settings() {
        if setting.needs_accel() && !accel {
            log::debug!("{}: no pointer acceleration, skipping {}", device.sysname(), setting);
            continue;
        }
        match device.apply(setting) {
            Ok(()) => {
                log::debug!("{}: applied {}", device.sysname(), setting);
                applied += 1;
            }
            Err(ConfigError::Unsupported) => {
                log::debug!("{}: {} not supported", device.sysname(), setting);
            }
            Err(e) => {
                log::warn!("{}: failed to apply {}: {}", device.sysname(), setting, e);
            }
        }
    }

    applied
}
