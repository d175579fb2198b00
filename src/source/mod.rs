//! Event sources: where normalized events come from.

#[cfg(feature = "libinput")]
pub mod libinput;
pub mod replay;

use std::io;
use std::os::fd::AsFd;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{Backend, Config};
use crate::event::{DeviceInfo, Event};
use crate::options::DeviceOptions;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[cfg(feature = "libinput")]
    #[error("failed to assign seat {0}")]
    Seat(String),
    #[cfg(feature = "libinput")]
    #[error("failed to add device {}", .0.display())]
    Device(PathBuf),
    #[error("failed to read events: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("line {line}: unknown device {sysname}")]
    UnknownDevice { line: usize, sysname: String },
    #[cfg(not(feature = "libinput"))]
    #[error("the {0} backend needs a build with the `libinput` feature")]
    Unavailable(&'static str),
}

/// A pollable queue of normalized events.
///
/// The file descriptor becomes readable when [`dispatch`](Self::dispatch)
/// would make new events available.
pub trait EventSource: AsFd {
    /// Pull pending input into the internal queue. Never blocks.
    fn dispatch(&mut self) -> Result<(), SourceError>;

    fn next_event(&mut self) -> Option<Event>;

    /// Push `options` onto the live device behind `device`.
    fn apply_config(&mut self, device: &DeviceInfo, options: &DeviceOptions);

    /// True once the source can produce no further events.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Open the backend selected in `config`.
pub fn open(config: &Config) -> Result<Box<dyn EventSource>, SourceError> {
    match &config.backend {
        Backend::Replay(path) => Ok(Box::new(replay::ReplaySource::open(path)?)),
        #[cfg(feature = "libinput")]
        Backend::Udev { seat } => Ok(Box::new(libinput::LibinputSource::open_udev(
            seat,
            config.grab,
        )?)),
        #[cfg(feature = "libinput")]
        Backend::Path(path) => Ok(Box::new(libinput::LibinputSource::open_path(
            path,
            config.grab,
        )?)),
        #[cfg(not(feature = "libinput"))]
        Backend::Udev { .. } => Err(SourceError::Unavailable("udev")),
        #[cfg(not(feature = "libinput"))]
        Backend::Path(_) => Err(SourceError::Unavailable("device")),
    }
}

/// Time origin for relative timestamps, in the clock the backend stamps
/// its events with.
pub fn start_time(backend: &Backend) -> Result<u32, SourceError> {
    match backend {
        Backend::Replay(_) => Ok(0),
        Backend::Udev { .. } | Backend::Path(_) => monotonic_ms(),
    }
}

fn monotonic_ms() -> Result<u32, SourceError> {
    use nix::time::{clock_gettime, ClockId};

    let now = clock_gettime(ClockId::CLOCK_MONOTONIC).map_err(io::Error::from)?;
    let ms = now.tv_sec() as u64 * 1000 + now.tv_nsec() as u64 / 1_000_000;
    // Event times are 32-bit milliseconds and wrap the same way.
    Ok(ms as u32)
}
