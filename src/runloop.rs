//! Drain / poll loop driving an [`EventSource`] into the formatter.

use std::io::Write;
use std::os::fd::{AsFd, BorrowedFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::event::EventKind;
use crate::format::Formatter;
use crate::labels::GroupLabels;
use crate::options::DeviceOptions;
use crate::source::EventSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Stopped,
}

pub struct RunLoop<W: Write> {
    formatter: Formatter,
    labels: GroupLabels,
    options: DeviceOptions,
    stop: Arc<AtomicBool>,
    out: W,
    state: State,
}

impl<W: Write> RunLoop<W> {
    /// `stop` is raised asynchronously (by the SIGINT handler) to end the
    /// loop.
    pub fn new(start_time: u32, options: DeviceOptions, stop: Arc<AtomicBool>, out: W) -> Self {
        Self {
            formatter: Formatter::new(start_time),
            labels: GroupLabels::new(),
            options,
            stop,
            out,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Run until interrupted, the source closes, or an error occurs.
    pub fn run(
        &mut self,
        source: &mut dyn EventSource,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = self.run_inner(source);
        self.state = State::Stopped;
        result
    }

    fn run_inner(
        &mut self,
        source: &mut dyn EventSource,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Devices already present are announced before the first poll.
        if self.drain(source)? == 0 {
            log::warn!(
                "Expected device added events on startup but got none. \
                 Maybe you don't have the right permissions?"
            );
        }
        self.state = State::Running;

        while !self.stop.load(Ordering::SeqCst) {
            if source.is_closed() {
                log::info!("Event source closed");
                break;
            }
            match wait_readable(source.as_fd()) {
                Ok(()) => {}
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(format!("poll failed ({})", e).into()),
            }
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            let count = self.drain(source)?;
            log::debug!("Drained {} events", count);
        }

        if self.stop.load(Ordering::SeqCst) {
            log::info!("Interrupted, stopping");
        }
        Ok(())
    }

    /// Dispatch and format until the source has nothing queued. Returns the
    /// number of events handled.
    fn drain(
        &mut self,
        source: &mut dyn EventSource,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let mut count = 0;
        source.dispatch()?;
        while let Some(event) = source.next_event() {
            self.formatter.format(&event, &mut self.labels, &mut self.out)?;
            if matches!(event.kind, EventKind::DeviceAdded) {
                source.apply_config(&event.device, &self.options);
            }
            count += 1;
            source.dispatch()?;
        }
        Ok(count)
    }
}

fn wait_readable(fd: BorrowedFd<'_>) -> nix::Result<()> {
    let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
    poll(&mut fds, PollTimeout::NONE)?;
    Ok(())
}
