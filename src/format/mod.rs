//! One-line text rendering of events.
//!
//! Every line starts with a fixed-width header (device sysname and event
//! kind), followed for everything but device notifications by the time
//! relative to startup, then the kind-specific payload.

mod device;
mod pointer;
mod tablet;
mod touch;

use std::io::{self, Write};

use crate::event::{Event, EventKind};
use crate::labels::GroupLabels;

#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    start_time: u32,
}

impl Formatter {
    /// `start_time` is the source clock in milliseconds at startup.
    pub fn new(start_time: u32) -> Self {
        Self { start_time }
    }

    /// Write the line for `event` to `out` in a single write.
    pub fn format<W: Write + ?Sized>(
        &self,
        event: &Event,
        labels: &mut GroupLabels,
        out: &mut W,
    ) -> io::Result<()> {
        let line = self.render(event, labels);
        out.write_all(line.as_bytes())
    }

    /// Render `event` as a newline-terminated line.
    pub fn render(&self, event: &Event, labels: &mut GroupLabels) -> String {
        let mut line = header(&event.device.sysname, event.kind.name());
        if let Some(time) = event.kind.time() {
            line.push_str(&timestamp(time, self.start_time));
        }

        match &event.kind {
            EventKind::DeviceAdded | EventKind::DeviceRemoved => {
                let label = labels.label(event.device.group);
                device::notify(&mut line, &event.device, label);
            }
            EventKind::KeyboardKey(e) => pointer::key(&mut line, e),
            EventKind::PointerMotion(e) => pointer::motion(&mut line, e),
            EventKind::PointerMotionAbsolute(e) => pointer::absolute_motion(&mut line, e),
            EventKind::PointerButton(e) => pointer::button(&mut line, e),
            EventKind::PointerAxis(e) => pointer::axis(&mut line, e),
            EventKind::TouchDown(e) | EventKind::TouchMotion(e) => touch::point(&mut line, e),
            EventKind::TouchUp(_) | EventKind::TouchCancel(_) | EventKind::TouchFrame(_) => {}
            EventKind::GestureSwipeBegin(e) | EventKind::GesturePinchBegin(e) => {
                touch::gesture_boundary(&mut line, e, false)
            }
            EventKind::GestureSwipeEnd(e) | EventKind::GesturePinchEnd(e) => {
                touch::gesture_boundary(&mut line, e, true)
            }
            EventKind::GestureSwipeUpdate(e) => touch::gesture_motion(&mut line, e),
            EventKind::GesturePinchUpdate(e) => touch::pinch_motion(&mut line, e),
            EventKind::TabletToolAxis(e) => tablet::axes(&mut line, &e.tool, &e.axes),
            EventKind::TabletToolProximity(e) => tablet::proximity(&mut line, e),
            EventKind::TabletToolTip(e) => tablet::tip(&mut line, e),
            EventKind::TabletToolButton(e) | EventKind::TabletPadButton(e) => {
                tablet::button(&mut line, e)
            }
            EventKind::TabletPadRing(e) => tablet::pad_axis(&mut line, "ring", e),
            EventKind::TabletPadStrip(e) => tablet::pad_axis(&mut line, "strip", e),
        }

        line.push('\n');
        line
    }
}

fn header(sysname: &str, kind: &str) -> String {
    format!("{:<7}\t{:<16} ", sysname, kind)
}

fn timestamp(time: u32, start_time: u32) -> String {
    // Both clocks wrap at 2^32 ms; the wrapped difference stays signed.
    let elapsed = f64::from(time.wrapping_sub(start_time) as i32) / 1000.0;
    format!("{:+6.2}s\t", elapsed)
}

/// `*` marks a value that changed in this event.
fn changed(flag: bool) -> &'static str {
    if flag {
        "*"
    } else {
        ""
    }
}
