//! Replays a recorded event stream: one JSON object per line.
//!
//! ```text
//! {"device":"event3","event":"DEVICE_ADDED","info":{"name":"Logitech Mouse","group":1,"capabilities":["pointer"]}}
//! {"device":"event3","event":"POINTER_MOTION","time":1200,"dx":1.5,"dy":-2.0}
//! ```
//!
//! Devices are introduced by a DEVICE_ADDED record carrying their `info`;
//! every other record refers to a device by sysname. Blank lines and lines
//! starting with `#` are ignored. Times are milliseconds from the start of
//! the recording.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::path::Path;
use std::rc::Rc;

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use serde::Deserialize;

use super::{EventSource, SourceError};
use crate::apply::{self, ConfigError, ConfigurableDevice};
use crate::event::{Capability, DeviceConfigInfo, DeviceInfo, Event, EventKind, GroupId, Seat};
use crate::options::{ClickMethod, DeviceOptions, ScrollMethod, Setting};

const READ_CHUNK: usize = 4096;

/// Device description carried by a DEVICE_ADDED record.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceRecord {
    name: String,
    #[serde(default)]
    seat: Seat,
    group: GroupId,
    #[serde(default)]
    capabilities: Vec<Capability>,
    #[serde(default)]
    size: Option<(f64, f64)>,
    #[serde(default)]
    config: DeviceConfigInfo,
}

impl DeviceRecord {
    fn into_info(self, sysname: String) -> DeviceInfo {
        DeviceInfo {
            sysname,
            name: self.name,
            seat: self.seat,
            group: self.group,
            capabilities: self.capabilities,
            size: self.size,
            config: self.config,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    device: String,
    #[serde(default)]
    info: Option<DeviceRecord>,
    #[serde(flatten)]
    kind: EventKind,
}

pub struct ReplaySource {
    input: File,
    /// File status flags to restore on drop.
    saved_flags: Option<OFlag>,
    pending: Vec<u8>,
    line: usize,
    devices: HashMap<String, Rc<DeviceInfo>>,
    queue: VecDeque<Event>,
    eof: bool,
}

impl ReplaySource {
    /// Open a recording; `-` reads standard input.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let fd: OwnedFd = if path.as_os_str() == "-" {
            io::stdin()
                .as_fd()
                .try_clone_to_owned()
                .map_err(SourceError::Io)?
        } else {
            File::open(path)
                .map_err(|source| SourceError::Open {
                    path: path.to_path_buf(),
                    source,
                })?
                .into()
        };
        log::info!("Replaying events from {}", path.display());
        Self::from_fd(fd)
    }

    /// Replay from an already open descriptor, switching it to non-blocking.
    pub fn from_fd(fd: OwnedFd) -> Result<Self, SourceError> {
        let input = File::from(fd);
        let flags = fcntl(input.as_raw_fd(), FcntlArg::F_GETFL).map_err(io::Error::from)?;
        let flags = OFlag::from_bits_truncate(flags);
        fcntl(
            input.as_raw_fd(),
            FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
        )
        .map_err(io::Error::from)?;

        Ok(Self {
            input,
            saved_flags: Some(flags),
            pending: Vec::new(),
            line: 0,
            devices: HashMap::new(),
            queue: VecDeque::new(),
            eof: false,
        })
    }

    fn parse_pending_lines(&mut self) -> Result<(), SourceError> {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.parse_line(&line)?;
        }
        Ok(())
    }

    fn parse_line(&mut self, raw: &[u8]) -> Result<(), SourceError> {
        self.line += 1;
        let text = String::from_utf8_lossy(raw);
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(());
        }

        let record: Record = serde_json::from_str(text).map_err(|source| SourceError::Parse {
            line: self.line,
            source,
        })?;

        let device = match (&record.kind, record.info) {
            (EventKind::DeviceAdded, Some(recorded)) => {
                let info = Rc::new(recorded.into_info(record.device.clone()));
                self.devices.insert(record.device, Rc::clone(&info));
                info
            }
            (EventKind::DeviceRemoved, _) => {
                self.devices
                    .remove(&record.device)
                    .ok_or_else(|| SourceError::UnknownDevice {
                        line: self.line,
                        sysname: record.device.clone(),
                    })?
            }
            (_, _) => self
                .devices
                .get(&record.device)
                .cloned()
                .ok_or_else(|| SourceError::UnknownDevice {
                    line: self.line,
                    sysname: record.device.clone(),
                })?,
        };

        self.queue.push_back(Event::new(device, record.kind));
        Ok(())
    }
}

impl AsFd for ReplaySource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.input.as_fd()
    }
}

impl EventSource for ReplaySource {
    fn dispatch(&mut self) -> Result<(), SourceError> {
        if self.eof {
            return Ok(());
        }

        let mut chunk = [0u8; READ_CHUNK];
        match self.input.read(&mut chunk) {
            Ok(0) => {
                self.eof = true;
                // A final line without a trailing newline still counts.
                if !self.pending.is_empty() {
                    let rest = std::mem::take(&mut self.pending);
                    self.parse_line(&rest)?;
                }
                log::debug!("Replay finished after {} lines", self.line);
            }
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                self.parse_pending_lines()?;
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {}
            Err(e) => return Err(SourceError::Io(e)),
        }
        Ok(())
    }

    fn next_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    fn apply_config(&mut self, device: &DeviceInfo, options: &DeviceOptions) {
        apply::apply_device_config(&mut RecordedDevice(device), options);
    }

    fn is_closed(&self) -> bool {
        self.eof && self.queue.is_empty()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        if let Some(flags) = self.saved_flags.take() {
            let _ = fcntl(self.input.as_raw_fd(), FcntlArg::F_SETFL(flags));
        }
    }
}

/// Stand-in for a recorded device: accepts what its snapshot says it
/// supports and only logs the change.
struct RecordedDevice<'a>(&'a DeviceInfo);

impl RecordedDevice<'_> {
    fn supports(&self, setting: Setting) -> bool {
        let config = &self.0.config;
        match setting {
            Setting::Tap(_) | Setting::TapButtonMap(_) | Setting::Drag(_) | Setting::DragLock(_) => {
                config.tap_finger_count > 0
            }
            Setting::NaturalScroll(_) => config.natural_scroll,
            Setting::LeftHanded(_) => config.left_handed,
            Setting::MiddleEmulation(_) => self.0.has_capability(Capability::Pointer),
            Setting::DisableWhileTyping(_) => config.dwt.is_some(),
            Setting::ClickMethod(ClickMethod::None) => true,
            Setting::ClickMethod(method) => config.click_methods.contains(&method),
            Setting::ScrollMethod(ScrollMethod::None) => true,
            Setting::ScrollMethod(method) => config.scroll_methods.contains(&method),
            Setting::ScrollButton(_) => config.scroll_methods.contains(&ScrollMethod::Button),
            Setting::AccelSpeed(_) | Setting::AccelProfile(_) => self.accel_is_available(),
        }
    }
}

impl ConfigurableDevice for RecordedDevice<'_> {
    fn sysname(&self) -> &str {
        &self.0.sysname
    }

    fn accel_is_available(&self) -> bool {
        self.0.has_capability(Capability::Pointer)
    }

    fn apply(&mut self, setting: Setting) -> Result<(), ConfigError> {
        if !self.supports(setting) {
            return Err(ConfigError::Unsupported);
        }
        log::info!("{}: would set {}", self.0.sysname, setting);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    use super::*;
    use crate::event::PointerMotion;
    use crate::format::Formatter;
    use crate::labels::GroupLabels;

    const ADDED: &str = r#"{"device":"event3","event":"DEVICE_ADDED","info":{"name":"Test Mouse","group":5,"capabilities":["pointer"]}}"#;

    fn source_with(lines: &[&str]) -> ReplaySource {
        let (mut writer, reader) = UnixStream::pair().unwrap();
        for line in lines {
            writeln!(writer, "{}", line).unwrap();
        }
        drop(writer);
        ReplaySource::from_fd(reader.into()).unwrap()
    }

    fn drain(source: &mut ReplaySource) -> Vec<Event> {
        let mut events = Vec::new();
        while !source.is_closed() {
            source.dispatch().unwrap();
            while let Some(event) = source.next_event() {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn test_replays_device_and_events() {
        let mut source = source_with(&[
            ADDED,
            "",
            "# comment",
            r#"{"device":"event3","event":"POINTER_MOTION","time":1200,"dx":1.5,"dy":-2}"#,
            r#"{"device":"event3","event":"DEVICE_REMOVED"}"#,
        ]);
        let events = drain(&mut source);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, EventKind::DeviceAdded);
        assert_eq!(events[0].device.sysname, "event3");
        assert_eq!(events[0].device.name, "Test Mouse");
        assert_eq!(events[0].device.seat, Seat::default());
        assert_eq!(
            events[1].kind,
            EventKind::PointerMotion(PointerMotion {
                time: 1200,
                dx: 1.5,
                dy: -2.0
            })
        );
        assert!(Rc::ptr_eq(&events[0].device, &events[1].device));
        assert_eq!(events[2].kind, EventKind::DeviceRemoved);
        assert!(source.is_closed());
    }

    #[test]
    fn test_last_line_without_newline() {
        let (mut writer, reader) = UnixStream::pair().unwrap();
        write!(writer, "{}", ADDED).unwrap();
        drop(writer);
        let mut source = ReplaySource::from_fd(reader.into()).unwrap();
        assert_eq!(drain(&mut source).len(), 1);
    }

    #[test]
    fn test_unknown_device_is_an_error() {
        let mut source = source_with(&[
            r#"{"device":"event9","event":"TOUCH_FRAME","time":1}"#,
        ]);
        match source.dispatch() {
            Err(SourceError::UnknownDevice { line, sysname }) => {
                assert_eq!(line, 1);
                assert_eq!(sysname, "event9");
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let mut source = source_with(&[ADDED, r#"{"device":"event3","event":"NOT_AN_EVENT"}"#]);
        match source.dispatch() {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_open_pipe_is_not_closed() {
        let (_writer, reader) = UnixStream::pair().unwrap();
        let mut source = ReplaySource::from_fd(reader.into()).unwrap();
        source.dispatch().unwrap();
        assert!(source.next_event().is_none());
        assert!(!source.is_closed());
    }

    #[test]
    fn test_demo_session_formats_every_record() {
        let lines: Vec<&str> = include_str!("../../demos/session.jsonl").lines().collect();
        let mut source = source_with(&lines);
        let events = drain(&mut source);
        assert_eq!(events.len(), 27);

        let formatter = Formatter::new(0);
        let mut labels = GroupLabels::new();
        let rendered: Vec<String> = events
            .iter()
            .map(|event| formatter.render(event, &mut labels))
            .collect();
        assert!(rendered[1].contains(" group2 cap:pg"), "{:?}", rendered[1]);
        assert!(rendered[2].contains(" group2 cap:p"), "{:?}", rendered[2]);
        assert!(rendered[5].contains("KEY_A (30) pressed"), "{:?}", rendered[5]);
        assert!(rendered.last().unwrap().starts_with("event4 \tDEVICE_REMOVED"));
    }

    #[test]
    fn test_recorded_device_support() {
        let info = DeviceInfo {
            sysname: "event3".into(),
            name: "Touchpad".into(),
            seat: Seat::default(),
            group: GroupId(1),
            capabilities: vec![Capability::Pointer],
            size: None,
            config: DeviceConfigInfo {
                tap_finger_count: 2,
                click_methods: vec![ClickMethod::Clickfinger],
                ..Default::default()
            },
        };
        let mut device = RecordedDevice(&info);
        assert_eq!(device.apply(Setting::Tap(true)), Ok(()));
        assert_eq!(
            device.apply(Setting::ClickMethod(ClickMethod::ButtonAreas)),
            Err(ConfigError::Unsupported)
        );
        assert_eq!(
            device.apply(Setting::LeftHanded(true)),
            Err(ConfigError::Unsupported)
        );
        assert!(device.accel_is_available());
    }
}
