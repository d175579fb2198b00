//! Live input through libinput, either a udev seat or a single device node.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::rc::Rc;

use input::event::device::DeviceEvent;
use input::event::gesture::{
    GestureEndEvent, GestureEvent, GestureEventCoordinates, GestureEventTrait,
    GesturePinchEvent, GesturePinchEventTrait, GestureSwipeEvent,
};
use input::event::keyboard::{KeyState, KeyboardEvent, KeyboardEventTrait};
use input::event::pointer::{self, PointerEvent, PointerEventTrait};
use input::event::tablet_pad::{RingAxisSource, StripAxisSource, TabletPadEvent, TabletPadEventTrait};
use input::event::tablet_tool::{
    self, TabletToolEvent, TabletToolEventTrait, TabletToolType,
};
use input::event::touch::{TouchEvent, TouchEventPosition, TouchEventSlot, TouchEventTrait};
use input::event::EventTrait;
use input::{AsRaw, DeviceCapability, DeviceConfigError, Libinput, LibinputInterface};
use nix::errno::Errno;
use nix::fcntl::OFlag;

use super::{EventSource, SourceError};
use crate::apply::{self, ConfigError, ConfigurableDevice};
use crate::event::{
    AxisValue, ButtonState, Capability, DeviceConfigInfo, DeviceInfo, Event, EventKind,
    GestureBoundary, GestureMotion, GroupId, KeyboardKey, PadAxis, PadSource, PinchMotion,
    PointerAxis, PointerButton, PointerMotion, PointerMotionAbsolute, ProximityState, Seat,
    TabletAxes, TabletButton, TabletTool, TabletToolAxis, TabletToolProximity, TabletToolTip,
    TipState, ToolAxis, ToolType, TouchMarker, TouchPoint,
};
use crate::options::{
    AccelProfile, ClickMethod, DeviceOptions, ScrollMethod, Setting, TapButtonMap,
};

nix::ioctl_write_int!(eviocgrab, b'E', 0x90);

/// Logical output surface absolute coordinates are transformed onto.
const SURFACE_WIDTH: u32 = 100;
const SURFACE_HEIGHT: u32 = 100;

/// Button codes probed when snapshotting a tablet tool.
const TOOL_BUTTON_RANGE: std::ops::Range<u32> = 0x100..0x160;

struct Interface {
    grab: bool,
}

impl LibinputInterface for Interface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> Result<OwnedFd, i32> {
        let access = OFlag::from_bits_truncate(flags) & OFlag::O_ACCMODE;
        let file = OpenOptions::new()
            .custom_flags(flags)
            .read(access == OFlag::O_RDONLY || access == OFlag::O_RDWR)
            .write(access == OFlag::O_WRONLY || access == OFlag::O_RDWR)
            .open(path)
            .map_err(|e| {
                log::error!("Failed to open {} ({})", path.display(), e);
                e.raw_os_error().unwrap_or(Errno::EIO as i32)
            })?;

        if self.grab {
            // SAFETY: the descriptor is open and EVIOCGRAB takes an int.
            if let Err(e) = unsafe { eviocgrab(file.as_raw_fd(), 1) } {
                log::warn!("Grab requested, but failed for {} ({})", path.display(), e);
            }
        }

        Ok(file.into())
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        drop(File::from(fd));
    }
}

pub struct LibinputSource {
    context: Libinput,
    /// Live handles by sysname, for applying configuration.
    devices: HashMap<String, input::Device>,
    snapshots: HashMap<String, Rc<DeviceInfo>>,
    /// Pressed pad buttons per logical seat; libinput has no seat count for
    /// pads.
    pad_buttons: HashMap<String, u32>,
}

impl LibinputSource {
    pub fn open_udev(seat: &str, grab: bool) -> Result<Self, SourceError> {
        let mut context = Libinput::new_with_udev(Interface { grab });
        context
            .udev_assign_seat(seat)
            .map_err(|()| SourceError::Seat(seat.to_string()))?;
        log::info!("Listening on udev seat {}", seat);
        Ok(Self::new(context))
    }

    pub fn open_path(path: &Path, grab: bool) -> Result<Self, SourceError> {
        let mut context = Libinput::new_from_path(Interface { grab });
        let added = path
            .to_str()
            .and_then(|p| context.path_add_device(p));
        if added.is_none() {
            return Err(SourceError::Device(path.to_path_buf()));
        }
        log::info!("Listening on {}", path.display());
        Ok(Self::new(context))
    }

    fn new(context: Libinput) -> Self {
        Self {
            context,
            devices: HashMap::new(),
            snapshots: HashMap::new(),
            pad_buttons: HashMap::new(),
        }
    }

    fn device_info(&mut self, device: &input::Device) -> Rc<DeviceInfo> {
        let sysname = device.sysname();
        if let Some(info) = self.snapshots.get(sysname) {
            return Rc::clone(info);
        }
        let info = Rc::new(snapshot(device));
        self.snapshots.insert(info.sysname.clone(), Rc::clone(&info));
        info
    }

    fn pad_button_count(&mut self, seat: &str, state: ButtonState) -> u32 {
        let count = self.pad_buttons.entry(seat.to_string()).or_insert(0);
        match state {
            ButtonState::Pressed => *count += 1,
            ButtonState::Released => *count = count.saturating_sub(1),
        }
        *count
    }

    fn translate(&mut self, event: input::Event) -> Option<Event> {
        let device = event.device();

        let kind = match event {
            input::Event::Device(DeviceEvent::Added(_)) => {
                let info = Rc::new(snapshot(&device));
                self.snapshots.insert(info.sysname.clone(), Rc::clone(&info));
                self.devices.insert(info.sysname.clone(), device);
                return Some(Event::new(info, EventKind::DeviceAdded));
            }
            input::Event::Device(DeviceEvent::Removed(_)) => {
                let sysname = device.sysname().to_string();
                self.devices.remove(&sysname);
                let info = self
                    .snapshots
                    .remove(&sysname)
                    .unwrap_or_else(|| Rc::new(snapshot(&device)));
                return Some(Event::new(info, EventKind::DeviceRemoved));
            }
            input::Event::Keyboard(KeyboardEvent::Key(e)) => EventKind::KeyboardKey(KeyboardKey {
                time: e.time(),
                key: e.key(),
                state: match e.key_state() {
                    KeyState::Pressed => ButtonState::Pressed,
                    KeyState::Released => ButtonState::Released,
                },
            }),
            input::Event::Pointer(PointerEvent::Motion(e)) => {
                EventKind::PointerMotion(PointerMotion {
                    time: e.time(),
                    dx: e.dx(),
                    dy: e.dy(),
                })
            }
            input::Event::Pointer(PointerEvent::MotionAbsolute(e)) => {
                EventKind::PointerMotionAbsolute(PointerMotionAbsolute {
                    time: e.time(),
                    x: e.absolute_x_transformed(SURFACE_WIDTH),
                    y: e.absolute_y_transformed(SURFACE_HEIGHT),
                })
            }
            input::Event::Pointer(PointerEvent::Button(e)) => {
                EventKind::PointerButton(PointerButton {
                    time: e.time(),
                    button: e.button(),
                    state: button_state(e.button_state()),
                    seat_button_count: e.seat_button_count(),
                })
            }
            #[allow(deprecated)]
            input::Event::Pointer(PointerEvent::Axis(e)) => {
                let axis = |a: pointer::Axis| e.has_axis(a).then(|| e.axis_value(a));
                EventKind::PointerAxis(PointerAxis {
                    time: e.time(),
                    vertical: axis(pointer::Axis::Vertical),
                    horizontal: axis(pointer::Axis::Horizontal),
                })
            }
            input::Event::Touch(TouchEvent::Down(e)) => EventKind::TouchDown(touch_point(&e)),
            input::Event::Touch(TouchEvent::Motion(e)) => EventKind::TouchMotion(touch_point(&e)),
            input::Event::Touch(TouchEvent::Up(e)) => {
                EventKind::TouchUp(TouchMarker { time: e.time() })
            }
            input::Event::Touch(TouchEvent::Cancel(e)) => {
                EventKind::TouchCancel(TouchMarker { time: e.time() })
            }
            input::Event::Touch(TouchEvent::Frame(e)) => {
                EventKind::TouchFrame(TouchMarker { time: e.time() })
            }
            input::Event::Gesture(GestureEvent::Swipe(GestureSwipeEvent::Begin(e))) => {
                EventKind::GestureSwipeBegin(GestureBoundary {
                    time: e.time(),
                    finger_count: e.finger_count(),
                    cancelled: false,
                })
            }
            input::Event::Gesture(GestureEvent::Swipe(GestureSwipeEvent::Update(e))) => {
                EventKind::GestureSwipeUpdate(gesture_motion(&e))
            }
            input::Event::Gesture(GestureEvent::Swipe(GestureSwipeEvent::End(e))) => {
                EventKind::GestureSwipeEnd(GestureBoundary {
                    time: e.time(),
                    finger_count: e.finger_count(),
                    cancelled: e.cancelled(),
                })
            }
            input::Event::Gesture(GestureEvent::Pinch(GesturePinchEvent::Begin(e))) => {
                EventKind::GesturePinchBegin(GestureBoundary {
                    time: e.time(),
                    finger_count: e.finger_count(),
                    cancelled: false,
                })
            }
            input::Event::Gesture(GestureEvent::Pinch(GesturePinchEvent::Update(e))) => {
                EventKind::GesturePinchUpdate(PinchMotion {
                    motion: gesture_motion(&e),
                    scale: e.scale(),
                    angle_delta: e.angle_delta(),
                })
            }
            input::Event::Gesture(GestureEvent::Pinch(GesturePinchEvent::End(e))) => {
                EventKind::GesturePinchEnd(GestureBoundary {
                    time: e.time(),
                    finger_count: e.finger_count(),
                    cancelled: e.cancelled(),
                })
            }
            input::Event::Tablet(TabletToolEvent::Axis(e)) => {
                EventKind::TabletToolAxis(TabletToolAxis {
                    time: e.time(),
                    tool: tool(&e.tool()),
                    axes: tablet_axes(&e),
                })
            }
            input::Event::Tablet(TabletToolEvent::Proximity(e)) => {
                EventKind::TabletToolProximity(TabletToolProximity {
                    time: e.time(),
                    tool: tool(&e.tool()),
                    state: match e.proximity_state() {
                        tablet_tool::ProximityState::In => ProximityState::In,
                        tablet_tool::ProximityState::Out => ProximityState::Out,
                    },
                    axes: tablet_axes(&e),
                })
            }
            input::Event::Tablet(TabletToolEvent::Tip(e)) => {
                EventKind::TabletToolTip(TabletToolTip {
                    time: e.time(),
                    state: match e.tip_state() {
                        tablet_tool::TipState::Down => TipState::Down,
                        tablet_tool::TipState::Up => TipState::Up,
                    },
                })
            }
            input::Event::Tablet(TabletToolEvent::Button(e)) => {
                EventKind::TabletToolButton(TabletButton {
                    time: e.time(),
                    button: e.button(),
                    state: button_state(e.button_state()),
                    seat_button_count: e.seat_button_count(),
                })
            }
            input::Event::TabletPad(TabletPadEvent::Button(e)) => {
                let state = button_state(e.button_state());
                let seat = device.seat().logical_name().to_string();
                EventKind::TabletPadButton(TabletButton {
                    time: e.time(),
                    button: e.button_number(),
                    state,
                    seat_button_count: self.pad_button_count(&seat, state),
                })
            }
            input::Event::TabletPad(TabletPadEvent::Ring(e)) => {
                EventKind::TabletPadRing(PadAxis {
                    time: e.time(),
                    number: e.number(),
                    position: e.position(),
                    source: match e.source() {
                        RingAxisSource::Finger => PadSource::Finger,
                        RingAxisSource::Unknown => PadSource::Unknown,
                        #[allow(unreachable_patterns)]
                        _ => PadSource::Invalid,
                    },
                })
            }
            input::Event::TabletPad(TabletPadEvent::Strip(e)) => {
                EventKind::TabletPadStrip(PadAxis {
                    time: e.time(),
                    number: e.number(),
                    position: e.position(),
                    source: match e.source() {
                        StripAxisSource::Finger => PadSource::Finger,
                        StripAxisSource::Unknown => PadSource::Unknown,
                        #[allow(unreachable_patterns)]
                        _ => PadSource::Invalid,
                    },
                })
            }
            other => {
                log::debug!("Skipping unhandled event {:?}", other);
                return None;
            }
        };

        Some(Event::new(self.device_info(&device), kind))
    }
}

fn button_state(state: pointer::ButtonState) -> ButtonState {
    match state {
        pointer::ButtonState::Pressed => ButtonState::Pressed,
        pointer::ButtonState::Released => ButtonState::Released,
    }
}

fn touch_point<E: TouchEventTrait + TouchEventSlot + TouchEventPosition>(e: &E) -> TouchPoint {
    TouchPoint {
        time: e.time(),
        slot: e.slot().map_or(-1, |s| s as i32),
        seat_slot: e.seat_slot() as i32,
        x: e.x_transformed(SURFACE_WIDTH),
        y: e.y_transformed(SURFACE_HEIGHT),
        x_mm: e.x(),
        y_mm: e.y(),
    }
}

fn gesture_motion<E: GestureEventTrait + GestureEventCoordinates>(e: &E) -> GestureMotion {
    GestureMotion {
        time: e.time(),
        finger_count: e.finger_count(),
        dx: e.dx(),
        dy: e.dy(),
        dx_unaccelerated: e.dx_unaccelerated(),
        dy_unaccelerated: e.dy_unaccelerated(),
    }
}

fn tool(tool: &input::event::tablet_tool::TabletTool) -> TabletTool {
    let tool_type = match tool.tool_type() {
        Some(TabletToolType::Pen) => ToolType::Pen,
        Some(TabletToolType::Eraser) => ToolType::Eraser,
        Some(TabletToolType::Brush) => ToolType::Brush,
        Some(TabletToolType::Pencil) => ToolType::Pencil,
        Some(TabletToolType::Airbrush) => ToolType::Airbrush,
        Some(TabletToolType::Mouse) => ToolType::Mouse,
        Some(TabletToolType::Lens) => ToolType::Lens,
        other => panic!("libinput reported an unknown tablet tool type {:?}", other),
    };

    let axes = ToolAxis::ALL
        .into_iter()
        .filter(|axis| match axis {
            ToolAxis::Distance => tool.has_distance(),
            ToolAxis::Pressure => tool.has_pressure(),
            ToolAxis::Tilt => tool.has_tilt(),
            ToolAxis::Rotation => tool.has_rotation(),
            ToolAxis::Slider => tool.has_slider(),
            ToolAxis::Wheel => tool.has_wheel(),
        })
        .collect();

    TabletTool {
        tool_type,
        serial: tool.serial(),
        tool_id: tool.tool_id(),
        axes,
        buttons: TOOL_BUTTON_RANGE.filter(|&b| tool.has_button(b)).collect(),
    }
}

fn tablet_axes<E: TabletToolEventTrait>(e: &E) -> TabletAxes {
    TabletAxes {
        x: AxisValue::new(e.x(), e.x_has_changed()),
        y: AxisValue::new(e.y(), e.y_has_changed()),
        tilt_x: AxisValue::new(e.tilt_x(), e.tilt_x_has_changed()),
        tilt_y: AxisValue::new(e.tilt_y(), e.tilt_y_has_changed()),
        distance: AxisValue::new(e.distance(), e.distance_has_changed()),
        pressure: AxisValue::new(e.pressure(), e.pressure_has_changed()),
        rotation: AxisValue::new(e.rotation(), e.rotation_has_changed()),
        slider: AxisValue::new(e.slider_position(), e.slider_has_changed()),
        wheel: AxisValue::new(e.wheel_delta(), e.wheel_has_changed()),
        wheel_discrete: e.wheel_delta_discrete() as i32,
    }
}

fn snapshot(device: &input::Device) -> DeviceInfo {
    let seat = device.seat();
    let capabilities = Capability::ALL
        .into_iter()
        .filter(|&capability| {
            device.has_capability(match capability {
                Capability::Keyboard => DeviceCapability::Keyboard,
                Capability::Pointer => DeviceCapability::Pointer,
                Capability::Touch => DeviceCapability::Touch,
                Capability::Gesture => DeviceCapability::Gesture,
                Capability::TabletTool => DeviceCapability::TabletTool,
                Capability::TabletPad => DeviceCapability::TabletPad,
            })
        })
        .collect();

    let left_handed = device.config_left_handed_is_available();

    let scroll_methods = device
        .config_scroll_methods()
        .into_iter()
        .filter_map(|m| match m {
            input::ScrollMethod::NoScroll => Some(ScrollMethod::None),
            input::ScrollMethod::TwoFinger => Some(ScrollMethod::TwoFinger),
            input::ScrollMethod::Edge => Some(ScrollMethod::Edge),
            input::ScrollMethod::OnButtonDown => Some(ScrollMethod::Button),
            #[allow(unreachable_patterns)]
            _ => None,
        })
        .collect();

    let click_methods = device
        .config_click_methods()
        .into_iter()
        .filter_map(|m| match m {
            input::ClickMethod::ButtonAreas => Some(ClickMethod::ButtonAreas),
            input::ClickMethod::Clickfinger => Some(ClickMethod::Clickfinger),
            #[allow(unreachable_patterns)]
            _ => None,
        })
        .collect();

    DeviceInfo {
        sysname: device.sysname().to_string(),
        name: device.name().to_string(),
        seat: Seat {
            physical: seat.physical_name().to_string(),
            logical: seat.logical_name().to_string(),
        },
        group: GroupId(device.device_group().as_raw() as usize as u64),
        capabilities,
        size: device.size(),
        config: DeviceConfigInfo {
            tap_finger_count: device.config_tap_finger_count(),
            drag_lock: device.config_tap_drag_lock_enabled(),
            left_handed,
            natural_scroll: device.config_scroll_has_natural_scroll(),
            calibration: device.config_calibration_has_matrix(),
            scroll_methods,
            click_methods,
            dwt: device
                .config_dwt_is_available()
                .then(|| device.config_dwt_enabled()),
        },
    }
}

impl AsFd for LibinputSource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.context.as_fd()
    }
}

impl EventSource for LibinputSource {
    fn dispatch(&mut self) -> Result<(), SourceError> {
        self.context.dispatch()?;
        Ok(())
    }

    fn next_event(&mut self) -> Option<Event> {
        while let Some(event) = self.context.next() {
            if let Some(event) = self.translate(event) {
                return Some(event);
            }
        }
        None
    }

    fn apply_config(&mut self, device: &DeviceInfo, options: &DeviceOptions) {
        match self.devices.get_mut(&device.sysname) {
            Some(live) => {
                apply::apply_device_config(&mut LiveDevice(live), options);
            }
            None => log::warn!("{}: device is gone, not configuring", device.sysname),
        }
    }
}

struct LiveDevice<'a>(&'a mut input::Device);

impl ConfigurableDevice for LiveDevice<'_> {
    fn sysname(&self) -> &str {
        self.0.sysname()
    }

    fn accel_is_available(&self) -> bool {
        self.0.config_accel_is_available()
    }

    fn apply(&mut self, setting: Setting) -> Result<(), ConfigError> {
        let device = &mut *self.0;
        let result = match setting {
            Setting::Tap(on) => device.config_tap_set_enabled(on),
            Setting::TapButtonMap(map) => device.config_tap_set_button_map(match map {
                TapButtonMap::Lrm => input::TapButtonMap::LeftRightMiddle,
                TapButtonMap::Lmr => input::TapButtonMap::LeftMiddleRight,
            }),
            Setting::Drag(on) => device.config_tap_set_drag_enabled(on),
            Setting::DragLock(on) => device.config_tap_set_drag_lock_enabled(on),
            Setting::NaturalScroll(on) => device.config_scroll_set_natural_scroll_enabled(on),
            Setting::LeftHanded(on) => device.config_left_handed_set(on),
            Setting::MiddleEmulation(on) => device.config_middle_emulation_set_enabled(on),
            Setting::DisableWhileTyping(on) => device.config_dwt_set_enabled(on),
            Setting::ClickMethod(ClickMethod::None) => {
                // No safe binding for LIBINPUT_CONFIG_CLICK_METHOD_NONE.
                let status = unsafe {
                    input::ffi::libinput_device_config_click_set_method(device.as_raw_mut(), 0)
                };
                return config_status(status);
            }
            Setting::ClickMethod(method) => device.config_click_set_method(match method {
                ClickMethod::Clickfinger => input::ClickMethod::Clickfinger,
                _ => input::ClickMethod::ButtonAreas,
            }),
            Setting::ScrollMethod(method) => device.config_scroll_set_method(match method {
                ScrollMethod::None => input::ScrollMethod::NoScroll,
                ScrollMethod::TwoFinger => input::ScrollMethod::TwoFinger,
                ScrollMethod::Edge => input::ScrollMethod::Edge,
                ScrollMethod::Button => input::ScrollMethod::OnButtonDown,
            }),
            Setting::ScrollButton(button) => device.config_scroll_set_button(button),
            Setting::AccelSpeed(speed) => device.config_accel_set_speed(speed),
            Setting::AccelProfile(profile) => device.config_accel_set_profile(match profile {
                AccelProfile::Adaptive => input::AccelProfile::Adaptive,
                AccelProfile::Flat => input::AccelProfile::Flat,
            }),
        };
        result.map_err(|e| match e {
            DeviceConfigError::Unsupported => ConfigError::Unsupported,
            #[allow(unreachable_patterns)]
            _ => ConfigError::Invalid,
        })
    }
}

fn config_status(status: input::ffi::libinput_config_status) -> Result<(), ConfigError> {
    match status {
        0 => Ok(()),
        1 => Err(ConfigError::Unsupported),
        _ => Err(ConfigError::Invalid),
    }
}
