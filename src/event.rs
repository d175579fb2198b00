//! Normalized input events as delivered by an event source.
//!
//! The event kinds form a closed set: every consumer matches on
//! [`EventKind`] exhaustively, so a new kind fails to compile until it is
//! handled everywhere.

use std::rc::Rc;

use serde::Deserialize;

use crate::options::{ClickMethod, ScrollMethod};

/// A seat a device is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Seat {
    pub physical: String,
    pub logical: String,
}

impl Default for Seat {
    fn default() -> Self {
        Self {
            physical: "seat0".into(),
            logical: "default".into(),
        }
    }
}

/// Identity of a device group, i.e. one piece of physical hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Keyboard,
    Pointer,
    Touch,
    Gesture,
    TabletTool,
    TabletPad,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Keyboard,
        Capability::Pointer,
        Capability::Touch,
        Capability::Gesture,
        Capability::TabletTool,
        Capability::TabletPad,
    ];

    pub fn letter(self) -> char {
        match self {
            Capability::Keyboard => 'k',
            Capability::Pointer => 'p',
            Capability::Touch => 't',
            Capability::Gesture => 'g',
            Capability::TabletTool => 'T',
            Capability::TabletPad => 'P',
        }
    }
}

/// Configuration features a device exposes, and their current state where
/// the debug output shows it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceConfigInfo {
    /// Zero if the device cannot tap.
    pub tap_finger_count: u32,
    pub drag_lock: bool,
    pub left_handed: bool,
    pub natural_scroll: bool,
    pub calibration: bool,
    pub scroll_methods: Vec<ScrollMethod>,
    pub click_methods: Vec<ClickMethod>,
    /// `None` if disable-while-typing is unavailable, else its state.
    pub dwt: Option<bool>,
}

/// Snapshot of a device taken by the event source.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub sysname: String,
    pub name: String,
    pub seat: Seat,
    pub group: GroupId,
    pub capabilities: Vec<Capability>,
    /// Physical size in mm.
    pub size: Option<(f64, f64)>,
    pub config: DeviceConfigInfo,
}

impl DeviceInfo {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    Pressed,
    Released,
}

impl ButtonState {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonState::Pressed => "pressed",
            ButtonState::Released => "released",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyboardKey {
    pub time: u32,
    pub key: u32,
    pub state: ButtonState,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointerMotion {
    pub time: u32,
    pub dx: f64,
    pub dy: f64,
}

/// Absolute position already transformed onto the logical output surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointerMotionAbsolute {
    pub time: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointerButton {
    pub time: u32,
    pub button: u32,
    pub state: ButtonState,
    pub seat_button_count: u32,
}

/// Scroll values; an axis is `None` when the event does not carry it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointerAxis {
    pub time: u32,
    #[serde(default)]
    pub vertical: Option<f64>,
    #[serde(default)]
    pub horizontal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TouchPoint {
    pub time: u32,
    pub slot: i32,
    pub seat_slot: i32,
    /// Position on the logical output surface.
    pub x: f64,
    pub y: f64,
    pub x_mm: f64,
    pub y_mm: f64,
}

/// Touch events that carry nothing but a timestamp.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TouchMarker {
    pub time: u32,
}

/// Begin or end of a swipe/pinch gesture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GestureBoundary {
    pub time: u32,
    pub finger_count: i32,
    #[serde(default)]
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GestureMotion {
    pub time: u32,
    pub finger_count: i32,
    pub dx: f64,
    pub dy: f64,
    pub dx_unaccelerated: f64,
    pub dy_unaccelerated: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PinchMotion {
    #[serde(flatten)]
    pub motion: GestureMotion,
    pub scale: f64,
    pub angle_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Pen,
    Eraser,
    Brush,
    Pencil,
    Airbrush,
    Mouse,
    Lens,
}

impl ToolType {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolType::Pen => "pen",
            ToolType::Eraser => "eraser",
            ToolType::Brush => "brush",
            ToolType::Pencil => "pencil",
            ToolType::Airbrush => "airbrush",
            ToolType::Mouse => "mouse",
            ToolType::Lens => "lens",
        }
    }
}

/// Optional axes a tablet tool may support. X/Y are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAxis {
    Distance,
    Pressure,
    Tilt,
    Rotation,
    Slider,
    Wheel,
}

impl ToolAxis {
    pub const ALL: [ToolAxis; 6] = [
        ToolAxis::Distance,
        ToolAxis::Pressure,
        ToolAxis::Tilt,
        ToolAxis::Rotation,
        ToolAxis::Slider,
        ToolAxis::Wheel,
    ];

    pub fn letter(self) -> char {
        match self {
            ToolAxis::Distance => 'd',
            ToolAxis::Pressure => 'p',
            ToolAxis::Tilt => 't',
            ToolAxis::Rotation => 'r',
            ToolAxis::Slider => 's',
            ToolAxis::Wheel => 'w',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabletTool {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub tool_id: u64,
    #[serde(default)]
    pub axes: Vec<ToolAxis>,
    /// Supported `BTN_*` codes.
    #[serde(default)]
    pub buttons: Vec<u32>,
}

impl TabletTool {
    pub fn has_axis(&self, axis: ToolAxis) -> bool {
        self.axes.contains(&axis)
    }

    pub fn has_button(&self, code: u32) -> bool {
        self.buttons.contains(&code)
    }
}

/// One continuous axis and whether it changed since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisValue {
    pub value: f64,
    pub changed: bool,
}

impl AxisValue {
    pub fn new(value: f64, changed: bool) -> Self {
        Self { value, changed }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TabletAxes {
    pub x: AxisValue,
    pub y: AxisValue,
    pub tilt_x: AxisValue,
    pub tilt_y: AxisValue,
    pub distance: AxisValue,
    pub pressure: AxisValue,
    pub rotation: AxisValue,
    pub slider: AxisValue,
    pub wheel: AxisValue,
    pub wheel_discrete: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabletToolAxis {
    pub time: u32,
    pub tool: TabletTool,
    #[serde(default)]
    pub axes: TabletAxes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityState {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabletToolProximity {
    pub time: u32,
    pub tool: TabletTool,
    pub state: ProximityState,
    #[serde(default)]
    pub axes: TabletAxes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipState {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabletToolTip {
    pub time: u32,
    pub state: TipState,
}

/// Button on a tablet tool or a tablet pad.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabletButton {
    pub time: u32,
    pub button: u32,
    pub state: ButtonState,
    #[serde(default)]
    pub seat_button_count: u32,
}

/// What is driving a pad ring or strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PadSource {
    Finger,
    Unknown,
    /// A source value this tool does not know about.
    Invalid,
}

impl From<String> for PadSource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "finger" => PadSource::Finger,
            "unknown" => PadSource::Unknown,
            _ => PadSource::Invalid,
        }
    }
}

impl PadSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PadSource::Finger => "finger",
            PadSource::Unknown => "unknown",
            PadSource::Invalid => "<invalid>",
        }
    }
}

/// Ring or strip position on a tablet pad.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PadAxis {
    pub time: u32,
    pub number: u32,
    pub position: f64,
    pub source: PadSource,
}

/// Kind-specific event payload. The serde tag doubles as the kind name
/// printed in the event header.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    DeviceAdded,
    DeviceRemoved,
    KeyboardKey(KeyboardKey),
    PointerMotion(PointerMotion),
    PointerMotionAbsolute(PointerMotionAbsolute),
    PointerButton(PointerButton),
    PointerAxis(PointerAxis),
    TouchDown(TouchPoint),
    TouchMotion(TouchPoint),
    TouchUp(TouchMarker),
    TouchCancel(TouchMarker),
    TouchFrame(TouchMarker),
    GestureSwipeBegin(GestureBoundary),
    GestureSwipeUpdate(GestureMotion),
    GestureSwipeEnd(GestureBoundary),
    GesturePinchBegin(GestureBoundary),
    GesturePinchUpdate(PinchMotion),
    GesturePinchEnd(GestureBoundary),
    TabletToolAxis(TabletToolAxis),
    TabletToolProximity(TabletToolProximity),
    TabletToolTip(TabletToolTip),
    TabletToolButton(TabletButton),
    TabletPadButton(TabletButton),
    TabletPadRing(PadAxis),
    TabletPadStrip(PadAxis),
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::DeviceAdded => "DEVICE_ADDED",
            EventKind::DeviceRemoved => "DEVICE_REMOVED",
            EventKind::KeyboardKey(_) => "KEYBOARD_KEY",
            EventKind::PointerMotion(_) => "POINTER_MOTION",
            EventKind::PointerMotionAbsolute(_) => "POINTER_MOTION_ABSOLUTE",
            EventKind::PointerButton(_) => "POINTER_BUTTON",
            EventKind::PointerAxis(_) => "POINTER_AXIS",
            EventKind::TouchDown(_) => "TOUCH_DOWN",
            EventKind::TouchMotion(_) => "TOUCH_MOTION",
            EventKind::TouchUp(_) => "TOUCH_UP",
            EventKind::TouchCancel(_) => "TOUCH_CANCEL",
            EventKind::TouchFrame(_) => "TOUCH_FRAME",
            EventKind::GestureSwipeBegin(_) => "GESTURE_SWIPE_BEGIN",
            EventKind::GestureSwipeUpdate(_) => "GESTURE_SWIPE_UPDATE",
            EventKind::GestureSwipeEnd(_) => "GESTURE_SWIPE_END",
            EventKind::GesturePinchBegin(_) => "GESTURE_PINCH_BEGIN",
            EventKind::GesturePinchUpdate(_) => "GESTURE_PINCH_UPDATE",
            EventKind::GesturePinchEnd(_) => "GESTURE_PINCH_END",
            EventKind::TabletToolAxis(_) => "TABLET_TOOL_AXIS",
            EventKind::TabletToolProximity(_) => "TABLET_TOOL_PROXIMITY",
            EventKind::TabletToolTip(_) => "TABLET_TOOL_TIP",
            EventKind::TabletToolButton(_) => "TABLET_TOOL_BUTTON",
            EventKind::TabletPadButton(_) => "TABLET_PAD_BUTTON",
            EventKind::TabletPadRing(_) => "TABLET_PAD_RING",
            EventKind::TabletPadStrip(_) => "TABLET_PAD_STRIP",
        }
    }

    /// Event time in milliseconds. Device notifications carry none.
    pub fn time(&self) -> Option<u32> {
        match self {
            EventKind::DeviceAdded | EventKind::DeviceRemoved => None,
            EventKind::KeyboardKey(e) => Some(e.time),
            EventKind::PointerMotion(e) => Some(e.time),
            EventKind::PointerMotionAbsolute(e) => Some(e.time),
            EventKind::PointerButton(e) => Some(e.time),
            EventKind::PointerAxis(e) => Some(e.time),
            EventKind::TouchDown(e) | EventKind::TouchMotion(e) => Some(e.time),
            EventKind::TouchUp(e) | EventKind::TouchCancel(e) | EventKind::TouchFrame(e) => {
                Some(e.time)
            }
            EventKind::GestureSwipeBegin(e)
            | EventKind::GestureSwipeEnd(e)
            | EventKind::GesturePinchBegin(e)
            | EventKind::GesturePinchEnd(e) => Some(e.time),
            EventKind::GestureSwipeUpdate(e) => Some(e.time),
            EventKind::GesturePinchUpdate(e) => Some(e.motion.time),
            EventKind::TabletToolAxis(e) => Some(e.time),
            EventKind::TabletToolProximity(e) => Some(e.time),
            EventKind::TabletToolTip(e) => Some(e.time),
            EventKind::TabletToolButton(e) | EventKind::TabletPadButton(e) => Some(e.time),
            EventKind::TabletPadRing(e) | EventKind::TabletPadStrip(e) => Some(e.time),
        }
    }
}

/// One event together with the device that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub device: Rc<DeviceInfo>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(device: Rc<DeviceInfo>, kind: EventKind) -> Self {
        Self { device, kind }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn device(sysname: &str, group: u64) -> Rc<DeviceInfo> {
        Rc::new(DeviceInfo {
            sysname: sysname.into(),
            name: format!("Test device {}", sysname),
            seat: Seat::default(),
            group: GroupId(group),
            capabilities: vec![Capability::Pointer],
            size: None,
            config: DeviceConfigInfo::default(),
        })
    }

    pub fn motion(device: &Rc<DeviceInfo>, time: u32, dx: f64, dy: f64) -> Event {
        Event::new(
            Rc::clone(device),
            EventKind::PointerMotion(PointerMotion { time, dx, dy }),
        )
    }

    pub fn added(device: &Rc<DeviceInfo>) -> Event {
        Event::new(Rc::clone(device), EventKind::DeviceAdded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_serde_tags() {
        let kind: EventKind =
            serde_json::from_str(r#"{"event":"POINTER_MOTION_ABSOLUTE","time":5,"x":1.0,"y":2.0}"#)
                .unwrap();
        assert_eq!(kind.name(), "POINTER_MOTION_ABSOLUTE");
        assert_eq!(kind.time(), Some(5));

        let kind: EventKind = serde_json::from_str(r#"{"event":"DEVICE_REMOVED"}"#).unwrap();
        assert_eq!(kind.name(), "DEVICE_REMOVED");
        assert_eq!(kind.time(), None);
    }

    #[test]
    fn test_pinch_update_flattens_motion() {
        let kind: EventKind = serde_json::from_str(
            r#"{"event":"GESTURE_PINCH_UPDATE","time":7,"finger_count":2,"dx":1,"dy":0,
                "dx_unaccelerated":1,"dy_unaccelerated":0,"scale":1.5,"angle_delta":-3}"#,
        )
        .unwrap();
        match kind {
            EventKind::GesturePinchUpdate(p) => {
                assert_eq!(p.motion.finger_count, 2);
                assert_eq!(p.scale, 1.5);
                assert_eq!(p.angle_delta, -3.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_pad_source_is_invalid() {
        let kind: EventKind = serde_json::from_str(
            r#"{"event":"TABLET_PAD_RING","time":1,"number":0,"position":12.5,"source":"wheel"}"#,
        )
        .unwrap();
        match kind {
            EventKind::TabletPadRing(ring) => assert_eq!(ring.source, PadSource::Invalid),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tool_type_is_rejected() {
        let result = serde_json::from_str::<TabletTool>(r#"{"type":"totem"}"#);
        assert!(result.is_err());
    }
}
