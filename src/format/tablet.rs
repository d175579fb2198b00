use evdevil::event::Key;

use super::changed;
use crate::event::{
    AxisValue, PadAxis, ProximityState, TabletAxes, TabletButton, TabletTool, TabletToolProximity,
    TabletToolTip, TipState, ToolAxis,
};

/// Buttons listed in the proximity capability summary, in print order.
const TOOL_BUTTONS: [(Key, &str); 8] = [
    (Key::BTN_TOUCH, "T"),
    (Key::BTN_STYLUS, "S"),
    (Key::BTN_STYLUS2, "S2"),
    (Key::BTN_LEFT, "L"),
    (Key::BTN_MIDDLE, "M"),
    (Key::BTN_RIGHT, "R"),
    (Key::BTN_SIDE, "Sd"),
    (Key::BTN_EXTRA, "Ex"),
];

/// Which optional axis groups get printed for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisPresence {
    tilt: bool,
    distance_or_pressure: bool,
    rotation: bool,
    slider: bool,
    wheel: bool,
}

impl AxisPresence {
    fn of(tool: &TabletTool) -> Self {
        Self {
            tilt: tool.has_axis(ToolAxis::Tilt),
            distance_or_pressure: tool.has_axis(ToolAxis::Distance)
                || tool.has_axis(ToolAxis::Pressure),
            rotation: tool.has_axis(ToolAxis::Rotation),
            slider: tool.has_axis(ToolAxis::Slider),
            wheel: tool.has_axis(ToolAxis::Wheel),
        }
    }
}

fn value(axis: AxisValue) -> String {
    format!("{:.2}{}", axis.value, changed(axis.changed))
}

/// Axis block shared by TABLET_TOOL_AXIS and proximity-in.
pub fn axes(line: &mut String, tool: &TabletTool, axes: &TabletAxes) {
    let presence = AxisPresence::of(tool);

    line.push_str(&format!("\t{}/{}", value(axes.x), value(axes.y)));

    if presence.tilt {
        line.push_str(&format!(
            "\ttilt: {}/{}",
            value(axes.tilt_x),
            value(axes.tilt_y)
        ));
    }

    // One slot for both: a hovering tool reports distance, a touching one
    // pressure.
    if presence.distance_or_pressure {
        if axes.distance.value != 0.0 {
            line.push_str(&format!("\tdistance: {}", value(axes.distance)));
        } else {
            line.push_str(&format!("\tpressure: {}", value(axes.pressure)));
        }
    }

    if presence.rotation {
        line.push_str(&format!("\trotation: {}", value(axes.rotation)));
    }

    if presence.slider {
        line.push_str(&format!("\tslider: {}", value(axes.slider)));
    }

    if presence.wheel {
        line.push_str(&format!(
            "\twheel: {} ({})",
            value(axes.wheel),
            axes.wheel_discrete
        ));
    }
}

/// Hex with a `0x` prefix, except zero which prints as a bare `0`.
fn alt_hex(value: u64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{:#x}", value)
    }
}

pub fn proximity(line: &mut String, event: &TabletToolProximity) {
    let tool = &event.tool;
    let state = match event.state {
        ProximityState::In => {
            axes(line, tool, &event.axes);
            "proximity-in"
        }
        ProximityState::Out => {
            line.push('\t');
            "proximity-out"
        }
    };

    line.push_str(&format!(
        "\t{} ({}, id {}) {}",
        tool.tool_type.as_str(),
        alt_hex(tool.serial),
        alt_hex(tool.tool_id),
        state
    ));

    line.push_str("\taxes:");
    for axis in ToolAxis::ALL {
        if tool.has_axis(axis) {
            line.push(axis.letter());
        }
    }

    line.push_str("\tbtn:");
    for (key, label) in TOOL_BUTTONS {
        if tool.has_button(u32::from(key.raw())) {
            line.push_str(label);
        }
    }
}

pub fn tip(line: &mut String, event: &TabletToolTip) {
    line.push_str(match event.state {
        TipState::Down => "down",
        TipState::Up => "up",
    });
}

pub fn button(line: &mut String, event: &TabletButton) {
    line.push_str(&format!(
        "{:3} {}, seat count: {}",
        event.button,
        event.state.as_str(),
        event.seat_button_count
    ));
}

/// Ring or strip; `kind` names which.
pub fn pad_axis(line: &mut String, kind: &str, event: &PadAxis) {
    line.push_str(&format!(
        "{} {} position {:.2} (source {})",
        kind,
        event.number,
        event.position,
        event.source.as_str()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ButtonState, PadSource, ToolType};

    fn pen(axes: Vec<ToolAxis>, buttons: Vec<u32>) -> TabletTool {
        TabletTool {
            tool_type: ToolType::Pen,
            serial: 0x1234,
            tool_id: 0,
            axes,
            buttons,
        }
    }

    #[test]
    fn test_xy_only() {
        let tool = pen(vec![], vec![]);
        let sample = TabletAxes {
            x: AxisValue::new(10.5, true),
            y: AxisValue::new(20.25, false),
            ..Default::default()
        };
        let mut line = String::new();
        axes(&mut line, &tool, &sample);
        assert_eq!(line, "\t10.50*/20.25");
    }

    #[test]
    fn test_distance_wins_when_nonzero() {
        let tool = pen(vec![ToolAxis::Distance, ToolAxis::Pressure], vec![]);
        let hovering = TabletAxes {
            distance: AxisValue::new(0.5, true),
            pressure: AxisValue::new(0.0, false),
            ..Default::default()
        };
        let mut line = String::new();
        axes(&mut line, &tool, &hovering);
        assert!(line.ends_with("\tdistance: 0.50*"), "{:?}", line);

        let touching = TabletAxes {
            distance: AxisValue::new(0.0, true),
            pressure: AxisValue::new(0.75, true),
            ..Default::default()
        };
        let mut line = String::new();
        axes(&mut line, &tool, &touching);
        assert!(line.ends_with("\tpressure: 0.75*"), "{:?}", line);
    }

    #[test]
    fn test_all_axes_in_order() {
        let tool = pen(ToolAxis::ALL.to_vec(), vec![]);
        let sample = TabletAxes {
            tilt_x: AxisValue::new(-5.0, true),
            tilt_y: AxisValue::new(5.0, false),
            pressure: AxisValue::new(0.5, false),
            rotation: AxisValue::new(90.0, true),
            slider: AxisValue::new(-0.5, false),
            wheel: AxisValue::new(15.0, true),
            wheel_discrete: 1,
            ..Default::default()
        };
        let mut line = String::new();
        axes(&mut line, &tool, &sample);
        assert_eq!(
            line,
            "\t0.00/0.00\ttilt: -5.00*/5.00\tpressure: 0.50\trotation: 90.00*\
             \tslider: -0.50\twheel: 15.00* (1)"
        );
    }

    #[test]
    fn test_proximity_out_skips_axes() {
        let event = TabletToolProximity {
            time: 0,
            tool: pen(
                vec![ToolAxis::Pressure, ToolAxis::Tilt],
                vec![
                    u32::from(Key::BTN_TOUCH.raw()),
                    u32::from(Key::BTN_STYLUS.raw()),
                    u32::from(Key::BTN_STYLUS2.raw()),
                ],
            ),
            state: ProximityState::Out,
            axes: TabletAxes::default(),
        };
        let mut line = String::new();
        proximity(&mut line, &event);
        assert_eq!(
            line,
            "\t\tpen (0x1234, id 0) proximity-out\taxes:pt\tbtn:TSS2"
        );
    }

    #[test]
    fn test_proximity_in_prints_axes_first() {
        let event = TabletToolProximity {
            time: 0,
            tool: TabletTool {
                tool_type: ToolType::Mouse,
                serial: 0,
                tool_id: 0x802,
                axes: vec![],
                buttons: vec![
                    u32::from(Key::BTN_LEFT.raw()),
                    u32::from(Key::BTN_RIGHT.raw()),
                    u32::from(Key::BTN_EXTRA.raw()),
                ],
            },
            state: ProximityState::In,
            axes: TabletAxes {
                x: AxisValue::new(1.0, true),
                y: AxisValue::new(2.0, true),
                ..Default::default()
            },
        };
        let mut line = String::new();
        proximity(&mut line, &event);
        assert_eq!(
            line,
            "\t1.00*/2.00*\tmouse (0, id 0x802) proximity-in\taxes:\tbtn:LREx"
        );
    }

    #[test]
    fn test_tip_and_button() {
        let mut line = String::new();
        tip(
            &mut line,
            &TabletToolTip {
                time: 0,
                state: TipState::Down,
            },
        );
        assert_eq!(line, "down");

        let mut line = String::new();
        button(
            &mut line,
            &TabletButton {
                time: 0,
                button: 3,
                state: ButtonState::Released,
                seat_button_count: 0,
            },
        );
        assert_eq!(line, "  3 released, seat count: 0");
    }

    #[test]
    fn test_pad_ring_and_strip() {
        let mut line = String::new();
        pad_axis(
            &mut line,
            "ring",
            &PadAxis {
                time: 0,
                number: 0,
                position: 180.0,
                source: PadSource::Finger,
            },
        );
        assert_eq!(line, "ring 0 position 180.00 (source finger)");

        let mut line = String::new();
        pad_axis(
            &mut line,
            "strip",
            &PadAxis {
                time: 0,
                number: 1,
                position: -1.0,
                source: PadSource::Invalid,
            },
        );
        assert_eq!(line, "strip 1 position -1.00 (source <invalid>)");
    }
}
