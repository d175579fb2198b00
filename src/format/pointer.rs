use crate::event::{KeyboardKey, PointerAxis, PointerButton, PointerMotion, PointerMotionAbsolute};
use crate::keys;

pub fn key(line: &mut String, event: &KeyboardKey) {
    line.push_str(&format!(
        "{} ({}) {}",
        keys::key_name(event.key).unwrap_or("???"),
        event.key,
        event.state.as_str()
    ));
}

pub fn motion(line: &mut String, event: &PointerMotion) {
    line.push_str(&format!("{:6.2}/{:6.2}", event.dx, event.dy));
}

pub fn absolute_motion(line: &mut String, event: &PointerMotionAbsolute) {
    line.push_str(&format!("{:6.2}/{:6.2}", event.x, event.y));
}

pub fn button(line: &mut String, event: &PointerButton) {
    line.push_str(&format!(
        "{} ({}) {}, seat count: {}",
        keys::key_name(event.button).unwrap_or("???"),
        event.button,
        event.state.as_str(),
        event.seat_button_count
    ));
}

/// Both axes are always printed; an absent axis reads as 0.00 without the
/// `*` marker.
pub fn axis(line: &mut String, event: &PointerAxis) {
    line.push_str(&format!(
        "vert {:.2}{} horiz {:.2}{}",
        event.vertical.unwrap_or(0.0),
        super::changed(event.vertical.is_some()),
        event.horizontal.unwrap_or(0.0),
        super::changed(event.horizontal.is_some())
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ButtonState;

    fn render_axis(vertical: Option<f64>, horizontal: Option<f64>) -> String {
        let mut line = String::new();
        axis(
            &mut line,
            &PointerAxis {
                time: 0,
                vertical,
                horizontal,
            },
        );
        line
    }

    #[test]
    fn test_key_names() {
        let mut line = String::new();
        key(
            &mut line,
            &KeyboardKey {
                time: 0,
                key: 30,
                state: ButtonState::Pressed,
            },
        );
        assert_eq!(line, "KEY_A (30) pressed");
    }

    #[test]
    fn test_unknown_key_is_marked() {
        let mut line = String::new();
        key(
            &mut line,
            &KeyboardKey {
                time: 0,
                key: 0x2ff,
                state: ButtonState::Released,
            },
        );
        assert_eq!(line, "??? (767) released");
    }

    #[test]
    fn test_button_with_seat_count() {
        let mut line = String::new();
        button(
            &mut line,
            &PointerButton {
                time: 0,
                button: 0x110,
                state: ButtonState::Pressed,
                seat_button_count: 1,
            },
        );
        assert_eq!(line, "BTN_LEFT (272) pressed, seat count: 1");
    }

    #[test]
    fn test_motion_widths() {
        let mut line = String::new();
        motion(
            &mut line,
            &PointerMotion {
                time: 0,
                dx: 12.5,
                dy: -0.25,
            },
        );
        assert_eq!(line, " 12.50/ -0.25");

        let mut line = String::new();
        absolute_motion(
            &mut line,
            &PointerMotionAbsolute {
                time: 0,
                x: 50.0,
                y: 100.0,
            },
        );
        assert_eq!(line, " 50.00/100.00");
    }

    #[test]
    fn test_axis_presence() {
        assert_eq!(render_axis(None, None), "vert 0.00 horiz 0.00");
        assert_eq!(render_axis(Some(-1.5), None), "vert -1.50* horiz 0.00");
        assert_eq!(render_axis(None, Some(2.0)), "vert 0.00 horiz 2.00*");
        assert_eq!(render_axis(Some(1.0), Some(0.0)), "vert 1.00* horiz 0.00*");
    }
}
