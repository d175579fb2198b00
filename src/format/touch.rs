use crate::event::{GestureBoundary, GestureMotion, PinchMotion, TouchPoint};

pub fn point(line: &mut String, event: &TouchPoint) {
    line.push_str(&format!(
        "{} ({}) {:5.2}/{:5.2} ({:5.2}/{:5.2}mm)",
        event.slot, event.seat_slot, event.x, event.y, event.x_mm, event.y_mm
    ));
}

/// Finger count; the cancelled flag only means something on END events.
pub fn gesture_boundary(line: &mut String, event: &GestureBoundary, is_end: bool) {
    line.push_str(&format!("{}", event.finger_count));
    if is_end && event.cancelled {
        line.push_str(" cancelled");
    }
}

pub fn gesture_motion(line: &mut String, event: &GestureMotion) {
    line.push_str(&format!(
        "{} {:5.2}/{:5.2} ({:5.2}/{:5.2} unaccelerated)",
        event.finger_count, event.dx, event.dy, event.dx_unaccelerated, event.dy_unaccelerated
    ));
}

pub fn pinch_motion(line: &mut String, event: &PinchMotion) {
    gesture_motion(line, &event.motion);
    line.push_str(&format!(" {:5.2} @ {:5.2}", event.scale, event.angle_delta));
}
