use crate::event::{Capability, DeviceInfo};
use crate::options::{ClickMethod, ScrollMethod};

/// Payload of DEVICE_ADDED / DEVICE_REMOVED: identity, seat, group label,
/// capabilities and the configuration features the device exposes.
pub fn notify(line: &mut String, device: &DeviceInfo, group_label: u32) {
    line.push_str(&format!(
        "{:<33} {:>5} {:>7} group{}",
        device.name, device.seat.physical, device.seat.logical, group_label
    ));

    line.push_str(" cap:");
    for capability in Capability::ALL {
        if device.has_capability(capability) {
            line.push(capability.letter());
        }
    }

    if let Some((width, height)) = device.size {
        line.push_str(&format!("\tsize {:.2}/{:.2}mm", width, height));
    }

    let config = &device.config;
    if config.tap_finger_count > 0 {
        line.push_str(" tap");
        line.push_str(if config.drag_lock { "(dl on)" } else { "(dl off)" });
    }
    if config.left_handed {
        line.push_str(" left");
    }
    if config.natural_scroll {
        line.push_str(" scroll-nat");
    }
    if config.calibration {
        line.push_str(" calib");
    }

    let scroll: String = [
        (ScrollMethod::TwoFinger, "-2fg"),
        (ScrollMethod::Edge, "-edge"),
        (ScrollMethod::Button, "-button"),
    ]
    .iter()
    .filter(|(method, _)| config.scroll_methods.contains(method))
    .map(|(_, tag)| *tag)
    .collect();
    if !scroll.is_empty() {
        line.push_str(" scroll");
        line.push_str(&scroll);
    }

    let click: String = [
        (ClickMethod::ButtonAreas, "-buttonareas"),
        (ClickMethod::Clickfinger, "-clickfinger"),
    ]
    .iter()
    .filter(|(method, _)| config.click_methods.contains(method))
    .map(|(_, tag)| *tag)
    .collect();
    if !click.is_empty() {
        line.push_str(" click");
        line.push_str(&click);
    }

    match config.dwt {
        Some(true) => line.push_str(" dwt-on"),
        Some(false) => line.push_str(" dwt-off"),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DeviceConfigInfo, GroupId, Seat};

    fn touchpad() -> DeviceInfo {
        DeviceInfo {
            sysname: "event7".into(),
            name: "SynPS/2 Synaptics TouchPad".into(),
            seat: Seat::default(),
            group: GroupId(7),
            capabilities: vec![Capability::Pointer, Capability::Gesture],
            size: Some((100.0, 56.5)),
            config: DeviceConfigInfo {
                tap_finger_count: 3,
                drag_lock: false,
                left_handed: true,
                natural_scroll: true,
                calibration: false,
                scroll_methods: vec![ScrollMethod::Edge, ScrollMethod::TwoFinger],
                click_methods: vec![ClickMethod::ButtonAreas, ClickMethod::Clickfinger],
                dwt: Some(true),
            },
        }
    }

    #[test]
    fn test_touchpad_notification() {
        let mut line = String::new();
        notify(&mut line, &touchpad(), 2);
        assert_eq!(
            line,
            "SynPS/2 Synaptics TouchPad        seat0 default group2 cap:pg\tsize 100.00/56.50mm \
             tap(dl off) left scroll-nat scroll-2fg-edge click-buttonareas-clickfinger dwt-on"
        );
    }

    #[test]
    fn test_plain_device_has_no_config_tags() {
        let device = DeviceInfo {
            capabilities: vec![Capability::Keyboard],
            size: None,
            config: DeviceConfigInfo::default(),
            ..touchpad()
        };
        let mut line = String::new();
        notify(&mut line, &device, 1);
        assert!(line.ends_with(" group1 cap:k"), "{:?}", line);
    }

    #[test]
    fn test_dwt_off_and_drag_lock() {
        let mut device = touchpad();
        device.config.drag_lock = true;
        device.config.dwt = Some(false);
        let mut line = String::new();
        notify(&mut line, &device, 1);
        assert!(line.contains(" tap(dl on)"));
        assert!(line.ends_with(" dwt-off"));
    }

    #[test]
    fn test_capability_letters_in_fixed_order() {
        let device = DeviceInfo {
            capabilities: vec![
                Capability::TabletPad,
                Capability::Touch,
                Capability::Keyboard,
                Capability::TabletTool,
            ],
            size: None,
            config: DeviceConfigInfo::default(),
            ..touchpad()
        };
        let mut line = String::new();
        notify(&mut line, &device, 1);
        assert!(line.ends_with(" cap:ktTP"), "{:?}", line);
    }

    #[test]
    fn test_scroll_none_is_not_listed() {
        let mut device = touchpad();
        device.config.natural_scroll = false;
        device.config.scroll_methods = vec![ScrollMethod::None];
        let mut line = String::new();
        notify(&mut line, &device, 1);
        assert!(!line.contains(" scroll"), "{:?}", line);
    }
}
