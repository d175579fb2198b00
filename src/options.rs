//! Per-device configuration knobs requested on the command line or in the
//! config file.

use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// How a clickpad turns a physical click into a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickMethod {
    None,
    ButtonAreas,
    Clickfinger,
}

impl fmt::Display for ClickMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickMethod::None => write!(f, "none"),
            ClickMethod::ButtonAreas => write!(f, "buttonareas"),
            ClickMethod::Clickfinger => write!(f, "clickfinger"),
        }
    }
}

impl FromStr for ClickMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ClickMethod::None),
            "buttonareas" => Ok(ClickMethod::ButtonAreas),
            "clickfinger" => Ok(ClickMethod::Clickfinger),
            _ => Err(format!(
                "Invalid click method '{}'. Valid values: none, clickfinger, buttonareas",
                s
            )),
        }
    }
}

/// How scroll events are generated from finger or button input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMethod {
    None,
    TwoFinger,
    Edge,
    Button,
}

impl fmt::Display for ScrollMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollMethod::None => write!(f, "none"),
            ScrollMethod::TwoFinger => write!(f, "twofinger"),
            ScrollMethod::Edge => write!(f, "edge"),
            ScrollMethod::Button => write!(f, "button"),
        }
    }
}

impl FromStr for ScrollMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ScrollMethod::None),
            "twofinger" => Ok(ScrollMethod::TwoFinger),
            "edge" => Ok(ScrollMethod::Edge),
            "button" => Ok(ScrollMethod::Button),
            _ => Err(format!(
                "Invalid scroll method '{}'. Valid values: none, twofinger, edge, button",
                s
            )),
        }
    }
}

/// Pointer acceleration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelProfile {
    Adaptive,
    Flat,
}

impl fmt::Display for AccelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccelProfile::Adaptive => write!(f, "adaptive"),
            AccelProfile::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for AccelProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adaptive" => Ok(AccelProfile::Adaptive),
            "flat" => Ok(AccelProfile::Flat),
            _ => Err(format!(
                "Invalid profile '{}'. Valid values: adaptive, flat",
                s
            )),
        }
    }
}

/// Which buttons one-, two- and three-finger taps produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapButtonMap {
    /// left, right, middle
    Lrm,
    /// left, middle, right
    Lmr,
}

impl fmt::Display for TapButtonMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapButtonMap::Lrm => write!(f, "lrm"),
            TapButtonMap::Lmr => write!(f, "lmr"),
        }
    }
}

impl FromStr for TapButtonMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lrm" => Ok(TapButtonMap::Lrm),
            "lmr" => Ok(TapButtonMap::Lmr),
            _ => Err(format!("Invalid tap map '{}'. Valid values: lrm, lmr", s)),
        }
    }
}

/// A single configuration change to push to a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    Tap(bool),
    TapButtonMap(TapButtonMap),
    Drag(bool),
    DragLock(bool),
    NaturalScroll(bool),
    LeftHanded(bool),
    MiddleEmulation(bool),
    DisableWhileTyping(bool),
    ClickMethod(ClickMethod),
    ScrollMethod(ScrollMethod),
    ScrollButton(u32),
    AccelSpeed(f64),
    AccelProfile(AccelProfile),
}

impl Setting {
    /// True for settings that only make sense on devices with pointer
    /// acceleration.
    pub fn needs_accel(&self) -> bool {
        matches!(self, Setting::AccelSpeed(_) | Setting::AccelProfile(_))
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Tap(on) => write!(f, "tap={}", on),
            Setting::TapButtonMap(map) => write!(f, "tap-map={}", map),
            Setting::Drag(on) => write!(f, "drag={}", on),
            Setting::DragLock(on) => write!(f, "drag-lock={}", on),
            Setting::NaturalScroll(on) => write!(f, "natural-scroll={}", on),
            Setting::LeftHanded(on) => write!(f, "left-handed={}", on),
            Setting::MiddleEmulation(on) => write!(f, "middle-button={}", on),
            Setting::DisableWhileTyping(on) => write!(f, "dwt={}", on),
            Setting::ClickMethod(m) => write!(f, "click-method={}", m),
            Setting::ScrollMethod(m) => write!(f, "scroll-method={}", m),
            Setting::ScrollButton(code) => write!(f, "scroll-button={}", code),
            Setting::AccelSpeed(speed) => write!(f, "accel-speed={:.2}", speed),
            Setting::AccelProfile(p) => write!(f, "accel-profile={}", p),
        }
    }
}

/// Requested device configuration. `None` leaves the device default alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct DeviceOptions {
    pub tap: Option<bool>,
    pub tap_map: Option<TapButtonMap>,
    pub drag: Option<bool>,
    pub drag_lock: Option<bool>,
    pub natural_scroll: Option<bool>,
    pub left_handed: Option<bool>,
    pub middle_button: Option<bool>,
    pub dwt: Option<bool>,
    pub click_method: Option<ClickMethod>,
    pub scroll_method: Option<ScrollMethod>,
    #[serde(deserialize_with = "button_name")]
    pub scroll_button: Option<u32>,
    pub accel_profile: Option<AccelProfile>,
    #[serde(deserialize_with = "speed_in_range")]
    pub accel_speed: Option<f64>,
}

impl DeviceOptions {
    /// Every option that was set, in the order they are applied.
    pub fn settings(&self) -> Vec<Setting> {
        [
            self.tap.map(Setting::Tap),
            self.tap_map.map(Setting::TapButtonMap),
            self.drag.map(Setting::Drag),
            self.drag_lock.map(Setting::DragLock),
            self.natural_scroll.map(Setting::NaturalScroll),
            self.left_handed.map(Setting::LeftHanded),
            self.middle_button.map(Setting::MiddleEmulation),
            self.dwt.map(Setting::DisableWhileTyping),
            self.click_method.map(Setting::ClickMethod),
            self.scroll_method.map(Setting::ScrollMethod),
            self.scroll_button.map(Setting::ScrollButton),
            self.accel_speed.map(Setting::AccelSpeed),
            self.accel_profile.map(Setting::AccelProfile),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fill every unset option from `other`.
    pub fn or(self, other: DeviceOptions) -> DeviceOptions {
        DeviceOptions {
            tap: self.tap.or(other.tap),
            tap_map: self.tap_map.or(other.tap_map),
            drag: self.drag.or(other.drag),
            drag_lock: self.drag_lock.or(other.drag_lock),
            natural_scroll: self.natural_scroll.or(other.natural_scroll),
            left_handed: self.left_handed.or(other.left_handed),
            middle_button: self.middle_button.or(other.middle_button),
            dwt: self.dwt.or(other.dwt),
            click_method: self.click_method.or(other.click_method),
            scroll_method: self.scroll_method.or(other.scroll_method),
            scroll_button: self.scroll_button.or(other.scroll_button),
            accel_profile: self.accel_profile.or(other.accel_profile),
            accel_speed: self.accel_speed.or(other.accel_speed),
        }
    }
}

/// Parse a pointer acceleration speed, rejecting values outside [-1, 1].
pub fn parse_speed(s: &str) -> Result<f64, String> {
    let speed: f64 = s
        .parse()
        .map_err(|_| format!("Invalid speed '{}': not a number", s))?;
    check_speed(speed)
}

fn check_speed(speed: f64) -> Result<f64, String> {
    if !(-1.0..=1.0).contains(&speed) {
        return Err(format!("Invalid speed {}: allowed range is [-1, 1]", speed));
    }
    Ok(speed)
}

fn speed_in_range<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let speed = f64::deserialize(deserializer)?;
    check_speed(speed).map(Some).map_err(de::Error::custom)
}

fn button_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let name = String::deserialize(deserializer)?;
    crate::keys::parse_button(&name)
        .map(Some)
        .map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_produce_no_settings() {
        assert!(DeviceOptions::default().settings().is_empty());
    }

    #[test]
    fn test_settings_keep_false_values() {
        let options = DeviceOptions {
            tap: Some(false),
            dwt: Some(true),
            accel_speed: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            options.settings(),
            vec![
                Setting::Tap(false),
                Setting::DisableWhileTyping(true),
                Setting::AccelSpeed(0.0),
            ]
        );
    }

    #[test]
    fn test_or_prefers_self() {
        let cli = DeviceOptions {
            tap: Some(true),
            ..Default::default()
        };
        let file = DeviceOptions {
            tap: Some(false),
            left_handed: Some(true),
            ..Default::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.tap, Some(true));
        assert_eq!(merged.left_handed, Some(true));
        assert_eq!(merged.drag, None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("clickfinger".parse::<ClickMethod>().unwrap(), ClickMethod::Clickfinger);
        assert_eq!("twofinger".parse::<ScrollMethod>().unwrap(), ScrollMethod::TwoFinger);
        assert_eq!("flat".parse::<AccelProfile>().unwrap(), AccelProfile::Flat);
        assert_eq!("lmr".parse::<TapButtonMap>().unwrap(), TapButtonMap::Lmr);
        assert!("2fg".parse::<ScrollMethod>().is_err());
    }

    #[test]
    fn test_parse_speed_range() {
        assert_eq!(parse_speed("-1"), Ok(-1.0));
        assert_eq!(parse_speed("0.5"), Ok(0.5));
        assert!(parse_speed("1.5").is_err());
        assert!(parse_speed("fast").is_err());
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let options: DeviceOptions =
            toml::from_str("tap = true\nclick-method = \"buttonareas\"\naccel-speed = -0.25\n").unwrap();
        assert_eq!(options.tap, Some(true));
        assert_eq!(options.click_method, Some(ClickMethod::ButtonAreas));
        assert_eq!(options.accel_speed, Some(-0.25));
    }

    #[test]
    fn test_deserialize_checks_speed_and_button() {
        assert!(toml::from_str::<DeviceOptions>("accel-speed = 5.0").is_err());
        assert!(toml::from_str::<DeviceOptions>("accel-speed = -1.5").is_err());
        assert!(toml::from_str::<DeviceOptions>("scroll-button = 274").is_err());
        assert!(toml::from_str::<DeviceOptions>("scroll-button = \"middle\"").is_err());

        let options: DeviceOptions =
            toml::from_str("scroll-button = \"BTN_MIDDLE\"\naccel-speed = 1.0\n").unwrap();
        assert_eq!(options.scroll_button, Some(0x112));
        assert_eq!(options.accel_speed, Some(1.0));
    }
}
