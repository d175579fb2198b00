use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::keys;
use crate::options::{self, AccelProfile, ClickMethod, DeviceOptions, ScrollMethod, TapButtonMap};

#[derive(Parser, Debug)]
#[command(name = "input-debug-events")]
#[command(about = "Print every input event as one line, for debugging devices and drivers")]
#[command(version)]
#[command(group(ArgGroup::new("backend").args(["udev", "device", "replay"])))]
pub struct Cli {
    /// Use udev device discovery on SEAT
    #[arg(long, value_name = "SEAT", num_args = 0..=1, default_missing_value = "seat0")]
    pub udev: Option<String>,

    /// Open only the given device node
    #[arg(long, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Replay a JSON-lines recording ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub replay: Option<PathBuf>,

    /// Grab devices so other clients don't see their events
    #[arg(long)]
    pub grab: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Don't print event lines
    #[arg(long)]
    pub quiet: bool,

    /// Enable tap-to-click
    #[arg(long, conflicts_with = "disable_tap")]
    pub enable_tap: bool,

    /// Disable tap-to-click
    #[arg(long)]
    pub disable_tap: bool,

    /// Enable tap-and-drag
    #[arg(long, conflicts_with = "disable_drag")]
    pub enable_drag: bool,

    /// Disable tap-and-drag
    #[arg(long)]
    pub disable_drag: bool,

    /// Enable drag lock
    #[arg(long, conflicts_with = "disable_drag_lock")]
    pub enable_drag_lock: bool,

    /// Disable drag lock
    #[arg(long)]
    pub disable_drag_lock: bool,

    /// Enable natural scrolling
    #[arg(long, conflicts_with = "disable_natural_scrolling")]
    pub enable_natural_scrolling: bool,

    /// Disable natural scrolling
    #[arg(long)]
    pub disable_natural_scrolling: bool,

    /// Enable left-handed button configuration
    #[arg(long, conflicts_with = "disable_left_handed")]
    pub enable_left_handed: bool,

    /// Disable left-handed button configuration
    #[arg(long)]
    pub disable_left_handed: bool,

    /// Enable middle button emulation
    #[arg(long, conflicts_with = "disable_middlebutton")]
    pub enable_middlebutton: bool,

    /// Disable middle button emulation
    #[arg(long)]
    pub disable_middlebutton: bool,

    /// Enable disable-while-typing
    #[arg(long, conflicts_with = "disable_dwt")]
    pub enable_dwt: bool,

    /// Disable disable-while-typing
    #[arg(long)]
    pub disable_dwt: bool,

    /// Click method (none, clickfinger, buttonareas)
    #[arg(long, value_name = "METHOD", value_parser = clap::value_parser!(ClickMethod))]
    pub set_click_method: Option<ClickMethod>,

    /// Scroll method (none, twofinger, edge, button)
    #[arg(long, value_name = "METHOD", value_parser = clap::value_parser!(ScrollMethod))]
    pub set_scroll_method: Option<ScrollMethod>,

    /// Button for on-button scrolling, e.g. BTN_MIDDLE
    #[arg(long, value_name = "BUTTON", value_parser = keys::parse_button)]
    pub set_scroll_button: Option<u32>,

    /// Pointer acceleration profile (adaptive, flat)
    #[arg(long, value_name = "PROFILE", value_parser = clap::value_parser!(AccelProfile))]
    pub set_profile: Option<AccelProfile>,

    /// Pointer acceleration speed in [-1, 1]
    #[arg(long, value_name = "SPEED", allow_hyphen_values = true, value_parser = options::parse_speed)]
    pub set_speed: Option<f64>,

    /// Tap button map (lrm, lmr)
    #[arg(long, value_name = "MAP", value_parser = clap::value_parser!(TapButtonMap))]
    pub set_tap_map: Option<TapButtonMap>,

    /// Path to config file
    #[arg(long, env = "INPUT_DEBUG_CONFIG")]
    pub config: Option<PathBuf>,
}

fn toggle(enable: bool, disable: bool) -> Option<bool> {
    if enable {
        Some(true)
    } else if disable {
        Some(false)
    } else {
        None
    }
}

impl Cli {
    /// Device options given on the command line.
    pub fn device_options(&self) -> DeviceOptions {
        DeviceOptions {
            tap: toggle(self.enable_tap, self.disable_tap),
            tap_map: self.set_tap_map,
            drag: toggle(self.enable_drag, self.disable_drag),
            drag_lock: toggle(self.enable_drag_lock, self.disable_drag_lock),
            natural_scroll: toggle(
                self.enable_natural_scrolling,
                self.disable_natural_scrolling,
            ),
            left_handed: toggle(self.enable_left_handed, self.disable_left_handed),
            middle_button: toggle(self.enable_middlebutton, self.disable_middlebutton),
            dwt: toggle(self.enable_dwt, self.disable_dwt),
            click_method: self.set_click_method,
            scroll_method: self.set_scroll_method,
            scroll_button: self.set_scroll_button,
            accel_profile: self.set_profile,
            accel_speed: self.set_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("input-debug-events").chain(args.iter().copied()))
    }

    #[test]
    fn test_udev_seat_defaults() {
        assert_eq!(parse(&["--udev"]).unwrap().udev.as_deref(), Some("seat0"));
        assert_eq!(
            parse(&["--udev", "seat1"]).unwrap().udev.as_deref(),
            Some("seat1")
        );
        assert_eq!(parse(&[]).unwrap().udev, None);
    }

    #[test]
    fn test_backends_are_exclusive() {
        assert!(parse(&["--udev", "--device", "/dev/input/event3"]).is_err());
        assert!(parse(&["--device", "/dev/input/event3", "--replay", "-"]).is_err());
    }

    #[test]
    fn test_toggles_conflict() {
        assert!(parse(&["--enable-tap", "--disable-tap"]).is_err());
        let cli = parse(&["--enable-tap", "--disable-dwt"]).unwrap();
        let options = cli.device_options();
        assert_eq!(options.tap, Some(true));
        assert_eq!(options.dwt, Some(false));
        assert_eq!(options.drag, None);
    }

    #[test]
    fn test_value_options() {
        let cli = parse(&[
            "--set-click-method",
            "clickfinger",
            "--set-scroll-button",
            "BTN_MIDDLE",
            "--set-speed",
            "-0.5",
            "--set-tap-map",
            "lmr",
        ])
        .unwrap();
        let options = cli.device_options();
        assert_eq!(options.click_method, Some(ClickMethod::Clickfinger));
        assert_eq!(options.scroll_button, Some(0x112));
        assert_eq!(options.accel_speed, Some(-0.5));
        assert_eq!(options.tap_map, Some(TapButtonMap::Lmr));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(parse(&["--set-speed", "2"]).is_err());
        assert!(parse(&["--set-scroll-button", "middle"]).is_err());
        assert!(parse(&["--set-profile", "fast"]).is_err());
    }
}
