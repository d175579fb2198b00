use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::options::DeviceOptions;

const CONFIG_FILE_NAME: &str = "input-debug-events.toml";

/// On-disk defaults, overridden by anything given on the command line.
///
/// ```toml
/// seat = "seat0"
/// grab = false
///
/// [device]
/// tap = true
/// click-method = "clickfinger"
/// scroll-button = "BTN_MIDDLE"
/// accel-speed = -0.5
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub seat: Option<String>,
    pub grab: bool,
    pub device: DeviceOptions,
}

pub fn load_from_path(path: &Path) -> Option<FileConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

pub fn load_from_default_paths() -> Option<FileConfig> {
    default_config_paths()
        .into_iter()
        .filter(|path| path.exists())
        .find_map(|path| load_from_path(&path))
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join(CONFIG_FILE_NAME));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ClickMethod;

    #[test]
    fn test_parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            seat = "seat1"
            grab = true

            [device]
            tap = true
            click-method = "clickfinger"
            "#,
        )
        .unwrap();
        assert_eq!(config.seat.as_deref(), Some("seat1"));
        assert!(config.grab);
        assert_eq!(config.device.tap, Some(true));
        assert_eq!(config.device.click_method, Some(ClickMethod::Clickfinger));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.seat, None);
        assert!(!config.grab);
        assert_eq!(config.device, DeviceOptions::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<FileConfig>("host = \"10.0.0.1\"").is_err());
        assert!(toml::from_str::<FileConfig>("[device]\ntapping = true").is_err());
    }

    #[test]
    fn test_device_values_are_validated() {
        assert!(toml::from_str::<FileConfig>("[device]\naccel-speed = 5.0").is_err());

        let config: FileConfig =
            toml::from_str("[device]\nscroll-button = \"BTN_MOUSE\"\naccel-speed = -0.5").unwrap();
        assert_eq!(config.device.scroll_button, Some(0x110));
        assert_eq!(config.device.accel_speed, Some(-0.5));
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(load_from_path(Path::new("/nonexistent/input-debug-events.toml")).is_none());
    }
}
