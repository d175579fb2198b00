mod cli;
mod file;

pub use cli::Cli;

use std::fmt;
use std::path::PathBuf;

use crate::options::DeviceOptions;

const DEFAULT_SEAT: &str = "seat0";

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// All devices on a seat, discovered through udev.
    Udev { seat: String },
    /// A single device node.
    Path(PathBuf),
    /// A recorded JSON-lines stream.
    Replay(PathBuf),
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Udev { seat } => write!(f, "udev:{}", seat),
            Backend::Path(path) => write!(f, "device:{}", path.display()),
            Backend::Replay(path) => write!(f, "replay:{}", path.display()),
        }
    }
}

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub grab: bool,
    pub quiet: bool,
    pub options: DeviceOptions,
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    pub fn load(cli: &Cli) -> Self {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config)
    }

    fn merge(cli: &Cli, file_config: file::FileConfig) -> Self {
        let backend = if let Some(path) = &cli.device {
            Backend::Path(path.clone())
        } else if let Some(path) = &cli.replay {
            Backend::Replay(path.clone())
        } else {
            Backend::Udev {
                seat: cli
                    .udev
                    .clone()
                    .or(file_config.seat)
                    .unwrap_or_else(|| DEFAULT_SEAT.into()),
            }
        };

        Self {
            backend,
            grab: cli.grab || file_config.grab,
            quiet: cli.quiet,
            options: cli.device_options().or(file_config.device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("input-debug-events").chain(args.iter().copied()))
            .unwrap()
    }

    fn file_config(toml_text: &str) -> file::FileConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_default_backend_is_udev_seat0() {
        let config = Config::merge(&cli(&[]), file::FileConfig::default());
        assert_eq!(
            config.backend,
            Backend::Udev {
                seat: "seat0".into()
            }
        );
        assert!(!config.grab);
    }

    #[test]
    fn test_file_seat_used_without_cli_seat() {
        let config = Config::merge(&cli(&[]), file_config("seat = \"seat1\""));
        assert_eq!(config.backend.to_string(), "udev:seat1");

        let config = Config::merge(&cli(&["--udev", "seat2"]), file_config("seat = \"seat1\""));
        assert_eq!(config.backend.to_string(), "udev:seat2");
    }

    #[test]
    fn test_device_and_replay_backends() {
        let config = Config::merge(&cli(&["--device", "/dev/input/event4"]), file_config("grab = true"));
        assert_eq!(config.backend, Backend::Path("/dev/input/event4".into()));
        assert!(config.grab);

        let config = Config::merge(&cli(&["--replay", "-"]), file::FileConfig::default());
        assert_eq!(config.backend, Backend::Replay("-".into()));
    }

    #[test]
    fn test_cli_options_override_file() {
        let config = Config::merge(
            &cli(&["--disable-tap"]),
            file_config("[device]\ntap = true\nleft-handed = true"),
        );
        assert_eq!(config.options.tap, Some(false));
        assert_eq!(config.options.left_handed, Some(true));
    }
}
