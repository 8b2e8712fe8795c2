//! Configuration file loader.
//!
//! The configuration is a plain-text file of up to four whitespace-separated
//! unsigned integers, read in fixed order:
//!
//! 1. read latency, milliseconds;
//! 2. write latency, milliseconds;
//! 3. shift latency, milliseconds;
//! 4. emulation mode: `0` disabled (default), `1` statistics only, `2` full.
//!
//! Parsing stops at the first token that is not an unsigned integer; every
//! missing trailing value defaults to zero / disabled. A missing or unreadable
//! file yields all defaults, so loading never fails.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::emulator::{Emulation, Timing};

/// Default configuration file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "tape-sort.cfg";

/// Emulation parameters supplied to every tape the sorter opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub timing: Timing,
    pub mode: Emulation,
}

impl Config {
    /// Loads the configuration from `path`, falling back to defaults when the
    /// file is absent.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => {
                log::debug!("config file {} not readable, using defaults", path.display());
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Self {
        let mut fields = content.split_whitespace().map_while(|token| token.parse::<u64>().ok());

        let read = fields.next().unwrap_or(0);
        let write = fields.next().unwrap_or(0);
        let shift = fields.next().unwrap_or(0);
        let mode = match fields.next() {
            Some(2) => Emulation::Full,
            Some(1) => Emulation::StatsOnly,
            _ => Emulation::Disabled,
        };

        Config {
            timing: Timing {
                read: Duration::from_millis(read),
                write: Duration::from_millis(write),
                shift: Duration::from_millis(shift),
            },
            mode,
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::Config;
    use crate::emulator::{Emulation, Timing};

    #[rstest]
    #[case("", Timing::from_millis(0, 0, 0), Emulation::Disabled)]
    #[case("5 10 1 2", Timing::from_millis(5, 10, 1), Emulation::Full)]
    #[case("5 10 1 1", Timing::from_millis(5, 10, 1), Emulation::StatsOnly)]
    #[case("5 10 1 0", Timing::from_millis(5, 10, 1), Emulation::Disabled)]
    #[case("5 10 1 7", Timing::from_millis(5, 10, 1), Emulation::Disabled)]
    #[case("5 10", Timing::from_millis(5, 10, 0), Emulation::Disabled)]
    #[case("5 10 x 2", Timing::from_millis(5, 10, 0), Emulation::Disabled)]
    #[case("  3\n4\t5 1 ", Timing::from_millis(3, 4, 5), Emulation::StatsOnly)]
    fn test_parse(#[case] content: &str, #[case] timing: Timing, #[case] mode: Emulation) {
        let config = Config::parse(content);
        assert_eq!(config.timing, timing);
        assert_eq!(config.mode, mode);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.cfg"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tape-sort.cfg");
        std::fs::write(&path, "1 2 3 2\n").unwrap();

        let config = Config::load(&path);
        assert_eq!(config.timing, Timing::from_millis(1, 2, 3));
        assert_eq!(config.mode, Emulation::Full);
    }
}
