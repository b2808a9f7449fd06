use crate::error::AppError;
use fzoom_core::constants::bridge::{BRIDGE_BASE, BRIDGE_SPAN, DEVICE_PATH};
use fzoom_core::constants::frame::PAN_STEP;
use fzoom_core::PollLimit;
use std::convert::TryFrom;
use std::path::PathBuf;
use std::str::FromStr;

/// Which register window backs the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowConfig {
    DevMem {
        device: PathBuf,
        base: u64,
        span: usize,
    },
    Simulated {
        latency: u32,
    },
}

/// What to do once the window is up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Load(PathBuf),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub window: WindowConfig,
    pub pan_step: u32,
    pub poll_limit: PollLimit,
    pub mode: Mode,
}

impl Config {
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self, AppError> {
        let window = if matches.is_present("simulate") {
            WindowConfig::Simulated {
                latency: parse_or(matches, "sim-latency", 0)?,
            }
        } else {
            WindowConfig::DevMem {
                device: matches
                    .value_of("device")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEVICE_PATH)),
                base: parse_or(matches, "base", BRIDGE_BASE)?,
                span: parse_or(matches, "span", BRIDGE_SPAN)?,
            }
        };

        let poll_limit = match matches.value_of("poll-limit") {
            Some(value) => PollLimit::Iterations(parse_number("poll-limit", value)?),
            None => PollLimit::Unbounded,
        };

        let mode = match matches.subcommand() {
            ("load", Some(sub)) => match sub.value_of("FILE") {
                Some(path) => Mode::Load(PathBuf::from(path)),
                None => return Err(AppError::NoImagePath),
            },
            ("reset", _) => Mode::Reset,
            _ => Mode::Interactive,
        };

        Ok(Self {
            window,
            pan_step: parse_or(matches, "pan-step", PAN_STEP)?,
            poll_limit,
            mode,
        })
    }
}

fn parse_or<T>(matches: &clap::ArgMatches, name: &'static str, default: T) -> Result<T, AppError>
where
    T: FromStr + TryFrom<u64>,
{
    match matches.value_of(name) {
        Some(value) => parse_number(name, value),
        None => Ok(default),
    }
}

/// Decimal, or hexadecimal with a `0x` prefix
fn parse_number<T>(name: &'static str, value: &str) -> Result<T, AppError>
where
    T: FromStr + TryFrom<u64>,
{
    let invalid = || AppError::InvalidArgument {
        name,
        value: value.to_string(),
    };
    let digits = value.trim().replace('_', "");
    match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => {
            let wide = u64::from_str_radix(hex, 16).map_err(|_| invalid())?;
            T::try_from(wide).map_err(|_| invalid())
        }
        None => digits.parse().map_err(|_| invalid()),
    }
}
