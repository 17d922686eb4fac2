//! Register addresses and operation codes.
//!
//! The register set is fixed by the sensor firmware. Addresses are spaced four
//! apart starting at 0x00; the first three are identity registers that only
//! make sense to read.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrameError, FramingKind};

/// Write operation code.
pub const WRITE_OP: u8 = 0x00;
/// Read operation code.
pub const READ_OP: u8 = 0x01;

pub const FIRM_ID: u8 = 0x00;
pub const SENSHW_ID: u8 = 0x04;
pub const SENS_ID: u8 = 0x08;
pub const WDR_REG: u8 = 0x0C;
pub const MIRROR_REG: u8 = 0x10;
pub const DENOISE_REG: u8 = 0x14;
pub const AGC_REG: u8 = 0x18;
pub const LOWLIGHT_REG: u8 = 0x1C;
pub const DAYNIGHT_REG: u8 = 0x20;
pub const SHUTTER_REG: u8 = 0x24;
pub const BRIGHT_REG: u8 = 0x28;
pub const AESPEED_REG: u8 = 0x2C;
pub const CONTRAST_REG: u8 = 0x30;
pub const SAT_REG: u8 = 0x34;
pub const SHARP_REG: u8 = 0x38;
pub const OVERLAY_REG: u8 = 0x3C;

/// Direction of a register command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    Write = WRITE_OP,
    Read = READ_OP,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Write => "WRITE",
            Operation::Read => "READ",
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            WRITE_OP => Ok(Operation::Write),
            READ_OP => Ok(Operation::Read),
            other => Err(FramingKind::UnknownOperation(other).into()),
        }
    }
}

impl FromStr for Operation {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "write" | "w" => Ok(Operation::Write),
            "read" | "r" => Ok(Operation::Read),
            _ => Err(FrameError::UnknownName(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sensor configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Register {
    FirmwareId = FIRM_ID,
    SensorHwId = SENSHW_ID,
    SensorId = SENS_ID,
    Wdr = WDR_REG,
    Mirror = MIRROR_REG,
    Denoise = DENOISE_REG,
    Agc = AGC_REG,
    LowLight = LOWLIGHT_REG,
    DayNight = DAYNIGHT_REG,
    Shutter = SHUTTER_REG,
    Brightness = BRIGHT_REG,
    AeSpeed = AESPEED_REG,
    Contrast = CONTRAST_REG,
    Saturation = SAT_REG,
    Sharpness = SHARP_REG,
    Overlay = OVERLAY_REG,
}

impl Register {
    /// Every register in address order.
    pub const ALL: [Register; 16] = [
        Register::FirmwareId,
        Register::SensorHwId,
        Register::SensorId,
        Register::Wdr,
        Register::Mirror,
        Register::Denoise,
        Register::Agc,
        Register::LowLight,
        Register::DayNight,
        Register::Shutter,
        Register::Brightness,
        Register::AeSpeed,
        Register::Contrast,
        Register::Saturation,
        Register::Sharpness,
        Register::Overlay,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short uppercase name, as used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Register::FirmwareId => "FIRM_ID",
            Register::SensorHwId => "SENSHW_ID",
            Register::SensorId => "SENS_ID",
            Register::Wdr => "WDR",
            Register::Mirror => "MIRROR",
            Register::Denoise => "DENOISE",
            Register::Agc => "AGC",
            Register::LowLight => "LOWLIGHT",
            Register::DayNight => "DAYNIGHT",
            Register::Shutter => "SHUTTER",
            Register::Brightness => "BRIGHT",
            Register::AeSpeed => "AESPEED",
            Register::Contrast => "CONTRAST",
            Register::Saturation => "SAT",
            Register::Sharpness => "SHARP",
            Register::Overlay => "OVERLAY",
        }
    }

    /// Identity registers report firmware and sensor revisions and are never written.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Register::FirmwareId | Register::SensorHwId | Register::SensorId
        )
    }
}

impl TryFrom<u8> for Register {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Register::ALL
            .iter()
            .copied()
            .find(|reg| reg.as_u8() == value)
            .ok_or_else(|| FramingKind::UnknownRegister(value).into())
    }
}

impl FromStr for Register {
    type Err = FrameError;

    /// Accepts a register name (`wdr`, `WDR_REG`) or an address (`0x0C`, `12`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(addr) = parse_address(trimmed) {
            return Register::try_from(addr);
        }

        let upper = trimmed.to_ascii_uppercase();
        let name = upper.strip_suffix("_REG").unwrap_or(&upper);
        let alias = match name {
            "BRIGHTNESS" => "BRIGHT",
            "SATURATION" => "SAT",
            "SHARPNESS" | "SHARPEN" => "SHARP",
            "FLIP" => "MIRROR",
            "NIGHT" => "DAYNIGHT",
            other => other,
        };
        Register::ALL
            .iter()
            .copied()
            .find(|reg| reg.name() == alias)
            .ok_or_else(|| FrameError::UnknownName(s.to_string()))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses `0x`-prefixed hex or plain decimal into a byte.
pub fn parse_address(s: &str) -> Option<u8> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).ok();
    }
    if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
        return s.parse().ok();
    }
    None
}
