//! Pure mappings from logical settings to the byte each register expects.
//!
//! Every function here is total over its documented domain and rejects
//! anything outside it with [`SettingsError::InvalidSetting`].

use camreg_frame::Register;

use crate::error::{Result, SettingsError};

/// Highest 2D or 3D denoise level.
pub const DENOISE_LEVEL_MAX: u8 = 3;

/// Number of selectable shutter speeds.
pub const SHUTTER_STEPS: usize = 20;

/// Shutter speed index → device code.
///
/// Index 10 is 0xA4 in the vendor table, not the 0x4A the sequence suggests.
/// Kept as shipped until hardware documentation says otherwise.
pub const SHUTTER_CODES: [u8; SHUTTER_STEPS] = [
    0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, //
    0xA4, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F, 0x50, 0x51, 0x52, 0x53,
];

/// Pack the flip flags: bit 0 horizontal, bit 1 vertical.
pub fn flip_value(horizontal: bool, vertical: bool) -> u8 {
    u8::from(horizontal) | u8::from(vertical) << 1
}

/// Unpack a mirror register value into (horizontal, vertical).
pub fn flip_from_value(value: u8) -> Option<(bool, bool)> {
    match value {
        0x00..=0x03 => Some((value & 0x01 != 0, value & 0x02 != 0)),
        _ => None,
    }
}

/// Pack the denoise levels: `denoise_2d * 4 + denoise_3d`.
pub fn denoise_value(denoise_2d: u8, denoise_3d: u8) -> Result<u8> {
    let denoise_2d = denoise_level("denoise_2d", denoise_2d)?;
    let denoise_3d = denoise_level("denoise_3d", denoise_3d)?;
    Ok(denoise_2d * 4 + denoise_3d)
}

/// Unpack a denoise register value into (2D level, 3D level).
pub fn denoise_from_value(value: u8) -> Option<(u8, u8)> {
    match value {
        0x00..=0x0F => Some((value >> 2, value & 0x03)),
        _ => None,
    }
}

fn denoise_level(setting: &'static str, level: u8) -> Result<u8> {
    if level > DENOISE_LEVEL_MAX {
        return Err(SettingsError::InvalidSetting {
            setting,
            value: i64::from(level),
            range: "0-3",
        });
    }
    Ok(level)
}

/// Look up the device code for a shutter speed index.
pub fn shutter_value(index: u8) -> Result<u8> {
    SHUTTER_CODES
        .get(usize::from(index))
        .copied()
        .ok_or(SettingsError::InvalidSetting {
            setting: "shutter",
            value: i64::from(index),
            range: "0-19",
        })
}

/// Reverse lookup of a shutter device code.
pub fn shutter_index(code: u8) -> Option<u8> {
    SHUTTER_CODES
        .iter()
        .position(|&c| c == code)
        .and_then(|index| u8::try_from(index).ok())
}

/// Registers driven by an on/off setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Wdr,
    NightMode,
    Overlay,
}

impl Toggle {
    pub fn register(self) -> Register {
        match self {
            Toggle::Wdr => Register::Wdr,
            Toggle::NightMode => Register::DayNight,
            Toggle::Overlay => Register::Overlay,
        }
    }

    pub fn on_value(self) -> u8 {
        match self {
            Toggle::Wdr => 0x03,
            Toggle::NightMode => 0xFE,
            Toggle::Overlay => 0x01,
        }
    }

    pub fn off_value(self) -> u8 {
        match self {
            Toggle::Wdr => 0x00,
            Toggle::NightMode => 0xFF,
            Toggle::Overlay => 0x00,
        }
    }

    pub fn value(self, on: bool) -> u8 {
        if on {
            self.on_value()
        } else {
            self.off_value()
        }
    }

    /// Map a register value back to the toggle state.
    pub fn state_from_value(self, value: u8) -> Option<bool> {
        if value == self.on_value() {
            Some(true)
        } else if value == self.off_value() {
            Some(false)
        } else {
            None
        }
    }
}

/// Validate a directly mapped setting (brightness, contrast, saturation, sharpness).
pub fn direct_value(setting: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| SettingsError::InvalidSetting {
        setting,
        value,
        range: "0-255",
    })
}
