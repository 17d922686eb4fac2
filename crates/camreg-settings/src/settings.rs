use std::fmt;
use std::path::Path;
use std::str::FromStr;

use camreg_frame::{Command, Register};
use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;
use crate::derive::{
    denoise_from_value, denoise_value, direct_value, flip_from_value, flip_value, shutter_index,
    shutter_value, Toggle,
};
use crate::error::{Result, SettingsError};

/// Registers whose value is derived from [`SensorSettings`], in address order.
pub const DERIVED_REGISTERS: [Register; 10] = [
    Register::Wdr,
    Register::Mirror,
    Register::Denoise,
    Register::DayNight,
    Register::Shutter,
    Register::Brightness,
    Register::Contrast,
    Register::Saturation,
    Register::Sharpness,
    Register::Overlay,
];

/// The caller-held logical camera settings.
///
/// This record is the only input to register derivation. It doubles as the
/// on-disk profile format; missing fields default to off / zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorSettings {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// 0-3.
    pub denoise_2d: u8,
    /// 0-3.
    pub denoise_3d: u8,
    /// 0-19, see [`crate::SHUTTER_CODES`].
    pub shutter_index: u8,
    pub brightness: u8,
    pub contrast: u8,
    pub saturation: u8,
    pub sharpness: u8,
    pub wdr: bool,
    pub night_mode: bool,
    pub overlay: bool,
}

impl SensorSettings {
    /// Parse a JSON profile and range-check it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a profile from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_with_config(path, ProfileConfig::default())
    }

    /// Load a profile from disk with explicit config.
    pub fn from_path_with_config(path: &Path, config: ProfileConfig) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|err| SettingsError::LoadFailed(format!("{}: {err}", path.display())))?;
        if metadata.len() > config.max_profile_size {
            return Err(SettingsError::LoadFailed(format!(
                "{}: profile is {} bytes, max {}",
                path.display(),
                metadata.len(),
                config.max_profile_size
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|err| SettingsError::LoadFailed(format!("{}: {err}", path.display())))?;
        let settings: Self = serde_json::from_str(&text)?;
        if config.validate_on_load {
            settings.validate()?;
        }

        tracing::debug!(path = %path.display(), "loaded settings profile");
        Ok(settings)
    }

    /// Serialize as a pretty-printed JSON profile.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every ranged field.
    pub fn validate(&self) -> Result<()> {
        denoise_value(self.denoise_2d, self.denoise_3d)?;
        shutter_value(self.shutter_index)?;
        Ok(())
    }

    /// The byte to write to `register` for the current state.
    pub fn register_value(&self, register: Register) -> Result<u8> {
        match register {
            Register::Wdr => Ok(Toggle::Wdr.value(self.wdr)),
            Register::Mirror => Ok(flip_value(self.flip_horizontal, self.flip_vertical)),
            Register::Denoise => denoise_value(self.denoise_2d, self.denoise_3d),
            Register::DayNight => Ok(Toggle::NightMode.value(self.night_mode)),
            Register::Shutter => shutter_value(self.shutter_index),
            Register::Brightness => Ok(self.brightness),
            Register::Contrast => Ok(self.contrast),
            Register::Saturation => Ok(self.saturation),
            Register::Sharpness => Ok(self.sharpness),
            Register::Overlay => Ok(Toggle::Overlay.value(self.overlay)),
            other => Err(SettingsError::NotDerived(other)),
        }
    }

    /// The write command for `register` under the current state.
    pub fn write_command(&self, register: Register) -> Result<Command> {
        Ok(Command::write(register, self.register_value(register)?))
    }

    /// Write commands that push the whole state to the sensor, in address order.
    pub fn write_commands(&self) -> Result<Vec<Command>> {
        DERIVED_REGISTERS
            .iter()
            .map(|&register| self.write_command(register))
            .collect()
    }

    /// Apply a single setting change and return the write it requires.
    ///
    /// The record is left untouched if the new value is out of range.
    pub fn apply(&mut self, change: SettingChange) -> Result<Command> {
        let mut next = *self;
        next.set(change);
        let command = next.write_command(change.register())?;
        *self = next;
        tracing::debug!(%change, %command, "setting changed");
        Ok(command)
    }

    fn set(&mut self, change: SettingChange) {
        match change {
            SettingChange::FlipHorizontal(on) => self.flip_horizontal = on,
            SettingChange::FlipVertical(on) => self.flip_vertical = on,
            SettingChange::Denoise2d(level) => self.denoise_2d = level,
            SettingChange::Denoise3d(level) => self.denoise_3d = level,
            SettingChange::Shutter(index) => self.shutter_index = index,
            SettingChange::Brightness(value) => self.brightness = value,
            SettingChange::Contrast(value) => self.contrast = value,
            SettingChange::Saturation(value) => self.saturation = value,
            SettingChange::Sharpness(value) => self.sharpness = value,
            SettingChange::Wdr(on) => self.wdr = on,
            SettingChange::NightMode(on) => self.night_mode = on,
            SettingChange::Overlay(on) => self.overlay = on,
        }
    }

    /// Fold a value read back from the sensor into the record.
    pub fn update_from(&mut self, register: Register, value: u8) -> Result<()> {
        let unrecognised = || SettingsError::UnrecognisedValue { register, value };
        match register {
            Register::Wdr => {
                self.wdr = Toggle::Wdr.state_from_value(value).ok_or_else(unrecognised)?
            }
            Register::Mirror => {
                let (h, v) = flip_from_value(value).ok_or_else(unrecognised)?;
                self.flip_horizontal = h;
                self.flip_vertical = v;
            }
            Register::Denoise => {
                let (d2, d3) = denoise_from_value(value).ok_or_else(unrecognised)?;
                self.denoise_2d = d2;
                self.denoise_3d = d3;
            }
            Register::DayNight => {
                self.night_mode = Toggle::NightMode
                    .state_from_value(value)
                    .ok_or_else(unrecognised)?
            }
            Register::Shutter => self.shutter_index = shutter_index(value).ok_or_else(unrecognised)?,
            Register::Brightness => self.brightness = value,
            Register::Contrast => self.contrast = value,
            Register::Saturation => self.saturation = value,
            Register::Sharpness => self.sharpness = value,
            Register::Overlay => {
                self.overlay = Toggle::Overlay
                    .state_from_value(value)
                    .ok_or_else(unrecognised)?
            }
            other => return Err(SettingsError::NotDerived(other)),
        }
        Ok(())
    }
}

/// A single user-facing setting change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    FlipHorizontal(bool),
    FlipVertical(bool),
    Denoise2d(u8),
    Denoise3d(u8),
    Shutter(u8),
    Brightness(u8),
    Contrast(u8),
    Saturation(u8),
    Sharpness(u8),
    Wdr(bool),
    NightMode(bool),
    Overlay(bool),
}

impl SettingChange {
    /// The register this change rewrites.
    pub fn register(self) -> Register {
        match self {
            SettingChange::FlipHorizontal(_) | SettingChange::FlipVertical(_) => Register::Mirror,
            SettingChange::Denoise2d(_) | SettingChange::Denoise3d(_) => Register::Denoise,
            SettingChange::Shutter(_) => Register::Shutter,
            SettingChange::Brightness(_) => Register::Brightness,
            SettingChange::Contrast(_) => Register::Contrast,
            SettingChange::Saturation(_) => Register::Saturation,
            SettingChange::Sharpness(_) => Register::Sharpness,
            SettingChange::Wdr(_) => Toggle::Wdr.register(),
            SettingChange::NightMode(_) => Toggle::NightMode.register(),
            SettingChange::Overlay(_) => Toggle::Overlay.register(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SettingChange::FlipHorizontal(_) => "flip_h",
            SettingChange::FlipVertical(_) => "flip_v",
            SettingChange::Denoise2d(_) => "denoise_2d",
            SettingChange::Denoise3d(_) => "denoise_3d",
            SettingChange::Shutter(_) => "shutter",
            SettingChange::Brightness(_) => "brightness",
            SettingChange::Contrast(_) => "contrast",
            SettingChange::Saturation(_) => "saturation",
            SettingChange::Sharpness(_) => "sharpness",
            SettingChange::Wdr(_) => "wdr",
            SettingChange::NightMode(_) => "night_mode",
            SettingChange::Overlay(_) => "overlay",
        }
    }
}

impl fmt::Display for SettingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SettingChange::FlipHorizontal(on)
            | SettingChange::FlipVertical(on)
            | SettingChange::Wdr(on)
            | SettingChange::NightMode(on)
            | SettingChange::Overlay(on) => {
                write!(f, "{}={}", self.name(), if on { "on" } else { "off" })
            }
            SettingChange::Denoise2d(v)
            | SettingChange::Denoise3d(v)
            | SettingChange::Shutter(v)
            | SettingChange::Brightness(v)
            | SettingChange::Contrast(v)
            | SettingChange::Saturation(v)
            | SettingChange::Sharpness(v) => write!(f, "{}={v}", self.name()),
        }
    }
}

impl FromStr for SettingChange {
    type Err = SettingsError;

    /// Parses `name=value`, e.g. `flip_h=on`, `denoise_2d=2`, `shutter=10`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| SettingsError::UnknownSetting(s.to_string()))?;
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        let value = value.trim();

        let change = match name.as_str() {
            "flip_h" | "flip_horizontal" | "fliph" => {
                SettingChange::FlipHorizontal(parse_switch("flip_h", value)?)
            }
            "flip_v" | "flip_vertical" | "flipv" => {
                SettingChange::FlipVertical(parse_switch("flip_v", value)?)
            }
            "denoise_2d" | "2d_denoise" => SettingChange::Denoise2d(parse_level("denoise_2d", value)?),
            "denoise_3d" | "3d_denoise" => SettingChange::Denoise3d(parse_level("denoise_3d", value)?),
            "shutter" => SettingChange::Shutter(parse_level("shutter", value)?),
            "brightness" => SettingChange::Brightness(parse_level("brightness", value)?),
            "contrast" => SettingChange::Contrast(parse_level("contrast", value)?),
            "saturation" => SettingChange::Saturation(parse_level("saturation", value)?),
            "sharpness" | "sharpen" => SettingChange::Sharpness(parse_level("sharpness", value)?),
            "wdr" => SettingChange::Wdr(parse_switch("wdr", value)?),
            "night_mode" | "night" => SettingChange::NightMode(parse_switch("night_mode", value)?),
            "overlay" => SettingChange::Overlay(parse_switch("overlay", value)?),
            _ => return Err(SettingsError::UnknownSetting(name)),
        };
        Ok(change)
    }
}

fn parse_switch(setting: &'static str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(SettingsError::InvalidSetting {
            setting,
            value: value.parse().unwrap_or(-1),
            range: "on|off",
        }),
    }
}

fn parse_level(setting: &'static str, value: &str) -> Result<u8> {
    let number: i64 = value.parse().map_err(|_| SettingsError::InvalidSetting {
        setting,
        value: -1,
        range: "an integer",
    })?;
    direct_value(setting, number)
}
