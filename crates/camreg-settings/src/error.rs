use camreg_frame::{FrameError, Register};

/// Errors that can occur while deriving register values or loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A setting value is outside its documented domain.
    #[error("invalid setting {setting}: {value} (expected {range})")]
    InvalidSetting {
        setting: &'static str,
        value: i64,
        range: &'static str,
    },

    /// The setting name is not recognised.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// The register value is not produced from logical settings.
    #[error("register {0} is not derived from settings")]
    NotDerived(Register),

    /// A read-back value does not correspond to any setting state.
    #[error("register {register} reported unrecognised value 0x{value:02X}")]
    UnrecognisedValue { register: Register, value: u8 },

    /// The settings profile could not be loaded.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// The settings profile is not valid JSON.
    #[error("profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
