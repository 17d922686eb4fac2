//! Register control for serial image sensors.
//!
//! camreg builds and validates the ASCII-hex command frames an image-sensor
//! board accepts over its serial control link, and derives the packed register
//! values behind user-facing settings such as flip, denoise and shutter speed.
//!
//! # Crate Structure
//!
//! - [`frame`] — Frame codec, register addresses, stream reader/writer
//! - [`settings`] — Settings record and register value derivation
//!
//! ```
//! use camreg::frame::{Command, Register};
//! use camreg::settings::{SensorSettings, SettingChange};
//!
//! let mut settings = SensorSettings::default();
//! let command = settings.apply(SettingChange::Wdr(true)).unwrap();
//! assert_eq!(command, Command::write(Register::Wdr, 0x03));
//! assert_eq!(command.encode(), "AA5503000C03CAFDC7A455AA");
//! ```

/// Re-export frame types.
pub mod frame {
    pub use camreg_frame::*;
}

/// Re-export settings types.
pub mod settings {
    pub use camreg_settings::*;
}
