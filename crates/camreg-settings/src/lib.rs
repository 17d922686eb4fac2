//! Register value derivation for the image-sensor control protocol.
//!
//! The sensor takes one packed byte per register, while users think in
//! independent settings (horizontal and vertical flip, 2D and 3D denoise, a
//! shutter speed step). This crate holds the settings record and the pure
//! functions that turn it into register writes for [`camreg_frame`].

pub mod config;
pub mod derive;
pub mod error;
pub mod settings;

pub use config::ProfileConfig;
pub use derive::{
    denoise_from_value, denoise_value, direct_value, flip_from_value, flip_value, shutter_index,
    shutter_value, Toggle, DENOISE_LEVEL_MAX, SHUTTER_CODES, SHUTTER_STEPS,
};
pub use error::{Result, SettingsError};
pub use settings::{SensorSettings, SettingChange, DERIVED_REGISTERS};

/// Read commands for the identity registers (firmware, sensor hardware, sensor id).
pub fn identity_queries() -> Vec<camreg_frame::Command> {
    camreg_frame::Register::ALL
        .iter()
        .copied()
        .filter(|register| register.is_read_only())
        .map(camreg_frame::Command::read)
        .collect()
}

#[cfg(test)]
mod tests {
    use camreg_frame::Register;

    use super::*;

    #[test]
    fn identity_queries_read_id_registers() {
        let registers: Vec<Register> = identity_queries().iter().map(|c| c.register).collect();
        assert_eq!(
            registers,
            vec![Register::FirmwareId, Register::SensorHwId, Register::SensorId]
        );
        assert!(identity_queries()
            .iter()
            .all(|c| c.operation == camreg_frame::Operation::Read));
    }
}
