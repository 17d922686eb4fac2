use clap::{Args, Subcommand};
use std::path::PathBuf;

use camreg_frame::{Operation, Register};
use camreg_settings::SettingChange;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod apply;
pub mod decode;
pub mod encode;
pub mod monitor;
pub mod read;
pub mod registers;
pub mod set;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a single register command frame.
    Encode(EncodeArgs),
    /// Validate and decode frame text.
    Decode(DecodeArgs),
    /// Build read request frames.
    Read(ReadArgs),
    /// Change settings and print the register writes they require.
    Set(SetArgs),
    /// Print the writes that push a whole settings profile to the sensor.
    Apply(ApplyArgs),
    /// Decode frames from a capture file or stdin until EOF.
    Monitor(MonitorArgs),
    /// List the sensor register map.
    Registers(RegistersArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Read(args) => read::run(args, format),
        Command::Set(args) => set::run(args, format),
        Command::Apply(args) => apply::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Registers(args) => registers::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Operation: write or read.
    pub operation: Operation,
    /// Register name (e.g. wdr, mirror) or address (e.g. 0x0C).
    pub register: Register,
    /// Register value, decimal or 0x-prefixed hex.
    #[arg(value_parser = parse_byte, default_value = "0")]
    pub value: u8,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame text to decode. Reads one frame per line from stdin when omitted.
    pub frames: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Registers to query.
    #[arg(required_unless_present = "identity")]
    pub registers: Vec<Register>,
    /// Query the firmware and sensor identity registers.
    #[arg(long, conflicts_with = "registers")]
    pub identity: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Setting changes as name=value (e.g. flip_h=on denoise_2d=2 shutter=10).
    #[arg(required = true)]
    pub changes: Vec<SettingChange>,
    /// Settings profile holding the current state.
    #[arg(long, short = 'p', env = "CAMREG_PROFILE")]
    pub profile: Option<PathBuf>,
    /// Write the updated state back to the profile.
    #[arg(long, requires = "profile")]
    pub save: bool,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Settings profile to push.
    #[arg(long, short = 'p', env = "CAMREG_PROFILE")]
    pub profile: PathBuf,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Capture file to read. Reads stdin when omitted.
    pub input: Option<PathBuf>,
    /// Exit after N valid frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Reject frames longer than a register command.
    #[arg(long)]
    pub commands_only: bool,
    /// Track observed writes and print the resulting settings profile at the end.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args, Debug, Default)]
pub struct RegistersArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_byte(input: &str) -> Result<u8, String> {
    camreg_frame::register::parse_address(input.trim())
        .ok_or_else(|| format!("expected 0-255 or 0x00-0xFF, got {input:?}"))
}

pub fn usage(message: impl Into<String>) -> CliError {
    CliError::new(USAGE, message)
}
