use std::io::IsTerminal;

use camreg_frame::{Command, DecodedFrame, FrameWriter, Register};
use camreg_settings::DERIVED_REGISTERS;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::exit::{frame_error, CliResult};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    /// Frame text only, back to back, ready to pipe into a serial device.
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandOutput {
    operation: &'static str,
    register: &'static str,
    address: String,
    value: String,
    frame: String,
}

impl From<&Command> for CommandOutput {
    fn from(command: &Command) -> Self {
        Self {
            operation: command.operation.name(),
            register: command.register.name(),
            address: format!("0x{:02X}", command.register.as_u8()),
            value: format!("0x{:02X}", command.value),
            frame: command.encode(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DecodeOutput {
    input: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DecodeOutput {
    pub fn decoded(input: &str, frame: &DecodedFrame) -> Self {
        Self {
            input: input.to_string(),
            valid: true,
            length: Some(frame.length),
            payload: Some(frame.payload.clone()),
            checksum: Some(frame.checksum.clone()),
            command: frame.command().ok().map(|c| c.to_string()),
            error: None,
        }
    }

    pub fn rejected(input: &str, error: impl ToString) -> Self {
        Self {
            input: input.to_string(),
            valid: false,
            length: None,
            payload: None,
            checksum: None,
            command: None,
            error: Some(error.to_string()),
        }
    }
}

pub fn print_commands(commands: &[Command], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            for command in commands {
                print_json(&CommandOutput::from(command));
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["OP", "REGISTER", "ADDR", "VALUE", "FRAME"]);
            for command in commands {
                let out = CommandOutput::from(command);
                table.add_row(vec![
                    out.operation.to_string(),
                    out.register.to_string(),
                    out.address,
                    out.value,
                    out.frame,
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for command in commands {
                println!("{:<22} {}", command.to_string(), command.encode());
            }
        }
        OutputFormat::Raw => {
            let mut writer = FrameWriter::new(std::io::stdout().lock());
            for command in commands {
                writer
                    .write_command(command)
                    .map_err(|err| frame_error("stdout write failed", err))?;
            }
        }
    }
    Ok(())
}

pub fn print_decoded(record: &DecodeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["input".to_string(), record.input.clone()]);
            table.add_row(vec!["valid".to_string(), record.valid.to_string()]);
            for (name, value) in [
                ("length", record.length.map(|l| l.to_string())),
                ("payload", record.payload.clone()),
                ("checksum", record.checksum.clone()),
                ("command", record.command.clone()),
                ("error", record.error.clone()),
            ] {
                if let Some(value) = value {
                    table.add_row(vec![name.to_string(), value]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => match (&record.error, &record.command) {
            (Some(error), _) => println!("{} INVALID {error}", record.input),
            (None, Some(command)) => println!("{} OK {command}", record.input),
            (None, None) => println!(
                "{} OK payload={}",
                record.input,
                record.payload.as_deref().unwrap_or_default()
            ),
        },
        OutputFormat::Raw => {
            if let Some(payload) = &record.payload {
                println!("{payload}");
            }
        }
    }
}

#[derive(Serialize)]
struct RegisterOutput {
    name: &'static str,
    address: String,
    access: &'static str,
    derived: bool,
}

pub fn print_registers(format: OutputFormat) {
    let rows: Vec<RegisterOutput> = Register::ALL
        .iter()
        .map(|&register| RegisterOutput {
            name: register.name(),
            address: format!("0x{:02X}", register.as_u8()),
            access: if register.is_read_only() { "ro" } else { "rw" },
            derived: DERIVED_REGISTERS.contains(&register),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            for row in &rows {
                print_json(row);
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["REGISTER", "ADDR", "ACCESS", "DERIVED"]);
            for row in rows {
                table.add_row(vec![
                    row.name.to_string(),
                    row.address,
                    row.access.to_string(),
                    row.derived.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in rows {
                println!("{} {} {}", row.address, row.name, row.access);
            }
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
