use camreg_frame::{Command, Operation};

use crate::cmd::{usage, EncodeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_commands, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.operation == Operation::Write && args.register.is_read_only() {
        return Err(usage(format!("register {} is read-only", args.register)));
    }

    let command = Command::new(args.operation, args.register, args.value);
    tracing::debug!(%command, "encoding command");
    print_commands(&[command], format)?;
    Ok(SUCCESS)
}
