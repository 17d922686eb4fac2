use camreg_frame::Command;
use camreg_settings::identity_queries;

use crate::cmd::ReadArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_commands, OutputFormat};

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let commands = if args.identity {
        identity_queries()
    } else {
        args.registers.iter().copied().map(Command::read).collect()
    };
    print_commands(&commands, format)?;
    Ok(SUCCESS)
}
