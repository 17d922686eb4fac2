use std::io::BufRead;

use camreg_frame::decode_frame;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_decoded, DecodeOutput, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let inputs = if args.frames.is_empty() {
        read_stdin_lines()?
    } else {
        args.frames
    };

    let mut code = SUCCESS;
    for input in inputs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let record = match decode_frame(input) {
            Ok(frame) => DecodeOutput::decoded(input, &frame),
            Err(err) => {
                let cli_err = frame_error("decode failed", err);
                tracing::warn!(input, error = %cli_err, "rejected frame");
                if code == SUCCESS {
                    code = cli_err.code;
                }
                DecodeOutput::rejected(input, &cli_err)
            }
        };
        print_decoded(&record, format);
    }

    Ok(code)
}

fn read_stdin_lines() -> CliResult<Vec<String>> {
    std::io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| io_error("failed reading stdin", err))
}
