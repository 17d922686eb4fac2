use std::fs::File;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use camreg_frame::{DecodedFrame, FrameConfig, FrameError, FrameReader, Operation, FOOTER, HEADER};
use camreg_settings::SensorSettings;

use crate::cmd::MonitorArgs;
use crate::exit::{frame_error, io_error, settings_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_decoded, DecodeOutput, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(std::io::stdin().lock()),
    };
    let config = if args.commands_only {
        FrameConfig::commands_only()
    } else {
        FrameConfig::default()
    };
    let mut reader = FrameReader::with_config(input, config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut settings = SensorSettings::default();
    let mut valid = 0usize;
    let mut rejected = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err @ FrameError::Io(_)) => return Err(frame_error("read failed", err)),
            Err(err) => {
                rejected += 1;
                let text = reader
                    .last_rejected()
                    .map(|text| String::from_utf8_lossy(text).into_owned())
                    .unwrap_or_default();
                print_decoded(&DecodeOutput::rejected(&text, &err), format);
                continue;
            }
        };

        if args.summary {
            track(&mut settings, &frame);
        }
        print_decoded(&DecodeOutput::decoded(&frame_text(&frame), &frame), format);

        valid += 1;
        if args.count.is_some_and(|count| valid >= count) {
            break;
        }
    }

    tracing::info!(valid, rejected, "monitor finished");

    if args.summary {
        let json = settings
            .to_json_pretty()
            .map_err(|err| settings_error("summary encode failed", err))?;
        println!("{json}");
    }

    Ok(if rejected > 0 { DATA_INVALID } else { SUCCESS })
}

fn track(settings: &mut SensorSettings, frame: &DecodedFrame) {
    let Ok(command) = frame.command() else {
        return;
    };
    if command.operation != Operation::Write || command.register.is_read_only() {
        return;
    }
    if let Err(err) = settings.update_from(command.register, command.value) {
        tracing::warn!(%command, error = %err, "write does not map to a setting");
    }
}

fn frame_text(frame: &DecodedFrame) -> String {
    format!(
        "{HEADER}{:02X}{}{}{FOOTER}",
        frame.length, frame.payload, frame.checksum
    )
}

/// The first Ctrl-C stops after the frame in flight; a second one exits at once.
fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        if !running.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
