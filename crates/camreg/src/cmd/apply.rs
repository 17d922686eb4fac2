use camreg_settings::SensorSettings;

use crate::cmd::ApplyArgs;
use crate::exit::{settings_error, CliResult, SUCCESS};
use crate::output::{print_commands, OutputFormat};

pub fn run(args: ApplyArgs, format: OutputFormat) -> CliResult<i32> {
    let settings = SensorSettings::from_path(&args.profile)
        .map_err(|err| settings_error("profile load failed", err))?;
    let commands = settings
        .write_commands()
        .map_err(|err| settings_error("derivation failed", err))?;

    tracing::info!(
        profile = %args.profile.display(),
        writes = commands.len(),
        "derived register writes"
    );
    print_commands(&commands, format)?;
    Ok(SUCCESS)
}
