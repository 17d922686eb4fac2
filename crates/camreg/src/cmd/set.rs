use std::path::Path;

use camreg_settings::SensorSettings;

use crate::cmd::{usage, SetArgs};
use crate::exit::{io_error, settings_error, CliResult, SUCCESS};
use crate::output::{print_commands, OutputFormat};

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let mut settings = match &args.profile {
        Some(path) => load_profile(path, args.save)?,
        None => SensorSettings::default(),
    };

    let mut commands = Vec::with_capacity(args.changes.len());
    for change in &args.changes {
        let command = settings
            .apply(*change)
            .map_err(|err| settings_error(&format!("cannot apply {change}"), err))?;
        commands.push(command);
    }

    if let (true, Some(path)) = (args.save, &args.profile) {
        let json = settings
            .to_json_pretty()
            .map_err(|err| settings_error("profile encode failed", err))?;
        std::fs::write(path, json + "\n")
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
        tracing::info!(profile = %path.display(), "saved settings profile");
    }

    print_commands(&commands, format)?;
    Ok(SUCCESS)
}

/// With `--save`, a missing profile starts from defaults and gets created.
fn load_profile(path: &Path, save: bool) -> CliResult<SensorSettings> {
    if !path.exists() {
        if save {
            return Ok(SensorSettings::default());
        }
        return Err(usage(format!("profile {} does not exist", path.display())));
    }
    SensorSettings::from_path(path).map_err(|err| settings_error("profile load failed", err))
}
