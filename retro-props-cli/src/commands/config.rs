use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_props_lib::Settings;
use retro_props_lib::settings::settings_path;

use crate::CliError;

/// Show the settings file location and the effective values.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "retro-props Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let settings = Settings::load_from(&path)?;
    for line in settings.to_toml_string()?.lines() {
        log::info!("  {}", line);
    }
    Ok(())
}

pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}

/// Write the default settings unless a file is already there.
pub(crate) fn run_config_init() -> Result<(), CliError> {
    let path = settings_path();
    if path.exists() {
        log::info!(
            "Settings file already exists: {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
        return Ok(());
    }
    Settings::default().save_to(&path)?;
    log::info!(
        "{} {}",
        "Wrote".if_supports_color(Stdout, |t| t.green()),
        path.display(),
    );
    Ok(())
}
