//! Configuration initialization and hierarchy management

use tracing::debug;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::error::SizeFitResult;

/// Build the effective configuration following precedence: CLI > Env > File > Defaults.
///
/// Environment overrides arrive through clap's `env` support, so by the time
/// this runs `cli.encoder` and `cli.log_level` already hold CLI-or-env values.
pub fn initialize_configuration_hierarchy(cli: &Cli) -> SizeFitResult<AppConfig> {
    // Steps 1 and 2: defaults, then the config file if there is one
    let mut config = TomlConfigAdapter::load_or_default(cli.config.as_deref())?;

    // Steps 3 and 4: environment and CLI overrides
    apply_cli_configuration_overrides(&mut config, cli);

    config.validate()?;
    Ok(config)
}

/// Apply CLI (or environment) overrides to configuration
fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) -> usize {
    let mut cli_overrides = 0;

    if let Some(encoder) = &cli.encoder {
        debug!("CLI override: encoder = {}", encoder.display());
        config.encoder = Some(encoder.clone());
        cli_overrides += 1;
    }
    if let Some(level) = &cli.log_level {
        debug!("CLI override: log_level = {}", level);
        config.log_level = level.clone();
        cli_overrides += 1;
    }

    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }
    cli_overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn explicit_file_then_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sizefit.toml");
        std::fs::write(
            &path,
            "[sizefit]\nencoder = \"/from/file/ffmpeg\"\nlog_level = \"warn\"\ncontainer = \"matroska\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "sizefit",
            "--config",
            path.to_str().unwrap(),
            "--encoder",
            "/from/cli/ffmpeg",
            "timestamp",
            "1",
        ])
        .unwrap();

        let config = initialize_configuration_hierarchy(&cli).unwrap();
        assert_eq!(config.encoder.as_deref(), Some(std::path::Path::new("/from/cli/ffmpeg")));
        assert_eq!(config.container, "matroska");
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sizefit.toml");
        std::fs::write(&path, "[sizefit]\nlog_level = \"warn\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "sizefit",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "shouty",
            "timestamp",
            "1",
        ])
        .unwrap();
        assert!(initialize_configuration_hierarchy(&cli).is_err());
    }
}
