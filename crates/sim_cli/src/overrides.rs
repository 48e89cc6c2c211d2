//! Trailing `key=value` CLI arguments (§6.4): applied on top of whatever
//! the config file set, in the order given on the command line. Unlike the
//! config-file loader, an unrecognized key here is a hard error rather
//! than a warning -- the user typed it explicitly, on this invocation.

use sim_core::config::SimulationConfig;

use crate::cli_options::CliOptions;
use crate::error::CliError;
use crate::fields;

pub fn apply_cli_overrides(
    args: &[String],
    config: &mut SimulationConfig,
    cli_options: &mut CliOptions,
) -> Result<(), CliError> {
    for arg in args {
        let (key, value) = arg.split_once('=').ok_or_else(|| CliError::InvalidOverride {
            key: arg.clone(),
            value: String::new(),
            reason: "expected key=value".to_string(),
        })?;

        if fields::is_known_field(key) {
            fields::apply_field(config, key, value)?;
        } else if CliOptions::is_known_field(key) {
            cli_options.apply_field(key, value)?;
        } else {
            return Err(CliError::InvalidOverride {
                key: key.to_string(),
                value: value.to_string(),
                reason: "unrecognized configuration field".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_engine_and_cli_fields_in_one_pass() {
        let mut config = SimulationConfig::default();
        let mut cli_options = CliOptions::default();
        let args = vec!["vehicle_count=30".to_string(), "title=rush-hour".to_string()];
        apply_cli_overrides(&args, &mut config, &mut cli_options).unwrap();
        assert_eq!(config.vehicle_count, 30);
        assert_eq!(cli_options.title, "rush-hour");
    }

    #[test]
    fn rejects_arguments_without_an_equals_sign() {
        let mut config = SimulationConfig::default();
        let mut cli_options = CliOptions::default();
        let args = vec!["vehicle_count".to_string()];
        assert!(apply_cli_overrides(&args, &mut config, &mut cli_options).is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut config = SimulationConfig::default();
        let mut cli_options = CliOptions::default();
        let args = vec!["not_a_field=1".to_string()];
        assert!(apply_cli_overrides(&args, &mut config, &mut cli_options).is_err());
    }
}
