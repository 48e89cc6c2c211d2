//! Shared `key = value` field application: both the INI config loader and
//! the CLI's trailing `key=value` overrides end up calling the same
//! setter, so the parsing/validation logic for each key lives exactly
//! once here.

use sim_core::config::{EquilibrationMode, SimulationConfig};

use crate::error::CliError;

/// Parse an INI-style boolean: `true`/`false`, `yes`/`no`, `1`/`0`,
/// case-insensitive, matching how the rest of the file's scalar fields are
/// written.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Every key [`apply_field`] recognizes, lowercase. Used by the config-file
/// loader to decide whether an unrecognized INI key belongs to
/// [`crate::cli_options::CliOptions`] instead, or is simply unknown (and
/// should be warned about rather than rejected, per §6.1).
pub const KNOWN_FIELDS: &[&str] = &[
    "city_size",
    "vehicle_count",
    "base_demand",
    "trip_inhomogeneity",
    "trip_inhomogeneous_destinations",
    "min_trip_distance",
    "max_trip_distance",
    "idle_vehicles_moving",
    "random_number_seed",
    "results_window",
    "smoothing_window",
    "animate_update_period",
    "time_blocks",
    "equilibrate",
    "price",
    "platform_commission",
    "reservation_wage",
    "demand_elasticity",
    "equilibration_interval",
];

pub fn is_known_field(key: &str) -> bool {
    KNOWN_FIELDS.contains(&key.to_ascii_lowercase().as_str())
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> CliError {
    CliError::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, format!("expected a {}", std::any::type_name::<T>())))
}

/// Apply one `key = value` pair to `config`, where `key` is the field name
/// as it appears in `[SIMULATION]`/`[EQUILIBRATION]` (case-insensitive,
/// underscored). Unknown keys are reported as errors here; callers that
/// want "warn and skip" behavior for unrecognized INI keys (§6.1) catch
/// `CliError::InvalidOverride` and log instead of propagating.
pub fn apply_field(config: &mut SimulationConfig, key: &str, value: &str) -> Result<(), CliError> {
    match key.to_ascii_lowercase().as_str() {
        "city_size" => config.city_size = parse_field(key, value)?,
        "vehicle_count" => config.vehicle_count = parse_field(key, value)?,
        "base_demand" => config.base_demand = parse_field(key, value)?,
        "trip_inhomogeneity" => config.trip_inhomogeneity = parse_field(key, value)?,
        "trip_inhomogeneous_destinations" => {
            config.trip_inhomogeneous_destinations =
                parse_bool(value).ok_or_else(|| invalid(key, value, "expected a boolean"))?;
        }
        "min_trip_distance" => config.min_trip_distance = parse_field(key, value)?,
        "max_trip_distance" => {
            let trimmed = value.trim();
            config.max_trip_distance = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_field(key, trimmed)?)
            };
        }
        "idle_vehicles_moving" => {
            config.idle_vehicles_moving = parse_bool(value).ok_or_else(|| invalid(key, value, "expected a boolean"))?;
        }
        "random_number_seed" => {
            let trimmed = value.trim();
            config.random_number_seed = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_field(key, trimmed)?)
            };
        }
        "results_window" => config.results_window = parse_field(key, value)?,
        "smoothing_window" => config.smoothing_window = parse_field(key, value)?,
        "animate_update_period" => config.animate_update_period = parse_field(key, value)?,
        "time_blocks" => config.time_blocks = parse_field(key, value)?,
        "equilibrate" => {
            config.equilibrate = match value.to_ascii_lowercase().as_str() {
                "none" => EquilibrationMode::None,
                "price" => EquilibrationMode::Price,
                _ => return Err(invalid(key, value, "expected \"none\" or \"price\"")),
            };
        }
        "price" => config.price = parse_field(key, value)?,
        "platform_commission" => config.platform_commission = parse_field(key, value)?,
        "reservation_wage" => config.reservation_wage = parse_field(key, value)?,
        "demand_elasticity" => config.demand_elasticity = parse_field(key, value)?,
        "equilibration_interval" => config.equilibration_interval = parse_field(key, value)?,
        _ => return Err(invalid(key, value, "unrecognized configuration field")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_a_known_scalar_field() {
        let mut config = SimulationConfig::default();
        apply_field(&mut config, "vehicle_count", "42").unwrap();
        assert_eq!(config.vehicle_count, 42);
    }

    #[test]
    fn is_case_insensitive_on_the_key() {
        let mut config = SimulationConfig::default();
        apply_field(&mut config, "VEHICLE_COUNT", "7").unwrap();
        assert_eq!(config.vehicle_count, 7);
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut config = SimulationConfig::default();
        let err = apply_field(&mut config, "not_a_field", "1").unwrap_err();
        assert!(matches!(err, CliError::InvalidOverride { .. }));
    }

    #[test]
    fn rejects_malformed_values() {
        let mut config = SimulationConfig::default();
        let err = apply_field(&mut config, "vehicle_count", "not-a-number").unwrap_err();
        assert!(matches!(err, CliError::InvalidOverride { .. }));
    }

    #[test]
    fn none_clears_an_optional_field() {
        let mut config = SimulationConfig {
            max_trip_distance: Some(5),
            ..SimulationConfig::default()
        };
        apply_field(&mut config, "max_trip_distance", "none").unwrap();
        assert_eq!(config.max_trip_distance, None);
    }

    #[test]
    fn equilibrate_accepts_named_modes() {
        let mut config = SimulationConfig::default();
        apply_field(&mut config, "equilibrate", "price").unwrap();
        assert_eq!(config.equilibrate, EquilibrationMode::Price);
    }

    #[test]
    fn known_field_lookup_is_case_insensitive() {
        assert!(is_known_field("City_Size"));
        assert!(!is_known_field("title"));
    }

    #[test]
    fn parses_boolean_synonyms() {
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
