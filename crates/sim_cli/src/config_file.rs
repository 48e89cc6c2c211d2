//! INI config file loading (§6.1). `[DEFAULT]`/`[SIMULATION]`/
//! `[EQUILIBRATION]` share one flat field namespace -- the section split is
//! organizational only, not load-bearing -- and route through
//! `fields::apply_field`. `[ANIMATION]` fields belong to [`CliOptions`].
//! `[CITY_SCALE]`, `[IMPULSES]`, and `[SEQUENCE]` parse into their own
//! dedicated shapes since none of them fit a flat scalar-field model.
//! `[SEQUENCE]`'s `vehicle_count_start`/`request_rate_start` are optional and
//! default to the base config's `vehicle_count`/`base_demand` (see §9).

use std::path::Path;

use ini::{Ini, Properties};
use sim_core::config::{CityScaleConfig, ConfigOverrides, SimulationConfig};
use sim_core::impulses::Impulse;
use sim_core::sequence::{SequenceAxis, SequenceConfig};

use crate::cli_options::CliOptions;
use crate::error::CliError;
use crate::fields;

/// Everything a config file can describe: engine config, CLI-only options,
/// the impulse schedule, an optional sweep, an optional city-scale block.
pub struct LoadedConfig {
    pub config: SimulationConfig,
    pub cli_options: CliOptions,
    pub impulses: Vec<Impulse>,
    pub sequence: Option<SequenceConfig>,
    pub city_scale: Option<CityScaleConfig>,
}

pub fn load_from_path(path: &Path) -> Result<LoadedConfig, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&content, &path.display().to_string())
}

pub fn load_from_str(content: &str, path_for_errors: &str) -> Result<LoadedConfig, CliError> {
    let ini = Ini::load_from_str(content).map_err(|source| CliError::IniParse {
        path: path_for_errors.to_string(),
        source,
    })?;

    let mut config = SimulationConfig::default();
    let mut cli_options = CliOptions::default();

    if let Some(section) = ini.section(None::<String>) {
        apply_section(&mut config, &mut cli_options, section)?;
    }
    for section_name in ["DEFAULT", "SIMULATION", "EQUILIBRATION", "ANIMATION"] {
        if let Some(section) = ini.section(Some(section_name)) {
            apply_section(&mut config, &mut cli_options, section)?;
        }
    }

    let city_scale = ini.section(Some("CITY_SCALE")).map(parse_city_scale).transpose()?;
    let impulses = ini
        .section(Some("IMPULSES"))
        .map(parse_impulses)
        .transpose()?
        .unwrap_or_default();
    let sequence = ini
        .section(Some("SEQUENCE"))
        .map(|section| parse_sequence(section, &config))
        .transpose()?;

    Ok(LoadedConfig {
        config,
        cli_options,
        impulses,
        sequence,
        city_scale,
    })
}

fn apply_section(
    config: &mut SimulationConfig,
    cli_options: &mut CliOptions,
    section: &Properties,
) -> Result<(), CliError> {
    for (key, value) in section.iter() {
        if fields::is_known_field(key) {
            fields::apply_field(config, key, value)?;
        } else if CliOptions::is_known_field(key) {
            cli_options.apply_field(key, value)?;
        } else {
            log::warn!("unrecognized configuration key \"{key}\", ignoring");
        }
    }
    Ok(())
}

fn scale_field(key: &str, value: &str) -> Result<f64, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
        reason: "expected a number".to_string(),
    })
}

fn parse_city_scale(section: &Properties) -> Result<CityScaleConfig, CliError> {
    let mut scale = CityScaleConfig::default();
    for (key, value) in section.iter() {
        match key.to_ascii_lowercase().as_str() {
            "mean_vehicle_speed" => scale.mean_vehicle_speed = scale_field(key, value)?,
            "minutes_per_block" => scale.minutes_per_block = scale_field(key, value)?,
            "per_km_ops_cost" => scale.per_km_ops_cost = scale_field(key, value)?,
            "per_hour_opportunity_cost" => scale.per_hour_opportunity_cost = scale_field(key, value)?,
            "per_km_price" => scale.per_km_price = scale_field(key, value)?,
            "per_minute_price" => scale.per_minute_price = scale_field(key, value)?,
            _ => log::warn!("unrecognized [CITY_SCALE] key \"{key}\", ignoring"),
        }
    }
    Ok(scale)
}

/// One `[IMPULSES]` entry: a JSON object embedding the target block plus
/// the same override fields `ConfigOverrides` carries. INI has no native
/// list or record syntax, so this is the convention: arbitrary key names,
/// JSON-object values.
#[derive(serde::Deserialize)]
struct ImpulseRecord {
    block: u64,
    #[serde(flatten)]
    overrides: ConfigOverrides,
}

fn parse_impulses(section: &Properties) -> Result<Vec<Impulse>, CliError> {
    section
        .iter()
        .map(|(key, value)| {
            let record: ImpulseRecord = serde_json::from_str(value).map_err(|source| CliError::InvalidImpulse {
                key: key.to_string(),
                reason: source.to_string(),
            })?;
            Ok(Impulse {
                block: record.block,
                overrides: record.overrides,
            })
        })
        .collect()
}

fn required<'a>(section: &'a Properties, key: &str) -> Result<&'a str, CliError> {
    section.get(key).ok_or_else(|| CliError::InvalidOverride {
        key: key.to_string(),
        value: String::new(),
        reason: "missing required [SEQUENCE] key".to_string(),
    })
}

fn parse_required<T: std::str::FromStr>(section: &Properties, key: &str) -> Result<T, CliError> {
    let value = required(section, key)?;
    value.trim().parse().map_err(|_| CliError::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
        reason: format!("expected a {}", std::any::type_name::<T>()),
    })
}

/// Parses `key` if present, otherwise returns `default`. `vehicle_count_start`
/// and `request_rate_start` are not in the documented `[SEQUENCE]` key list --
/// a sweep's starting point is, by default, wherever the base config already
/// sits (`config.vehicle_count` / `config.base_demand`), and the key only
/// needs to be spelled out when the sweep should start somewhere else.
fn parse_optional<T: std::str::FromStr>(section: &Properties, key: &str, default: T) -> Result<T, CliError> {
    match section.get(key) {
        Some(value) => value.trim().parse().map_err(|_| CliError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
            reason: format!("expected a {}", std::any::type_name::<T>()),
        }),
        None => Ok(default),
    }
}

fn parse_sequence(section: &Properties, config: &SimulationConfig) -> Result<SequenceConfig, CliError> {
    let vehicle_count = SequenceAxis {
        start: parse_optional(section, "vehicle_count_start", config.vehicle_count)?,
        max: parse_required::<u32>(section, "vehicle_count_max")?,
        increment: parse_required::<u32>(section, "vehicle_count_increment")?,
    };
    let request_rate = SequenceAxis {
        start: parse_optional(section, "request_rate_start", config.base_demand)?,
        max: parse_required::<f64>(section, "request_rate_max")?,
        increment: parse_required::<f64>(section, "request_rate_increment")?,
    };
    let request_rate_repeat = match section.get("request_rate_repeat") {
        Some(value) => value.trim().parse().map_err(|_| CliError::InvalidOverride {
            key: "request_rate_repeat".to_string(),
            value: value.to_string(),
            reason: "expected an integer".to_string(),
        })?,
        None => 1,
    };

    Ok(SequenceConfig {
        base_config: *config,
        vehicle_count,
        request_rate,
        request_rate_repeat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_simple_scalar_fields() {
        let loaded = load_from_str(
            "[SIMULATION]\nvehicle_count = 25\ncity_size = 16\n",
            "test.config",
        )
        .expect("valid ini");
        assert_eq!(loaded.config.vehicle_count, 25);
        assert_eq!(loaded.config.city_size, 16);
    }

    #[test]
    fn animation_fields_land_on_cli_options() {
        let loaded = load_from_str("[ANIMATION]\nanimation_style = map\ntitle = evening\n", "test.config")
            .expect("valid ini");
        assert_eq!(loaded.cli_options.animation_style, crate::cli_options::AnimationStyle::Map);
        assert_eq!(loaded.cli_options.title, "evening");
    }

    #[test]
    fn unknown_keys_are_ignored_not_rejected() {
        let loaded = load_from_str("[SIMULATION]\nnot_a_real_field = 1\n", "test.config").expect("valid ini");
        assert_eq!(loaded.config, SimulationConfig::default());
    }

    #[test]
    fn malformed_known_field_is_an_error() {
        let err = load_from_str("[SIMULATION]\nvehicle_count = not-a-number\n", "test.config").unwrap_err();
        assert!(matches!(err, CliError::InvalidOverride { .. }));
    }

    #[test]
    fn city_scale_section_parses() {
        let loaded = load_from_str(
            "[CITY_SCALE]\nmean_vehicle_speed = 45.0\nminutes_per_block = 2.0\n",
            "test.config",
        )
        .expect("valid ini");
        let scale = loaded.city_scale.expect("city scale present");
        assert_eq!(scale.mean_vehicle_speed, 45.0);
        assert_eq!(scale.minutes_per_block, 2.0);
    }

    #[test]
    fn impulses_section_parses_json_records() {
        let loaded = load_from_str(
            "[IMPULSES]\nfirst = {\"block\": 100, \"price\": 1.5}\n",
            "test.config",
        )
        .expect("valid ini");
        assert_eq!(loaded.impulses.len(), 1);
        assert_eq!(loaded.impulses[0].block, 100);
        assert_eq!(loaded.impulses[0].overrides.price, Some(1.5));
    }

    #[test]
    fn malformed_impulse_json_is_an_error() {
        let err = load_from_str("[IMPULSES]\nfirst = not json\n", "test.config").unwrap_err();
        assert!(matches!(err, CliError::InvalidImpulse { .. }));
    }

    #[test]
    fn sequence_section_parses_axes_and_defaults_repeat() {
        let loaded = load_from_str(
            "[SEQUENCE]\nvehicle_count_start = 10\nvehicle_count_max = 100\nvehicle_count_increment = 10\n\
             request_rate_start = 0.1\nrequest_rate_max = 0.5\nrequest_rate_increment = 0.1\n",
            "test.config",
        )
        .expect("valid ini");
        let sequence = loaded.sequence.expect("sequence present");
        assert_eq!(sequence.request_rate_repeat, 1);
        assert_eq!(sequence.vehicle_count.start, 10);
    }

    #[test]
    fn sequence_section_missing_key_is_an_error() {
        let err = load_from_str("[SEQUENCE]\nvehicle_count_max = 100\n", "test.config").unwrap_err();
        assert!(matches!(err, CliError::InvalidOverride { .. }));
    }

    #[test]
    fn sequence_section_defaults_start_axes_to_base_config() {
        let loaded = load_from_str(
            "[SIMULATION]\nvehicle_count = 25\nbase_demand = 0.3\n\
             [SEQUENCE]\nvehicle_count_max = 100\nvehicle_count_increment = 10\n\
             request_rate_max = 0.5\nrequest_rate_increment = 0.1\n",
            "test.config",
        )
        .expect("valid ini, start axes omitted");
        let sequence = loaded.sequence.expect("sequence present");
        assert_eq!(sequence.vehicle_count.start, 25);
        assert_eq!(sequence.request_rate.start, 0.3);
    }

    #[test]
    fn invalid_ini_syntax_is_reported() {
        let err = load_from_str("[SIMULATION\nvehicle_count = 1\n", "test.config").unwrap_err();
        assert!(matches!(err, CliError::IniParse { .. }));
    }
}
