//! Fields `sim_core::config::SimulationConfig` has no use for, but the
//! `[DEFAULT]`/`[ANIMATION]` sections of §6.1 still name: the CLI reads
//! these directly and never forwards them into the engine.

use serde::{Deserialize, Serialize};

/// `[ANIMATION] animation_style` — the front-end rendering mode. None of
/// these render anything in this CLI (the browser/terminal front-ends are
/// out of scope per SPEC_FULL §1); the CLI only distinguishes "none"
/// (attach a `NullSink`) from everything else (attach a `BufferedSink` so
/// at least the final frame is inspectable, and log that the full frontend
/// isn't implemented here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationStyle {
    None,
    Map,
    Stats,
    Console,
    All,
    Bar,
    Text,
    Sequence,
}

impl AnimationStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "map" => Some(Self::Map),
            "stats" => Some(Self::Stats),
            "console" => Some(Self::Console),
            "all" => Some(Self::All),
            "bar" => Some(Self::Bar),
            "text" => Some(Self::Text),
            "sequence" => Some(Self::Sequence),
            _ => None,
        }
    }
}

/// Everything from §6.1 that is not engine state: run metadata, logging
/// setup, the three top-level mode flags (`animate`, `run_sequence`,
/// `use_city_scale` -- `equilibrate` is folded into
/// `SimulationConfig::equilibrate` by the config loader instead, since the
/// engine already has an `EquilibrationMode` to represent it), and the
/// animation knobs this CLI can't act on but must still parse and not
/// silently drop.
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub title: String,
    pub log_file: Option<String>,
    pub verbosity: u8,
    pub animate: bool,
    pub run_sequence: bool,
    pub use_city_scale: bool,
    pub animation_style: AnimationStyle,
    pub annotation: Option<String>,
    pub interpolate: bool,
    pub animation_output_file: Option<String>,
    pub imagemagick_dir: Option<String>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            title: "ridehail simulation".to_string(),
            log_file: None,
            verbosity: 0,
            animate: false,
            run_sequence: false,
            use_city_scale: false,
            animation_style: AnimationStyle::None,
            annotation: None,
            interpolate: false,
            animation_output_file: None,
            imagemagick_dir: None,
        }
    }
}

impl CliOptions {
    /// Map `[DEFAULT] verbosity` onto an `env_logger`/`log` filter level.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    /// The field names this struct owns, lowercase -- mirrors
    /// `fields::KNOWN_FIELDS` for `SimulationConfig`.
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "title",
        "log_file",
        "verbosity",
        "animate",
        "run_sequence",
        "use_city_scale",
        "animation_style",
        "annotation",
        "interpolate",
        "animation_output_file",
        "imagemagick_dir",
    ];

    pub fn is_known_field(key: &str) -> bool {
        Self::FIELD_NAMES.contains(&key.to_ascii_lowercase().as_str())
    }

    /// Apply one `key = value` pair, in the same spirit as
    /// `fields::apply_field`. Returns `Err` for a key this struct doesn't
    /// own or a malformed value; callers distinguish "not mine" from
    /// "malformed" only by trying `fields::apply_field` first.
    pub fn apply_field(&mut self, key: &str, value: &str) -> Result<(), crate::error::CliError> {
        use crate::error::CliError;
        let invalid = |reason: &str| CliError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        match key.to_ascii_lowercase().as_str() {
            "title" => self.title = value.to_string(),
            "log_file" => self.log_file = Some(value.to_string()),
            "verbosity" => self.verbosity = value.trim().parse().map_err(|_| invalid("expected an integer"))?,
            "animate" => {
                self.animate = crate::fields::parse_bool(value).ok_or_else(|| invalid("expected a boolean"))?
            }
            "run_sequence" => {
                self.run_sequence = crate::fields::parse_bool(value).ok_or_else(|| invalid("expected a boolean"))?
            }
            "use_city_scale" => {
                self.use_city_scale = crate::fields::parse_bool(value).ok_or_else(|| invalid("expected a boolean"))?
            }
            "animation_style" => {
                self.animation_style =
                    AnimationStyle::parse(value).ok_or_else(|| invalid("unrecognized animation style"))?
            }
            "annotation" => self.annotation = Some(value.to_string()),
            "interpolate" => {
                self.interpolate = crate::fields::parse_bool(value).ok_or_else(|| invalid("expected a boolean"))?
            }
            "animation_output_file" => self.animation_output_file = Some(value.to_string()),
            "imagemagick_dir" => self.imagemagick_dir = Some(value.to_string()),
            _ => return Err(invalid("unrecognized configuration field")),
        }
        Ok(())
    }
}
