use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Longest accepted `rail.autoplay` interval.
pub const MAX_AUTOPLAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Lowest non-zero FPS cap; anything below it is rejected rather than rounded.
pub const MIN_FPS: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of `config.toml`. Every table and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub rail: RailSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub gradient: GradientSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendSection {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RailSection {
    #[serde(rename = "loop", default = "default_true")]
    pub looping: bool,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub autoplay: Option<Duration>,
}

impl Default for RailSection {
    fn default() -> Self {
        Self {
            looping: true,
            autoplay: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneSetting {
    Local,
    Utc,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DisplaySection {
    pub date_format: Option<String>,
    pub timezone: Option<TimezoneSetting>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradientSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    #[serde(default)]
    pub size: Option<String>,
}

impl Default for GradientSection {
    fn default() -> Self {
        Self {
            enabled: true,
            fps: None,
            antialias: None,
            size: None,
        }
    }
}

impl GradientSection {
    /// Parsed `size`, if one was configured.
    pub fn surface_size(&self) -> Result<Option<(u32, u32)>, ConfigError> {
        self.size
            .as_deref()
            .map(|raw| {
                parse_surface_size(raw)
                    .map_err(|err| ConfigError::Invalid(format!("gradient.size: {err}")))
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    /// MSAA sample count, `None` for `auto`.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

fn default_true() -> bool {
    true
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = v.trim();
            if matches!(trimmed.to_ascii_lowercase().as_str(), "off" | "none" | "") {
                return Ok(None);
            }
            humantime::parse_duration(trimmed)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v {
                Err(E::custom("autoplay needs an interval, e.g. \"8s\""))
            } else {
                Ok(None)
            }
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" => Err("anti-alias mode must not be empty".to_string()),
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!(
            "invalid antialias setting '{other}'; use auto/off or 2/4/8/16"
        )),
    }
}

/// Accepts `0` (uncapped) or a finite cap of at least [`MIN_FPS`].
pub fn check_fps(fps: f32) -> Result<f32, String> {
    if fps == 0.0 || (fps.is_finite() && fps >= MIN_FPS) {
        Ok(fps)
    } else {
        Err(format!("fps must be 0 (uncapped) or at least {MIN_FPS}, got {fps}"))
    }
}

/// Parses `WIDTHxHEIGHT`; both sides must be non-zero.
pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

impl FeedConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FeedConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("backend.url", &self.backend.url),
            ("backend.anon_key", &self.backend.anon_key),
            ("backend.table", &self.backend.table),
            ("display.date_format", &self.display.date_format),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }

        if let Some(interval) = self.rail.autoplay {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "rail.autoplay must be greater than zero".into(),
                ));
            }
            if interval > MAX_AUTOPLAY {
                return Err(ConfigError::Invalid(format!(
                    "rail.autoplay must be at most {}",
                    humantime::format_duration(MAX_AUTOPLAY)
                )));
            }
        }

        if let Some(images) = &self.display.images {
            if images.is_empty() {
                return Err(ConfigError::Invalid(
                    "display.images must list at least one image".into(),
                ));
            }
            if images.iter().any(|image| image.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "display.images contains an empty entry".into(),
                ));
            }
        }

        if let Some(fps) = self.gradient.fps {
            check_fps(fps).map_err(|err| ConfigError::Invalid(format!("gradient.{err}")))?;
        }

        self.gradient.surface_size()?;

        Ok(())
    }
}
