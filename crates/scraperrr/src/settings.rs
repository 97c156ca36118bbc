use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use articles::{BackendConfig, DateStyle, DateZone, ImageSet};
use feedconfig::{AntialiasSetting, FeedConfig, TimezoneSetting};
use gradient::{Antialiasing, GradientConfig};

use crate::cli::{BackendArgs, RunArgs};

/// Focus rail behaviour resolved from `[rail]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailOptions {
    pub looping: bool,
    pub autoplay: Option<Duration>,
}

/// Everything the root view needs, with flags layered over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: Option<BackendConfig>,
    pub rail: RailOptions,
    pub images: ImageSet,
    pub dates: DateStyle,
    pub gradient: GradientConfig,
}

impl Settings {
    pub fn resolve(config: &FeedConfig, backend: &BackendArgs, run: &RunArgs) -> Result<Self> {
        let backend = resolve_backend(config, backend)?;

        let images = match &config.display.images {
            Some(list) => ImageSet::new(list.clone())
                .ok_or_else(|| anyhow!("display.images must not be empty"))?,
            None => ImageSet::stock(),
        };

        let zone = match config.display.timezone {
            Some(TimezoneSetting::Utc) => DateZone::Utc,
            Some(TimezoneSetting::Local) | None => DateZone::Local,
        };
        let format = config
            .display
            .date_format
            .as_deref()
            .unwrap_or(DateStyle::DEFAULT_FORMAT);
        let dates = DateStyle::new(format, zone).context("invalid display.date_format")?;

        let defaults = GradientConfig::default();
        let surface_size = match run.size {
            Some(size) => size,
            None => config
                .gradient
                .surface_size()?
                .unwrap_or(defaults.surface_size),
        };
        let target_fps = match run.fps.or(config.gradient.fps) {
            Some(v) if v > 0.0 => Some(v),
            _ => None,
        };
        let antialiasing = run
            .antialias
            .or(config.gradient.antialias.map(antialiasing_from))
            .unwrap_or(defaults.antialiasing);

        let gradient = GradientConfig {
            enabled: config.gradient.enabled && !run.no_gradient,
            surface_size,
            antialiasing,
            target_fps,
            ..defaults
        };

        Ok(Self {
            backend,
            rail: RailOptions {
                looping: config.rail.looping,
                autoplay: config.rail.autoplay,
            },
            images,
            dates,
            gradient,
        })
    }

    /// Backend settings, or an error naming the missing pieces.
    pub fn require_backend(&self) -> Result<&BackendConfig> {
        self.backend.as_ref().ok_or_else(|| {
            anyhow!(
                "no backend configured; pass --supabase-url/--supabase-key, set \
                 SCRAPERRR_SUPABASE_URL/SCRAPERRR_SUPABASE_KEY, or fill [backend] in config.toml"
            )
        })
    }
}

fn resolve_backend(config: &FeedConfig, args: &BackendArgs) -> Result<Option<BackendConfig>> {
    let url = args
        .supabase_url
        .as_deref()
        .or(config.backend.url.as_deref());
    let key = args
        .supabase_key
        .as_deref()
        .or(config.backend.anon_key.as_deref());

    let (url, key) = match (url, key) {
        (Some(url), Some(key)) => (url, key),
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(anyhow!("backend url is set but the API key is missing")),
        (None, Some(_)) => return Err(anyhow!("backend API key is set but the url is missing")),
    };

    let mut backend = BackendConfig::new(url, key).context("invalid backend settings")?;
    if let Some(table) = &config.backend.table {
        backend = backend.with_table(table.trim());
    }
    Ok(Some(backend))
}

pub fn antialiasing_from(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(doc: &str) -> FeedConfig {
        FeedConfig::from_toml_str(doc).unwrap()
    }

    #[test]
    fn defaults_without_backend() {
        let settings =
            Settings::resolve(&FeedConfig::default(), &BackendArgs::default(), &RunArgs::default())
                .unwrap();
        assert!(settings.backend.is_none());
        assert!(settings.require_backend().is_err());
        assert!(settings.rail.looping);
        assert!(settings.rail.autoplay.is_none());
        assert_eq!(settings.images, ImageSet::stock());
        assert_eq!(settings.dates, DateStyle::default());
        assert!(settings.gradient.enabled);
        assert_eq!(settings.gradient.surface_size, (1280, 720));
        assert!(settings.gradient.target_fps.is_none());
    }

    #[test]
    fn flags_override_config_file() {
        let file = config(
            r#"
[backend]
url = "https://file.supabase.co"
anon_key = "file-key"
table = "news"

[gradient]
fps = 24
antialias = "4"
size = "640x480"
"#,
        );
        let backend = BackendArgs {
            config: None,
            supabase_url: Some("https://flag.supabase.co".into()),
            supabase_key: None,
        };
        let run = RunArgs {
            no_gradient: true,
            size: Some((800, 600)),
            fps: Some(0.0),
            antialias: None,
        };
        let settings = Settings::resolve(&file, &backend, &run).unwrap();
        let resolved = settings.require_backend().unwrap();
        assert_eq!(resolved.base_url.as_str(), "https://flag.supabase.co/");
        assert_eq!(resolved.anon_key, "file-key");
        assert_eq!(resolved.table, "news");
        assert!(!settings.gradient.enabled);
        assert_eq!(settings.gradient.surface_size, (800, 600));
        assert!(settings.gradient.target_fps.is_none());
        assert_eq!(settings.gradient.antialiasing, Antialiasing::Samples(4));
    }

    #[test]
    fn half_configured_backend_is_an_error() {
        let backend = BackendArgs {
            config: None,
            supabase_url: Some("https://demo.supabase.co".into()),
            supabase_key: None,
        };
        assert!(Settings::resolve(&FeedConfig::default(), &backend, &RunArgs::default()).is_err());
    }

    #[test]
    fn display_section_shapes_items() {
        let file = config(
            r#"
[display]
date_format = "%d.%m.%Y"
timezone = "utc"
images = ["one.jpg"]

[rail]
loop = false
autoplay = "3s"
"#,
        );
        let settings =
            Settings::resolve(&file, &BackendArgs::default(), &RunArgs::default()).unwrap();
        assert_eq!(settings.images.len(), 1);
        assert_eq!(
            settings.dates,
            DateStyle::new("%d.%m.%Y", DateZone::Utc).unwrap()
        );
        assert_eq!(
            settings.rail,
            RailOptions {
                looping: false,
                autoplay: Some(Duration::from_secs(3)),
            }
        );
    }

    #[test]
    fn maps_antialias_settings() {
        assert_eq!(antialiasing_from(AntialiasSetting::Auto), Antialiasing::Auto);
        assert_eq!(antialiasing_from(AntialiasSetting::Off), Antialiasing::Off);
        assert_eq!(
            antialiasing_from(AntialiasSetting::Samples8),
            Antialiasing::Samples(8)
        );
    }
}
