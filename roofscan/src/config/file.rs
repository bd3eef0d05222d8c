//! INI mapping for [`EngineConfig`].

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use tracing::debug;

use super::{config_file_path, ConfigError};
use crate::coord::MAX_ZOOM;
use crate::detection::{StageTimeouts, DEFAULT_ZOOM};
use crate::provider::{
    ARCGIS_BASE_URL, DEFAULT_HTTP_TIMEOUT, DEFAULT_SEARCH_RADIUS_M, DEFAULT_USER_AGENT,
    GOOGLE_BASE_URL, NOMINATIM_ENDPOINT, OVERPASS_ENDPOINT,
};
use crate::raster::{
    AreaClamp, CenterSampler, ClassifierThresholds, PixelClassifier, RasterAnalyzer,
    RegionSegmenter, SegmenterConfig, DEFAULT_COLOR_THRESHOLD, DEFAULT_NOISE_FLOOR,
    DEFAULT_ROOF_SHARE, DEFAULT_WINDOWS, MAX_PLAUSIBLE_AREA, MIN_PLAUSIBLE_AREA,
};

/// Name of the per-user config directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".roofscan";

/// Name of the config file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

const DETECTION: &str = "detection";
const RASTER: &str = "raster";
const CLASSIFIER: &str = "classifier";
const PROVIDERS: &str = "providers";

/// `[detection]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    /// Imagery zoom used when the caller does not pass one.
    pub zoom: u8,
    pub timeouts: StageTimeouts,
    /// Raw area a stage result must exceed, in m².
    pub plausibility_floor: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            timeouts: StageTimeouts::default(),
            plausibility_floor: MIN_PLAUSIBLE_AREA,
        }
    }
}

/// `[raster]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSettings {
    pub color_threshold: f64,
    pub noise_floor: usize,
    pub roof_share: f64,
    /// Lower clamp bound, 20 m² unless overridden.
    pub min_area: f64,
    /// Upper clamp bound, 2000 m² unless overridden.
    pub max_area: f64,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            color_threshold: DEFAULT_COLOR_THRESHOLD,
            noise_floor: DEFAULT_NOISE_FLOOR,
            roof_share: DEFAULT_ROOF_SHARE,
            min_area: MIN_PLAUSIBLE_AREA,
            max_area: MAX_PLAUSIBLE_AREA,
        }
    }
}

impl RasterSettings {
    pub fn clamp(&self) -> AreaClamp {
        AreaClamp {
            min: self.min_area,
            max: self.max_area,
        }
    }
}

/// `[providers]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub overpass_url: String,
    pub nominatim_url: String,
    pub arcgis_url: String,
    pub google_url: String,
    pub search_radius_m: f64,
    pub user_agent: String,
    pub http_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            overpass_url: OVERPASS_ENDPOINT.to_string(),
            nominatim_url: NOMINATIM_ENDPOINT.to_string(),
            arcgis_url: ARCGIS_BASE_URL.to_string(),
            google_url: GOOGLE_BASE_URL.to_string(),
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub detection: DetectionSettings,
    pub raster: RasterSettings,
    pub classifier: ClassifierThresholds,
    pub providers: ProviderSettings,
}

/// Reads `key` from `section`, falling back to `default` when absent.
fn read<T>(ini: &Ini, section: &str, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    let Some(raw) = ini.section(Some(section)).and_then(|p: &Properties| p.get(key)) else {
        return Ok(default);
    };
    raw.trim()
        .parse()
        .map_err(|_| invalid(section, key, raw))
}

fn read_secs(
    ini: &Ini,
    section: &str,
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let secs: f64 = read(ini, section, key, default.as_secs_f64())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid(section, key, secs));
    }
    Ok(Duration::from_secs_f64(secs))
}

fn invalid(section: &str, key: &str, value: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl EngineConfig {
    /// Loads `~/.roofscan/config.ini`, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ini(&ini)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Writes every setting to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Builds the raster analysis pipeline described by this config.
    pub fn raster_analyzer(&self) -> RasterAnalyzer {
        RasterAnalyzer::new(
            PixelClassifier::new(self.classifier.clone()),
            RegionSegmenter::new(SegmenterConfig {
                color_threshold: self.raster.color_threshold,
                noise_floor: self.raster.noise_floor,
            }),
            CenterSampler::new(DEFAULT_WINDOWS.to_vec(), self.raster.roof_share),
            self.raster.clamp(),
        )
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let d = &defaults.detection;
        let zoom: u8 = read(ini, DETECTION, "zoom", d.zoom)?;
        if zoom > MAX_ZOOM {
            return Err(invalid(DETECTION, "zoom", zoom));
        }
        let detection = DetectionSettings {
            zoom,
            timeouts: StageTimeouts {
                vector: read_secs(ini, DETECTION, "vector_timeout_secs", d.timeouts.vector)?,
                raster: read_secs(ini, DETECTION, "raster_timeout_secs", d.timeouts.raster)?,
                heuristic: read_secs(
                    ini,
                    DETECTION,
                    "heuristic_timeout_secs",
                    d.timeouts.heuristic,
                )?,
            },
            plausibility_floor: read(ini, DETECTION, "plausibility_floor", d.plausibility_floor)?,
        };
        if !detection.plausibility_floor.is_finite() || detection.plausibility_floor < 0.0 {
            return Err(invalid(
                DETECTION,
                "plausibility_floor",
                detection.plausibility_floor,
            ));
        }

        let r = &defaults.raster;
        let raster = RasterSettings {
            color_threshold: read(ini, RASTER, "color_threshold", r.color_threshold)?,
            noise_floor: read(ini, RASTER, "noise_floor", r.noise_floor)?,
            roof_share: read(ini, RASTER, "roof_share", r.roof_share)?,
            min_area: read(ini, RASTER, "min_area", r.min_area)?,
            max_area: read(ini, RASTER, "max_area", r.max_area)?,
        };
        if !(raster.min_area > 0.0 && raster.min_area < raster.max_area) {
            return Err(invalid(
                RASTER,
                "min_area",
                format!("{} (max_area {})", raster.min_area, raster.max_area),
            ));
        }

        let c = &defaults.classifier;
        let classifier = ClassifierThresholds {
            concrete_mean: (
                read(ini, CLASSIFIER, "concrete_mean_min", c.concrete_mean.0)?,
                read(ini, CLASSIFIER, "concrete_mean_max", c.concrete_mean.1)?,
            ),
            concrete_max_spread: read(
                ini,
                CLASSIFIER,
                "concrete_max_spread",
                c.concrete_max_spread,
            )?,
            terracotta_red_over_green: read(
                ini,
                CLASSIFIER,
                "terracotta_red_over_green",
                c.terracotta_red_over_green,
            )?,
            terracotta_red_over_blue: read(
                ini,
                CLASSIFIER,
                "terracotta_red_over_blue",
                c.terracotta_red_over_blue,
            )?,
            terracotta_red: (
                read(ini, CLASSIFIER, "terracotta_red_min", c.terracotta_red.0)?,
                read(ini, CLASSIFIER, "terracotta_red_max", c.terracotta_red.1)?,
            ),
            metal_max_channel_delta: read(
                ini,
                CLASSIFIER,
                "metal_max_channel_delta",
                c.metal_max_channel_delta,
            )?,
            metal_mean: (
                read(ini, CLASSIFIER, "metal_mean_min", c.metal_mean.0)?,
                read(ini, CLASSIFIER, "metal_mean_max", c.metal_mean.1)?,
            ),
            asphalt_max_mean: read(ini, CLASSIFIER, "asphalt_max_mean", c.asphalt_max_mean)?,
            asphalt_max_spread: read(
                ini,
                CLASSIFIER,
                "asphalt_max_spread",
                c.asphalt_max_spread,
            )?,
            light_min_mean: read(ini, CLASSIFIER, "light_min_mean", c.light_min_mean)?,
            light_max_spread: read(ini, CLASSIFIER, "light_max_spread", c.light_max_spread)?,
        };

        let p = &defaults.providers;
        let providers = ProviderSettings {
            overpass_url: read(ini, PROVIDERS, "overpass_url", p.overpass_url.clone())?,
            nominatim_url: read(ini, PROVIDERS, "nominatim_url", p.nominatim_url.clone())?,
            arcgis_url: read(ini, PROVIDERS, "arcgis_url", p.arcgis_url.clone())?,
            google_url: read(ini, PROVIDERS, "google_url", p.google_url.clone())?,
            search_radius_m: read(ini, PROVIDERS, "search_radius_m", p.search_radius_m)?,
            user_agent: read(ini, PROVIDERS, "user_agent", p.user_agent.clone())?,
            http_timeout: read_secs(ini, PROVIDERS, "http_timeout_secs", p.http_timeout)?,
        };

        Ok(Self {
            detection,
            raster,
            classifier,
            providers,
        })
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let d = &self.detection;
        ini.with_section(Some(DETECTION))
            .set("zoom", d.zoom.to_string())
            .set("vector_timeout_secs", d.timeouts.vector.as_secs_f64().to_string())
            .set("raster_timeout_secs", d.timeouts.raster.as_secs_f64().to_string())
            .set(
                "heuristic_timeout_secs",
                d.timeouts.heuristic.as_secs_f64().to_string(),
            )
            .set("plausibility_floor", d.plausibility_floor.to_string());

        let r = &self.raster;
        ini.with_section(Some(RASTER))
            .set("color_threshold", r.color_threshold.to_string())
            .set("noise_floor", r.noise_floor.to_string())
            .set("roof_share", r.roof_share.to_string())
            .set("min_area", r.min_area.to_string())
            .set("max_area", r.max_area.to_string());

        let c = &self.classifier;
        ini.with_section(Some(CLASSIFIER))
            .set("concrete_mean_min", c.concrete_mean.0.to_string())
            .set("concrete_mean_max", c.concrete_mean.1.to_string())
            .set("concrete_max_spread", c.concrete_max_spread.to_string())
            .set(
                "terracotta_red_over_green",
                c.terracotta_red_over_green.to_string(),
            )
            .set(
                "terracotta_red_over_blue",
                c.terracotta_red_over_blue.to_string(),
            )
            .set("terracotta_red_min", c.terracotta_red.0.to_string())
            .set("terracotta_red_max", c.terracotta_red.1.to_string())
            .set(
                "metal_max_channel_delta",
                c.metal_max_channel_delta.to_string(),
            )
            .set("metal_mean_min", c.metal_mean.0.to_string())
            .set("metal_mean_max", c.metal_mean.1.to_string())
            .set("asphalt_max_mean", c.asphalt_max_mean.to_string())
            .set("asphalt_max_spread", c.asphalt_max_spread.to_string())
            .set("light_min_mean", c.light_min_mean.to_string())
            .set("light_max_spread", c.light_max_spread.to_string());

        let p = &self.providers;
        ini.with_section(Some(PROVIDERS))
            .set("overpass_url", p.overpass_url.as_str())
            .set("nominatim_url", p.nominatim_url.as_str())
            .set("arcgis_url", p.arcgis_url.as_str())
            .set("google_url", p.google_url.as_str())
            .set("search_radius_m", p.search_radius_m.to_string())
            .set("user_agent", p.user_agent.as_str())
            .set("http_timeout_secs", p.http_timeout.as_secs_f64().to_string());

        ini
    }

    /// Renders the configuration in INI syntax.
    pub fn to_ini_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini().write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<EngineConfig, ConfigError> {
        let ini = Ini::load_from_str(text).unwrap();
        EngineConfig::from_ini(&ini)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse(
            "[detection]\nzoom = 18\nraster_timeout_secs = 4\n\n[raster]\nnoise_floor = 80\n",
        )
        .unwrap();

        assert_eq!(config.detection.zoom, 18);
        assert_eq!(config.detection.timeouts.raster, Duration::from_secs(4));
        assert_eq!(config.detection.timeouts.vector, Duration::from_secs(10));
        assert_eq!(config.raster.noise_floor, 80);
        assert_eq!(config.raster.color_threshold, DEFAULT_COLOR_THRESHOLD);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = parse("[raster]\nnoise_floor = lots\n").unwrap_err();
        match err {
            ConfigError::InvalidValue {
                section,
                key,
                value,
            } => {
                assert_eq!(section, "raster");
                assert_eq!(key, "noise_floor");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zoom_above_max_is_rejected() {
        assert!(matches!(
            parse("[detection]\nzoom = 23\n"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_inverted_clamp_is_rejected() {
        assert!(matches!(
            parse("[raster]\nmin_area = 500\nmax_area = 100\n"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_bad_plausibility_floor_is_rejected() {
        for value in ["NaN", "inf", "-5"] {
            let result = parse(&format!("[detection]\nplausibility_floor = {value}\n"));
            match result {
                Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "plausibility_floor"),
                other => panic!("{value} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_plausibility_floor_is_allowed() {
        let config = parse("[detection]\nplausibility_floor = 0\n").unwrap();
        assert_eq!(config.detection.plausibility_floor, 0.0);
    }

    #[test]
    fn test_default_clamp_is_plausible_range() {
        let clamp = EngineConfig::default().raster.clamp();
        assert_eq!(clamp, AreaClamp::default());
        assert_eq!(clamp.apply(1.0), MIN_PLAUSIBLE_AREA);
        assert_eq!(clamp.apply(1.0e6), MAX_PLAUSIBLE_AREA);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(matches!(
            parse("[detection]\nvector_timeout_secs = 0\n"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = EngineConfig::default();
        config.detection.zoom = 20;
        config.detection.timeouts.heuristic = Duration::from_millis(2500);
        config.raster.roof_share = 0.25;
        config.classifier.concrete_mean = (60.0, 190.0);
        config.providers.user_agent = "roofscan-test/1.0".to_string();

        config.save_to(&path).unwrap();
        let loaded = EngineConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = EngineConfig::load_from(&dir.path().join("absent.ini"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_ini_string_lists_sections() {
        let text = EngineConfig::default().to_ini_string();
        for section in ["[detection]", "[raster]", "[classifier]", "[providers]"] {
            assert!(text.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_analyzer_uses_configured_clamp() {
        let mut config = EngineConfig::default();
        config.raster.max_area = 500.0;

        let tile = crate::raster::RasterTile::filled(256, 256, [180, 90, 60]);
        let analysis = config.raster_analyzer().analyze(&tile, 0.0, 19).unwrap();
        assert_eq!(analysis.area_square_meters, 500.0);
    }
}
