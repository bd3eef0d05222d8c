//! Heuristic "is this pixel roof-colored" predicate.
//!
//! Five disjoint material rules are evaluated in order and the first match
//! wins. All cut-offs live in [`ClassifierThresholds`] so they can be tuned
//! from configuration without touching the rules.

use serde::Serialize;

/// Roofing material recognised by a classifier rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoofMaterial {
    Concrete,
    Terracotta,
    Metal,
    Asphalt,
    LightRoofing,
}

/// Tunable thresholds for the five classifier rules.
///
/// `spread` below means the RMS deviation of the three channels from their
/// mean intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierThresholds {
    /// Concrete: mean intensity strictly inside this range.
    pub concrete_mean: (f64, f64),
    /// Concrete: spread strictly below this.
    pub concrete_max_spread: f64,

    /// Terracotta: red must exceed green by more than this.
    pub terracotta_red_over_green: i32,
    /// Terracotta: red must exceed blue by more than this.
    pub terracotta_red_over_blue: i32,
    /// Terracotta: red strictly inside this range.
    pub terracotta_red: (i32, i32),

    /// Metal: |r-g| and |g-b| strictly below this.
    pub metal_max_channel_delta: i32,
    /// Metal: mean intensity strictly inside this range.
    pub metal_mean: (f64, f64),

    /// Asphalt: mean intensity strictly below this.
    pub asphalt_max_mean: f64,
    /// Asphalt: spread strictly below this.
    pub asphalt_max_spread: f64,

    /// Light roofing: mean intensity strictly above this.
    pub light_min_mean: f64,
    /// Light roofing: spread strictly below this.
    pub light_max_spread: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            concrete_mean: (70.0, 180.0),
            concrete_max_spread: 25.0,
            terracotta_red_over_green: 15,
            terracotta_red_over_blue: 10,
            terracotta_red: (80, 200),
            metal_max_channel_delta: 15,
            metal_mean: (90.0, 170.0),
            asphalt_max_mean: 70.0,
            asphalt_max_spread: 15.0,
            light_min_mean: 200.0,
            light_max_spread: 20.0,
        }
    }
}

/// Deterministic roof-color classifier.
#[derive(Debug, Clone, Default)]
pub struct PixelClassifier {
    thresholds: ClassifierThresholds,
}

#[inline]
fn strictly_between<T: PartialOrd>(value: T, range: (T, T)) -> bool {
    value > range.0 && value < range.1
}

impl PixelClassifier {
    /// Creates a classifier with the given thresholds.
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Returns the first material rule the color satisfies, if any.
    pub fn classify(&self, r: u8, g: u8, b: u8) -> Option<RoofMaterial> {
        let t = &self.thresholds;
        let (ri, gi, bi) = (r as i32, g as i32, b as i32);
        let (rf, gf, bf) = (r as f64, g as f64, b as f64);

        let mean = (rf + gf + bf) / 3.0;
        let spread =
            (((rf - mean).powi(2) + (gf - mean).powi(2) + (bf - mean).powi(2)) / 3.0).sqrt();

        if strictly_between(mean, t.concrete_mean) && spread < t.concrete_max_spread {
            return Some(RoofMaterial::Concrete);
        }

        if ri > gi + t.terracotta_red_over_green
            && ri > bi + t.terracotta_red_over_blue
            && strictly_between(ri, t.terracotta_red)
        {
            return Some(RoofMaterial::Terracotta);
        }

        if (ri - gi).abs() < t.metal_max_channel_delta
            && (gi - bi).abs() < t.metal_max_channel_delta
            && strictly_between(mean, t.metal_mean)
        {
            return Some(RoofMaterial::Metal);
        }

        if mean < t.asphalt_max_mean && spread < t.asphalt_max_spread {
            return Some(RoofMaterial::Asphalt);
        }

        if mean > t.light_min_mean && spread < t.light_max_spread {
            return Some(RoofMaterial::LightRoofing);
        }

        None
    }

    /// `true` when any roof rule matches.
    #[inline]
    pub fn is_roof_color(&self, r: u8, g: u8, b: u8) -> bool {
        self.classify(r, g, b).is_some()
    }

    /// Convenience wrapper over an `[r, g, b]` triple.
    #[inline]
    pub fn is_roof_rgb(&self, rgb: [u8; 3]) -> bool {
        self.is_roof_color(rgb[0], rgb[1], rgb[2])
    }
}

/// Classifies with the default thresholds.
pub fn is_roof_color(r: u8, g: u8, b: u8) -> bool {
    PixelClassifier::default().is_roof_color(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(r: u8, g: u8, b: u8) -> Option<RoofMaterial> {
        PixelClassifier::default().classify(r, g, b)
    }

    #[test]
    fn test_concrete_gray() {
        assert_eq!(classify(120, 120, 120), Some(RoofMaterial::Concrete));
        assert_eq!(classify(130, 120, 110), Some(RoofMaterial::Concrete));
    }

    #[test]
    fn test_terracotta() {
        assert_eq!(classify(180, 90, 60), Some(RoofMaterial::Terracotta));
    }

    #[test]
    fn test_terracotta_red_bounds_are_exclusive() {
        // r = 200 fails the terracotta range, and is too saturated for others
        assert_eq!(classify(200, 90, 60), None);
    }

    #[test]
    fn test_dark_asphalt() {
        assert_eq!(classify(40, 42, 45), Some(RoofMaterial::Asphalt));
    }

    #[test]
    fn test_light_roofing() {
        assert_eq!(classify(235, 235, 240), Some(RoofMaterial::LightRoofing));
    }

    #[test]
    fn test_metal_rule_reachable_with_tight_concrete() {
        let thresholds = ClassifierThresholds {
            concrete_max_spread: 0.0,
            ..Default::default()
        };
        let classifier = PixelClassifier::new(thresholds);
        assert_eq!(classifier.classify(120, 130, 140), Some(RoofMaterial::Metal));
    }

    #[test]
    fn test_vegetation_is_not_roof() {
        assert!(!is_roof_color(40, 140, 40));
        assert!(!is_roof_color(60, 170, 70));
    }

    #[test]
    fn test_water_blue_is_not_roof() {
        assert!(!is_roof_color(20, 60, 160));
    }

    #[test]
    fn test_rgb_wrapper_matches() {
        let classifier = PixelClassifier::default();
        assert_eq!(
            classifier.is_roof_rgb([180, 90, 60]),
            classifier.is_roof_color(180, 90, 60)
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_classifier_is_pure(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                let first = is_roof_color(r, g, b);
                let second = is_roof_color(r, g, b);
                prop_assert_eq!(first, second);
                prop_assert_eq!(first, classify(r, g, b).is_some());
            }

            #[test]
            fn test_neutral_grays_in_concrete_band_are_roof(v in 71u8..180) {
                prop_assert_eq!(classify(v, v, v), Some(RoofMaterial::Concrete));
            }
        }
    }
}
