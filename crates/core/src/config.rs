//! Tunable heuristics for the layout reconstruction pipeline.
//!
//! Every threshold used by the normalizer, line grouper, spacing
//! reconstructor, redaction box detector and overlap analyzer lives in
//! [`LayoutConfig`].  Values can be loaded from a TOML document (kebab-case
//! keys, missing keys fall back to the defaults) and must pass
//! [`LayoutConfig::validate`] before any page is processed.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the line grouper tracks the reference baseline of an open line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselinePolicy {
    /// The first word's top edge is the baseline for the whole line.
    #[default]
    Fixed,
    /// The baseline is the mean top edge of every word accepted so far.
    RunningMean,
}

impl std::fmt::Display for BaselinePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselinePolicy::Fixed => write!(f, "fixed"),
            BaselinePolicy::RunningMean => write!(f, "running-mean"),
        }
    }
}

impl std::str::FromStr for BaselinePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(BaselinePolicy::Fixed),
            "running-mean" => Ok(BaselinePolicy::RunningMean),
            other => Err(ConfigError::InvalidValue {
                parameter: "baseline",
                value: other.to_string(),
                expected: "`fixed` or `running-mean`",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayoutConfig {
    /// Maximum vertical distance (page units) between a word's top edge and
    /// the line baseline.
    pub line_tolerance: f64,
    pub baseline: BaselinePolicy,
    /// Multiplier applied to the inferred character width to obtain the
    /// width of one reconstructed space.
    pub space_unit: f64,
    /// Character width override; when unset the median per-line single
    /// character width is used.
    pub char_width: Option<f64>,
    /// Minimum number of spaces inserted between two separated words.
    pub min_spaces: u32,
    /// Gaps at or below this many space units count as touching glyphs.
    pub touch_gap: f64,
    /// Minimum fraction of a word's area that must lie under a box.
    pub overlap_fraction: f64,
    pub min_box_area: f64,
    pub min_box_width: f64,
    pub min_box_height: f64,
    /// Largest RGB component (0..1) a fill may have and still count as dark.
    pub dark_threshold: f64,
    /// Minimum fill alpha, when the shape source reports one.
    pub min_opacity: f64,
    /// Treat fills without color information as opaque redaction bars.
    pub accept_unknown_fill: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            baseline: BaselinePolicy::Fixed,
            space_unit: 1.0,
            char_width: None,
            min_spaces: 1,
            touch_gap: 0.1,
            overlap_fraction: 0.5,
            min_box_area: 50.0,
            min_box_width: 10.0,
            min_box_height: 5.0,
            dark_threshold: 0.1,
            min_opacity: 0.9,
            accept_unknown_fill: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a TOML document, filling unspecified keys with defaults.
    ///
    /// The result is validated before it is returned.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its documented range.
    ///
    /// Returns the first offending parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("line-tolerance", self.line_tolerance, 0.0, f64::MAX, ">= 0")?;
        check_positive("space-unit", self.space_unit)?;
        if let Some(width) = self.char_width {
            check_positive("char-width", width)?;
        }
        if self.min_spaces < 1 {
            return Err(ConfigError::InvalidValue {
                parameter: "min-spaces",
                value: self.min_spaces.to_string(),
                expected: ">= 1",
            });
        }
        check_range("touch-gap", self.touch_gap, 0.0, f64::MAX, ">= 0")?;
        check_range("overlap-fraction", self.overlap_fraction, 0.0, 1.0, "between 0 and 1")?;
        check_range("min-box-area", self.min_box_area, 0.0, f64::MAX, ">= 0")?;
        check_range("min-box-width", self.min_box_width, 0.0, f64::MAX, ">= 0")?;
        check_range("min-box-height", self.min_box_height, 0.0, f64::MAX, ">= 0")?;
        if !(self.dark_threshold > 0.0 && self.dark_threshold <= 1.0) {
            return Err(ConfigError::OutOfRange {
                parameter: "dark-threshold",
                value: self.dark_threshold,
                expected: "in (0, 1]",
            });
        }
        check_range("min-opacity", self.min_opacity, 0.0, 1.0, "between 0 and 1")?;
        Ok(())
    }
}

fn check_range(
    parameter: &'static str,
    value: f64,
    min: f64,
    max: f64,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value,
            expected,
        })
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value,
            expected: "> 0",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance_names_parameter() {
        let config = LayoutConfig {
            line_tolerance: -1.0,
            ..LayoutConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("line-tolerance"), "{err}");
    }

    #[test]
    fn test_overlap_fraction_above_one_rejected() {
        let config = LayoutConfig {
            overlap_fraction: 1.5,
            ..LayoutConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                parameter: "overlap-fraction",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_space_unit_rejected() {
        let config = LayoutConfig {
            space_unit: 0.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let config = LayoutConfig {
            touch_gap: f64::NAN,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dark_threshold_range() {
        for bad in [0.0, 1.5, f64::NAN] {
            let config = LayoutConfig {
                dark_threshold: bad,
                ..LayoutConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::OutOfRange {
                    parameter: "dark-threshold",
                    expected: "in (0, 1]",
                    ..
                })
            ));
        }
        let config = LayoutConfig {
            dark_threshold: 1.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_min_spaces_rejected() {
        let config = LayoutConfig {
            min_spaces: 0,
            ..LayoutConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min-spaces"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = LayoutConfig::from_toml_str(
            r#"
            line-tolerance = 3.5
            baseline = "running-mean"
            char-width = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.line_tolerance, 3.5);
        assert_eq!(config.baseline, BaselinePolicy::RunningMean);
        assert_eq!(config.char_width, Some(5.0));
        assert_eq!(config.min_spaces, 1);
        assert_eq!(config.overlap_fraction, 0.5);
    }

    #[test]
    fn test_from_toml_invalid_value() {
        let err = LayoutConfig::from_toml_str("overlap-fraction = 2.0").unwrap_err();
        assert!(err.to_string().contains("overlap-fraction"));
    }

    #[test]
    fn test_from_toml_unknown_key() {
        let err = LayoutConfig::from_toml_str("line-tol = 2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_baseline_policy_from_str() {
        assert_eq!(
            "running-mean".parse::<BaselinePolicy>().unwrap(),
            BaselinePolicy::RunningMean
        );
        assert!("sloped".parse::<BaselinePolicy>().is_err());
        assert_eq!(BaselinePolicy::Fixed.to_string(), "fixed");
    }
}
