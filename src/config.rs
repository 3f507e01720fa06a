use std::path::Path;

use serde::Deserialize;

use crate::error::{PairGenomeError, Result};
use crate::layers::GridLayout;
use crate::partition::Strategy;

/// Records with a dimension at or below this many bp are hidden at overview zoom.
pub const DEFAULT_COARSE_CUTOFF: u64 = 10_000_000;

/// Range and step of the colour-scale slider.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        SliderConfig {
            min: 1.0,
            max: 10_000.0,
            step: 10.0,
        }
    }
}

impl SliderConfig {
    /// Snaps `value` onto the slider's `min + n * step` grid within range.
    pub fn snap(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return value;
        }
        let steps = ((value - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        if snapped > self.max {
            snapped - self.step
        } else {
            snapped
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub margin: f64,
    pub color_scale: f64,
    pub coarse_cutoff: u64,
    pub layout: GridLayout,
    pub strategy: Strategy,
    pub slider: SliderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 1500,
            height: 1000,
            margin: 17.0,
            color_scale: 20.0,
            coarse_cutoff: DEFAULT_COARSE_CUTOFF,
            layout: GridLayout::default(),
            strategy: Strategy::default(),
            slider: SliderConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PairGenomeError::Config(format!(
                "chart size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if !(self.margin >= 0.0) || self.margin >= f64::from(self.height) {
            return Err(PairGenomeError::Config(format!(
                "margin {} must lie within the chart height {}",
                self.margin, self.height
            )));
        }
        if !(self.color_scale > 0.0) {
            return Err(PairGenomeError::Config(format!(
                "color scale {} must be positive",
                self.color_scale
            )));
        }
        if self.slider.min > self.slider.max {
            return Err(PairGenomeError::Config(format!(
                "slider range {}..{} is inverted",
                self.slider.min, self.slider.max
            )));
        }
        Ok(())
    }
}
