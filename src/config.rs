//! Runtime configuration.
//!
//! Defaults match the bench rig the viewer was tuned on: a 50-sample chart,
//! a 12-bit ADC behind a 5 V hall sensor, and a 50 mT peak threshold.

use std::time::Duration;

use crate::error::{FluxError, Result};

/// Default number of samples shown on the chart.
pub const DEFAULT_WINDOW: usize = 50;

/// Hall sensor calibration used to turn raw ADC counts into millitesla.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Full-scale ADC reading.
    pub adc_max: f64,
    /// ADC reference voltage.
    pub vref: f64,
    /// Sensor output voltage at zero field.
    pub zero_level: f64,
    /// Sensor sensitivity in volts per gauss.
    pub sensitivity: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            adc_max: 4095.0,
            vref: 5.0,
            zero_level: 2.5,
            sensitivity: 0.0025,
        }
    }
}

/// Peak-detection settings for RPM estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmConfig {
    /// Absolute field strength (mT) that counts as a magnet pass.
    pub peak_threshold: f64,
    /// Number of intervals averaged into the reported RPM.
    pub history: usize,
    /// RPM drops to zero when no peak is seen for this long.
    pub timeout: Duration,
}

impl Default for RpmConfig {
    fn default() -> Self {
        Self {
            peak_threshold: 50.0,
            history: 5,
            timeout: Duration::from_millis(2000),
        }
    }
}

/// Chart settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartConfig {
    /// Number of samples visible at once.
    pub window: usize,
    /// Lower Y bound in mT.
    pub y_min: f64,
    /// Upper Y bound in mT.
    pub y_max: f64,
    /// Fit Y bounds to the visible data instead of the fixed range.
    pub autoscale: bool,
    /// Margin added around autoscaled data (0.15 = 15%).
    pub y_padding_factor: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            y_min: -50.0,
            y_max: 100.0,
            autoscale: false,
            y_padding_factor: 0.15,
        }
    }
}

/// Combined configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    /// Chart settings.
    pub chart: ChartConfig,
    /// RPM estimation settings.
    pub rpm: RpmConfig,
    /// Raw sensor calibration.
    pub calibration: Calibration,
}

impl Config {
    /// Check that the values can drive a session.
    pub fn validate(&self) -> Result<()> {
        if self.chart.window == 0 {
            return Err(FluxError::invalid_config("window must be at least 1"));
        }
        if !(self.chart.y_min < self.chart.y_max) {
            return Err(FluxError::invalid_config(format!(
                "y-min ({}) must be below y-max ({})",
                self.chart.y_min, self.chart.y_max
            )));
        }
        if self.rpm.history == 0 {
            return Err(FluxError::invalid_config("rpm history must be at least 1"));
        }
        if self.calibration.sensitivity <= 0.0 || self.calibration.adc_max <= 0.0 {
            return Err(FluxError::invalid_config(
                "sensor sensitivity and ADC range must be positive",
            ));
        }
        Ok(())
    }
}
