//! Hall sensor conversion and RPM estimation from field peaks.

use std::time::Instant;

use crate::config::{Calibration, RpmConfig};

impl Calibration {
    /// Convert raw ADC counts to millitesla.
    pub fn to_millitesla(&self, raw: f64) -> f64 {
        let voltage = raw / self.adc_max * self.vref;
        let gauss = (voltage - self.zero_level) / self.sensitivity;
        gauss * 0.1
    }
}

/// Estimates rotor speed from the magnet passing the sensor.
///
/// A peak is a rising crossing of `|field| > threshold`. The interval
/// between consecutive peaks is one revolution; the reported RPM is the
/// mean over the last `history` intervals.
#[derive(Debug, Clone)]
pub struct RpmTracker {
    config: RpmConfig,
    above_threshold: bool,
    last_peak: Option<Instant>,
    intervals: Vec<f64>,
    next_slot: usize,
    current: f64,
    peak: f64,
}

impl RpmTracker {
    /// Create an idle tracker.
    pub fn new(config: RpmConfig) -> Self {
        Self {
            config,
            above_threshold: false,
            last_peak: None,
            intervals: Vec::with_capacity(config.history.max(1)),
            next_slot: 0,
            current: 0.0,
            peak: 0.0,
        }
    }

    /// Current averaged RPM.
    pub fn rpm(&self) -> f64 {
        self.current
    }

    /// Highest averaged RPM seen since the last reset.
    pub fn peak_rpm(&self) -> f64 {
        self.peak
    }

    /// Feed one field reading taken at `now`.
    pub fn observe(&mut self, millitesla: f64, now: Instant) {
        let magnitude = millitesla.abs();

        if !self.above_threshold && magnitude > self.config.peak_threshold {
            self.above_threshold = true;
            if let Some(last) = self.last_peak {
                let interval_ms = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
                if interval_ms > 0.0 {
                    self.record(60_000.0 / interval_ms);
                }
            }
            self.last_peak = Some(now);
        } else if self.above_threshold && magnitude <= self.config.peak_threshold {
            self.above_threshold = false;
        }
    }

    fn record(&mut self, instant_rpm: f64) {
        let capacity = self.config.history.max(1);
        if self.intervals.len() < capacity {
            self.intervals.push(instant_rpm);
        } else {
            self.intervals[self.next_slot] = instant_rpm;
        }
        self.next_slot = (self.next_slot + 1) % capacity;

        self.current = self.intervals.iter().sum::<f64>() / self.intervals.len() as f64;
        if self.current > self.peak {
            self.peak = self.current;
        }
        tracing::debug!(rpm = self.current, peak = self.peak, "Peak detected");
    }

    /// Zero the RPM when the rotor has not passed the sensor for a while.
    /// Returns true when this call zeroed it.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_peak else {
            return false;
        };
        if self.intervals.is_empty() && self.current == 0.0 {
            return false;
        }
        if now.saturating_duration_since(last) > self.config.timeout {
            self.current = 0.0;
            self.intervals.clear();
            self.next_slot = 0;
            tracing::debug!("No peak within timeout, RPM reset");
            return true;
        }
        false
    }

    /// Forget everything, including the peak RPM.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pass(tracker: &mut RpmTracker, at: Instant) {
        tracker.observe(80.0, at);
        tracker.observe(0.0, at + Duration::from_millis(1));
    }

    #[test]
    fn converts_raw_counts() {
        let calibration = Calibration::default();
        // Mid-scale reads as zero field.
        assert!((calibration.to_millitesla(2047.5)).abs() < 1e-9);
        // Full scale: (5.0 - 2.5) / 0.0025 G = 1000 G = 100 mT.
        assert!((calibration.to_millitesla(4095.0) - 100.0).abs() < 1e-9);
        assert!((calibration.to_millitesla(0.0) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn single_peak_gives_no_rpm() {
        let mut tracker = RpmTracker::new(RpmConfig::default());
        pass(&mut tracker, Instant::now());
        assert_eq!(tracker.rpm(), 0.0);
    }

    #[test]
    fn averages_intervals_between_peaks() {
        let mut tracker = RpmTracker::new(RpmConfig::default());
        let start = Instant::now();
        pass(&mut tracker, start);
        pass(&mut tracker, start + Duration::from_millis(100)); // 600 rpm
        assert!((tracker.rpm() - 600.0).abs() < 1e-6);
        pass(&mut tracker, start + Duration::from_millis(150)); // 1200 rpm
        assert!((tracker.rpm() - 900.0).abs() < 1e-6);
        assert!((tracker.peak_rpm() - 900.0).abs() < 1e-6);
    }

    #[test]
    fn staying_above_threshold_counts_once() {
        let mut tracker = RpmTracker::new(RpmConfig::default());
        let start = Instant::now();
        tracker.observe(-90.0, start);
        tracker.observe(-95.0, start + Duration::from_millis(50));
        tracker.observe(-85.0, start + Duration::from_millis(100));
        assert_eq!(tracker.rpm(), 0.0);
    }

    #[test]
    fn history_keeps_only_latest_intervals() {
        let config = RpmConfig {
            history: 2,
            ..RpmConfig::default()
        };
        let mut tracker = RpmTracker::new(config);
        let start = Instant::now();
        pass(&mut tracker, start);
        pass(&mut tracker, start + Duration::from_millis(1000)); // 60
        pass(&mut tracker, start + Duration::from_millis(1100)); // 600
        pass(&mut tracker, start + Duration::from_millis(1200)); // 600
        assert!((tracker.rpm() - 600.0).abs() < 1e-6);
    }

    #[test]
    fn timeout_zeroes_rpm_but_keeps_peak() {
        let mut tracker = RpmTracker::new(RpmConfig::default());
        let start = Instant::now();
        pass(&mut tracker, start);
        pass(&mut tracker, start + Duration::from_millis(200));
        assert!(tracker.rpm() > 0.0);

        assert!(!tracker.tick(start + Duration::from_millis(1000)));
        assert!(tracker.tick(start + Duration::from_millis(2500)));
        assert_eq!(tracker.rpm(), 0.0);
        assert!((tracker.peak_rpm() - 300.0).abs() < 1e-6);
        assert!(!tracker.tick(start + Duration::from_millis(3000)));

        tracker.reset();
        assert_eq!(tracker.peak_rpm(), 0.0);
    }
}
