//! Ranging parameters and controller policy.
//!
//! [`RangingConfiguration`] is the value pushed to the sensor by
//! [`RangingController::apply_configuration`](crate::RangingController::apply_configuration).
//! [`ControllerConfig`] holds everything the controller itself decides: poll
//! budgets, the calibration defaults written during bring-up, and what to do
//! when a single register operation fails.

use crate::Error;

/// Distance measuring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceMode {
    /// Up to about 1.3 m, better ambient immunity.
    Short,
    /// Up to about 4 m in the dark.
    Long,
}

/// Supported ranging timing budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingBudget {
    /// 15 ms, only valid in [`DistanceMode::Short`].
    Ms15,
    /// 20 ms
    Ms20,
    /// 33 ms
    Ms33,
    /// 50 ms
    Ms50,
    /// 100 ms, the sensor's power-on default.
    Ms100,
    /// 200 ms
    Ms200,
    /// 500 ms
    Ms500,
}

impl TimingBudget {
    /// Budget duration in milliseconds.
    #[must_use]
    pub const fn as_ms(self) -> u16 {
        match self {
            TimingBudget::Ms15 => 15,
            TimingBudget::Ms20 => 20,
            TimingBudget::Ms33 => 33,
            TimingBudget::Ms50 => 50,
            TimingBudget::Ms100 => 100,
            TimingBudget::Ms200 => 200,
            TimingBudget::Ms500 => 500,
        }
    }

    /// Whether the sensor accepts this budget in `mode`.
    #[must_use]
    pub const fn is_supported_in(self, mode: DistanceMode) -> bool {
        !matches!((self, mode), (TimingBudget::Ms15, DistanceMode::Long))
    }
}

/// When the distance threshold interrupt fires, relative to the window.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowType {
    /// Distance below the low threshold.
    Below = 0,
    /// Distance above the high threshold.
    Above = 1,
    /// Distance outside the window.
    Outside = 2,
    /// Distance within the window.
    Within = 3,
}

impl From<WindowType> for u8 {
    fn from(window: WindowType) -> Self {
        window as u8
    }
}

/// Distance threshold window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DistanceThreshold {
    /// Low threshold in millimeters
    pub low_mm: u16,
    /// High threshold in millimeters
    pub high_mm: u16,
    /// Trigger condition
    pub window: WindowType,
}

/// Parameters pushed to the sensor before ranging starts.
///
/// Reconfiguring requires ranging to be stopped first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangingConfiguration {
    /// Distance mode, written first.
    pub distance_mode: DistanceMode,
    /// Period between two ranging cycles in milliseconds.
    pub inter_measurement_ms: u16,
    /// Time spent on a single ranging cycle.
    pub timing_budget: TimingBudget,
    /// Window gating interrupts and data ready.
    pub threshold: DistanceThreshold,
}

impl Default for RangingConfiguration {
    fn default() -> Self {
        Self {
            distance_mode: DistanceMode::Long,
            inter_measurement_ms: 50,
            timing_budget: TimingBudget::Ms50,
            threshold: DistanceThreshold {
                low_mm: 100,
                high_mm: 1000,
                window: WindowType::Within,
            },
        }
    }
}

impl RangingConfiguration {
    /// Checks the configuration before anything is written to the sensor.
    ///
    /// # Errors
    ///
    /// * `Err(Error::IncompatibleTimingBudget)` - The 15 ms budget was combined with Long mode
    /// * `Err(Error::InvalidArgument)` - The period is zero or shorter than the timing budget,
    ///   or the threshold window is inverted
    pub fn validate<E: core::fmt::Debug>(&self) -> Result<(), Error<E>> {
        if !self.timing_budget.is_supported_in(self.distance_mode) {
            error!(
                "Timing budget {:?} is not supported in {:?} mode",
                self.timing_budget,
                self.distance_mode
            );
            return Err(Error::IncompatibleTimingBudget);
        }
        if self.inter_measurement_ms == 0
            || self.inter_measurement_ms < self.timing_budget.as_ms()
        {
            error!(
                "Invalid inter measurement in ms: {}",
                self.inter_measurement_ms
            );
            return Err(Error::InvalidArgument);
        }
        if self.threshold.low_mm > self.threshold.high_mm {
            error!(
                "Inverted threshold window: {} > {}",
                self.threshold.low_mm,
                self.threshold.high_mm
            );
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

/// Fixed corrections written during bring-up instead of running calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Offset correction in millimeters
    pub offset_mm: i16,
    /// Crosstalk correction in counts per second
    pub crosstalk_cps: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset_mm: 25,
            crosstalk_cps: 0,
        }
    }
}

/// Bounded poll: check, then sleep `interval_ms`, at most `max_attempts` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollPolicy {
    /// Delay between two checks
    pub interval_ms: u32,
    /// Number of checks before giving up
    pub max_attempts: u16,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1,
            max_attempts: 200,
        }
    }
}

/// What a sequence does when one of its register operations fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailurePolicy {
    /// Record the failure and run the remaining steps.
    #[default]
    Continue,
    /// Record the failure and skip the remaining steps.
    Abort,
}

/// Controller-side policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Boot-state poll after reset
    pub boot_poll: PollPolicy,
    /// Data-ready poll of the synchronous sample path
    pub sample_poll: PollPolicy,
    /// Corrections applied during bring-up
    pub calibration: Calibration,
    /// Reaction to failed steps during bring-up and configuration
    pub failure_policy: FailurePolicy,
}
