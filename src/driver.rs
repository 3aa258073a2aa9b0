//! The register-level operations the controller drives.
//!
//! [`Vl53l1x`](crate::Vl53l1x) is the production implementation. Anything else
//! implementing [`RangingDriver`] (a different bus, a simulator, a test fake)
//! can be handed to [`RangingController`](crate::RangingController) instead.

use crate::{DistanceMode, DistanceThreshold, Error, TimingBudget};

/// Typed register operations of a VL53L1X-class ranging sensor.
///
/// Every call is a complete bus transaction; none of them keep the bus
/// suspended between calls.
#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
#[allow(async_fn_in_trait)]
pub trait RangingDriver {
    /// Error reported by the underlying bus.
    type BusError: core::fmt::Debug;

    /// Resets the sensor. It has to boot again before anything else works.
    async fn reset(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Whether the firmware finished booting.
    async fn boot_state(&mut self) -> Result<bool, Error<Self::BusError>>;

    /// Clears the pending ranging interrupt so the next sample can be produced.
    async fn clear_interrupt(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Loads the default configuration and runs the first temperature calibration.
    async fn sensor_init(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Offset correction in millimeters.
    async fn get_offset(&mut self) -> Result<i16, Error<Self::BusError>>;

    /// Sets the offset correction in millimeters.
    async fn set_offset(&mut self, offset_mm: i16) -> Result<(), Error<Self::BusError>>;

    /// Crosstalk correction in counts per second.
    async fn get_crosstalk(&mut self) -> Result<u16, Error<Self::BusError>>;

    /// Sets the crosstalk correction in counts per second.
    async fn set_crosstalk(&mut self, crosstalk_cps: u16) -> Result<(), Error<Self::BusError>>;

    /// Current distance mode.
    async fn get_distance_mode(&mut self) -> Result<DistanceMode, Error<Self::BusError>>;

    /// Sets the distance mode, keeping the current timing budget.
    async fn set_distance_mode(&mut self, mode: DistanceMode) -> Result<(), Error<Self::BusError>>;

    /// Current inter-measurement period in milliseconds.
    async fn get_inter_measurement_ms(&mut self) -> Result<u16, Error<Self::BusError>>;

    /// Sets the inter-measurement period in milliseconds.
    async fn set_inter_measurement_ms(&mut self, period_ms: u16)
        -> Result<(), Error<Self::BusError>>;

    /// Current timing budget.
    async fn get_timing_budget(&mut self) -> Result<TimingBudget, Error<Self::BusError>>;

    /// Sets the timing budget for the current distance mode.
    async fn set_timing_budget(&mut self, budget: TimingBudget)
        -> Result<(), Error<Self::BusError>>;

    /// Programs the distance threshold window.
    async fn set_distance_threshold(
        &mut self,
        threshold: DistanceThreshold,
    ) -> Result<(), Error<Self::BusError>>;

    /// Routes ranging completion to the interrupt line.
    async fn enable_interrupt(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Starts continuous ranging.
    async fn start_ranging(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Stops ranging.
    async fn stop_ranging(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Whether a completed sample is waiting to be read.
    async fn check_data_ready(&mut self) -> Result<bool, Error<Self::BusError>>;

    /// Raw status code of the last sample.
    async fn get_range_status(&mut self) -> Result<u8, Error<Self::BusError>>;

    /// Distance of the last sample in millimeters.
    async fn get_distance(&mut self) -> Result<u16, Error<Self::BusError>>;

    /// Ambient rate per SPAD in kcps.
    async fn get_ambient_per_spad(&mut self) -> Result<u16, Error<Self::BusError>>;

    /// Ambient rate in kcps.
    async fn get_ambient_rate(&mut self) -> Result<u16, Error<Self::BusError>>;
}
