//! # VL53L1X Ranging Lifecycle Controller
//!
//! A `no_std` controller that takes an ST VL53L1X time-of-flight sensor from
//! power-up to continuous ranging and turns its raw results into typed samples.
//!
//! The crate is layered:
//!
//! * [`Vl53l1x`] speaks the register protocol over any `embedded-hal` I2C bus
//!   and implements [`RangingDriver`].
//! * [`RangingController`] owns a driver and runs bring-up, configuration,
//!   start/stop, the bounded sample poll and the interrupt path.
//! * [`AmbientMonitor`] reads ambient light and drives an indicator pin.
//! * [`App`] ties both to periodic timers and a data-ready event.
//!
//! Enable the `async` feature to get the same API on `embedded-hal-async`.
//! Logging goes through `log` or `defmt`, whichever feature is enabled.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use vl53l1x_ranging::{RangingConfiguration, RangingController, Vl53l1x};
//!
//! let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! let sensor = Vl53l1x::new(i2c, embedded_hal_mock::eh1::delay::NoopDelay);
//! let mut controller = RangingController::new(sensor, embedded_hal_mock::eh1::delay::NoopDelay);
//!
//! controller.bring_up().unwrap();
//! controller.apply_configuration(&RangingConfiguration::default()).unwrap();
//! controller.start_ranging().unwrap();
//!
//! match controller.poll_sample() {
//!     Ok(sample) => println!("{} mm ({})", sample.distance_mm, sample.status),
//!     Err(e) => println!("no sample: {e}"),
//! }
//! ```
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod fmt; // <-- must be first module!

mod ambient;
mod app;
mod config;
mod controller;
mod device;
mod driver;
mod register;
mod report;
mod status;
#[cfg(all(test, not(feature = "async")))]
mod testing;

pub use ambient::{AmbientMonitor, AmbientReading, AmbientUpdate, DEFAULT_AMBIENT_THRESHOLD};
pub use app::{
    App, AppError, AppRunState, Event, Handled, Periodic, SamplingMode, AMBIENT_PERIOD_MS,
};
pub use config::{
    Calibration, ControllerConfig, DistanceMode, DistanceThreshold, FailurePolicy, PollPolicy,
    RangingConfiguration, TimingBudget, WindowType,
};
pub use controller::{DistanceHandler, RangingController, SessionState};
pub use device::{Vl53l1x, DEFAULT_ADDRESS, MODEL_ID};
pub use driver::RangingDriver;
pub use register::Register;
pub use report::{Report, Step, StepOutcome, MAX_STEPS};
pub use status::{RangeSample, RangeStatus, Severity};

/// Errors reported by the driver and the controller.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: core::fmt::Debug> {
    /// I2C communication error from the underlying hardware
    I2cError(E),
    /// Sensor never reported booted within the boot poll budget
    BringUpTimeout,
    /// No sample became ready within the sample poll budget
    SampleTimeout,
    /// The start-ranging command failed
    StartFailure,
    /// Invalid parameter value provided
    InvalidArgument,
    /// Timing budget not available in the requested distance mode
    IncompatibleTimingBudget,
    /// Sensor returned a value outside the documented encodings
    InvalidRegisterValue(u16),
    /// Operation requires a completed bring-up
    NotBooted,
    /// Operation not allowed while ranging
    Busy,
    /// A distance handler is already installed
    HandlerAlreadyRegistered,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl<E: core::fmt::Debug> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2cError(error)
    }
}
