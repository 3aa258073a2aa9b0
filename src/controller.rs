//! Ranging lifecycle controller.
//!
//! [`RangingController`] owns the sensor and walks it through
//! bring-up, configuration and continuous ranging:
//!
//! ```text
//! Uninitialized --bring_up--> Idle --start_ranging--> Ranging
//!                               ^                        |
//!                               +------stop_ranging------+
//! ```
//!
//! All timeout and retry policy lives here. Polls are bounded (see
//! [`PollPolicy`]) and run to completion inside the caller's turn; with the
//! `async` feature each poll interval is an awaited delay and yields to the
//! executor.
//!
//! The controller assumes a single execution context: every method takes
//! `&mut self` and performs complete bus transactions. Sharing it between
//! threads needs a mutex or a single-owner task around the whole controller.

#[cfg(not(feature = "async"))]
use embedded_hal::delay::DelayNs;
#[cfg(feature = "async")]
use embedded_hal_async::delay::DelayNs;

use crate::{
    Calibration, ControllerConfig, Error, FailurePolicy, PollPolicy, RangeSample, RangeStatus,
    RangingConfiguration, RangingDriver, Report, Severity, Step,
};

/// Session state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Sensor not booted yet, or bring-up failed.
    Uninitialized,
    /// Booted and initialized, not ranging.
    Idle,
    /// Continuous ranging in progress.
    Ranging,
}

/// Consumer of samples delivered through [`RangingController::on_data_ready`].
pub type DistanceHandler = fn(RangeSample);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Readiness {
    Booted,
    DataReady,
}

/// Drives one sensor through its ranging lifecycle.
pub struct RangingController<S, D> {
    sensor: S,
    delay: D,
    config: ControllerConfig,
    state: SessionState,
    status_filter: Option<RangeStatus>,
    handler: Option<DistanceHandler>,
    active: Option<RangingConfiguration>,
}

impl<S, D> RangingController<S, D> {
    /// Creates a controller with the default [`ControllerConfig`].
    pub fn new(sensor: S, delay: D) -> Self {
        Self::with_config(sensor, delay, ControllerConfig::default())
    }

    /// Creates a controller with an explicit policy.
    pub fn with_config(sensor: S, delay: D, config: ControllerConfig) -> Self {
        Self {
            sensor,
            delay,
            config,
            state: SessionState::Uninitialized,
            status_filter: None,
            handler: None,
            active: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Policy the controller runs with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Last configuration that was applied without a failed step.
    pub fn configuration(&self) -> Option<&RangingConfiguration> {
        self.active.as_ref()
    }

    /// Direct access to the sensor, for consumers that read it outside the
    /// ranging cycle (the ambient monitor).
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Gives back the sensor and the delay.
    pub fn release(self) -> (S, D) {
        (self.sensor, self.delay)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<S, D, E> RangingController<S, D>
where
    S: RangingDriver<BusError = E>,
    E: core::fmt::Debug,
    D: DelayNs,
{
    /// Registers the consumer of interrupt-delivered samples.
    ///
    /// # Errors
    ///
    /// * `Err(Error::HandlerAlreadyRegistered)` - A handler is already installed
    pub fn set_distance_handler(&mut self, handler: DistanceHandler) -> Result<(), Error<E>> {
        if self.handler.is_some() {
            warn!("Distance handler already registered");
            return Err(Error::HandlerAlreadyRegistered);
        }
        self.handler = Some(handler);
        Ok(())
    }

    /// Brings the sensor from an unknown power state to [`SessionState::Idle`].
    ///
    /// Resets the sensor, polls the boot state, clears any pending interrupt,
    /// initializes the sensor and writes the fixed calibration from
    /// [`ControllerConfig::calibration`].
    ///
    /// A failed step is recorded in the returned [`Report`]; whether the
    /// remaining steps still run depends on [`ControllerConfig::failure_policy`].
    /// The controller becomes `Idle` once the sensor booted and initialized.
    ///
    /// # Returns
    ///
    /// * `Ok(Report)` - The sensor booted; the report holds every step that ran
    ///
    /// # Errors
    ///
    /// * `Err(Error::Busy)` - Ranging is in progress
    /// * `Err(Error::BringUpTimeout)` - The sensor never reported booted; nothing
    ///   after the reset was attempted
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use vl53l1x_ranging::{RangingController, Vl53l1x};
    /// use embedded_hal_mock::eh1::{delay::NoopDelay, i2c::Mock};
    ///
    /// let sensor = Vl53l1x::new(Mock::new(&[]), NoopDelay);
    /// let mut controller = RangingController::new(sensor, NoopDelay);
    ///
    /// let report = controller.bring_up().unwrap();
    /// if !report.is_ok() {
    ///     println!("{} steps failed", report.failure_count());
    /// }
    /// println!("{:?}", controller.state());
    /// ```
    pub async fn bring_up(&mut self) -> Result<Report<E>, Error<E>> {
        if self.state == SessionState::Ranging {
            warn!("Bring-up requested while ranging");
            return Err(Error::Busy);
        }

        info!("Bringing up sensor");
        self.state = SessionState::Uninitialized;
        let mut report = Report::new();
        let abort = self.config.failure_policy == FailurePolicy::Abort;

        let result = self.sensor.reset().await;
        if !report.record(Step::Reset, result) && abort {
            return Ok(report);
        }

        match self.wait_until(Readiness::Booted, self.config.boot_poll).await {
            Ok(attempts) => debug!("Sensor booted after {} polls", attempts),
            Err(attempts) => {
                error!("Sensor not booted after {} polls", attempts);
                return Err(Error::BringUpTimeout);
            }
        }

        let result = self.sensor.clear_interrupt().await;
        if !report.record(Step::ClearInterrupt, result) && abort {
            return Ok(report);
        }

        let result = self.sensor.sensor_init().await;
        if !report.record(Step::SensorInit, result) {
            if abort {
                return Ok(report);
            }
        } else {
            self.state = SessionState::Idle;
        }

        let Calibration {
            offset_mm,
            crosstalk_cps,
        } = self.config.calibration;

        let result = self.sensor.set_offset(offset_mm).await;
        if !report.record(Step::SetOffset, result) && abort {
            return Ok(report);
        }

        let result = self.sensor.set_crosstalk(crosstalk_cps).await;
        report.record(Step::SetCrosstalk, result);

        info!("Bring-up done, {} failed steps", report.failure_count());
        Ok(report)
    }

    /// Reads back the calibration currently held by the sensor.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn read_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let offset_mm = self.sensor.get_offset().await?;
        let crosstalk_cps = self.sensor.get_crosstalk().await?;
        debug!("Offset {} mm, crosstalk {} cps", offset_mm, crosstalk_cps);
        Ok(Calibration {
            offset_mm,
            crosstalk_cps,
        })
    }

    /// Pushes `config` to the sensor.
    ///
    /// The current values are read first for diagnostics, then distance mode,
    /// inter-measurement period, timing budget and threshold window are
    /// written in that order. Nothing is retried.
    ///
    /// # Errors
    ///
    /// * `Err(Error::NotBooted)` - Bring-up has not completed; nothing was written
    /// * `Err(Error::Busy)` - Ranging is in progress, stop it first
    /// * `Err(Error::IncompatibleTimingBudget)` / `Err(Error::InvalidArgument)` -
    ///   `config` failed [`RangingConfiguration::validate`]; nothing was written
    pub async fn apply_configuration(
        &mut self,
        config: &RangingConfiguration,
    ) -> Result<Report<E>, Error<E>> {
        match self.state {
            SessionState::Uninitialized => {
                error!("Cannot configure before bring-up");
                return Err(Error::NotBooted);
            }
            SessionState::Ranging => {
                warn!("Configuration requested while ranging");
                return Err(Error::Busy);
            }
            SessionState::Idle => {}
        }
        config.validate()?;

        info!("Applying ranging configuration");
        let mut report = Report::new();
        let abort = self.config.failure_policy == FailurePolicy::Abort;

        let current = self.sensor.get_distance_mode().await;
        if let Ok(mode) = &current {
            debug!("Current distance mode: {:?}", mode);
        }
        if !report.record(Step::GetDistanceMode, current) && abort {
            return Ok(report);
        }
        let result = self.sensor.set_distance_mode(config.distance_mode).await;
        if !report.record(Step::SetDistanceMode, result) && abort {
            return Ok(report);
        }

        let current = self.sensor.get_inter_measurement_ms().await;
        if let Ok(period) = &current {
            debug!("Current inter measurement: {} ms", period);
        }
        if !report.record(Step::GetInterMeasurement, current) && abort {
            return Ok(report);
        }
        let result = self
            .sensor
            .set_inter_measurement_ms(config.inter_measurement_ms)
            .await;
        if !report.record(Step::SetInterMeasurement, result) && abort {
            return Ok(report);
        }

        let current = self.sensor.get_timing_budget().await;
        if let Ok(budget) = &current {
            debug!("Current timing budget: {:?}", budget);
        }
        if !report.record(Step::GetTimingBudget, current) && abort {
            return Ok(report);
        }
        let result = self.sensor.set_timing_budget(config.timing_budget).await;
        if !report.record(Step::SetTimingBudget, result) && abort {
            return Ok(report);
        }

        let result = self.sensor.set_distance_threshold(config.threshold).await;
        report.record(Step::SetDistanceThreshold, result);

        if report.is_ok() {
            self.active = Some(*config);
        }
        info!("Configuration done, {} failed steps", report.failure_count());
        Ok(report)
    }

    /// Starts continuous ranging.
    ///
    /// Routes data-ready to the interrupt line, installs a status filter that
    /// only lets [`RangeStatus::NoError`] samples through to the handler, and
    /// issues the start command. A failed interrupt routing is reported but
    /// does not prevent the start. Calling this while already ranging does
    /// nothing.
    ///
    /// # Errors
    ///
    /// * `Err(Error::NotBooted)` - Bring-up has not completed
    /// * `Err(Error::StartFailure)` - The start command failed; still `Idle`
    pub async fn start_ranging(&mut self) -> Result<Report<E>, Error<E>> {
        match self.state {
            SessionState::Uninitialized => {
                error!("Cannot start ranging before bring-up");
                return Err(Error::NotBooted);
            }
            SessionState::Ranging => {
                debug!("Already ranging");
                return Ok(Report::new());
            }
            SessionState::Idle => {}
        }

        info!("Starting ranging");
        let mut report = Report::new();
        let result = self.sensor.enable_interrupt().await;
        report.record(Step::EnableInterrupt, result);
        self.status_filter = Some(RangeStatus::NoError);

        let result = self.sensor.start_ranging().await;
        if !report.record(Step::StartRanging, result) {
            self.status_filter = None;
            return Err(Error::StartFailure);
        }

        self.state = SessionState::Ranging;
        Ok(report)
    }

    /// Stops continuous ranging. Does nothing unless ranging.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - The stop command failed; still `Ranging`
    pub async fn stop_ranging(&mut self) -> Result<(), Error<E>> {
        if self.state != SessionState::Ranging {
            debug!("Stop requested while not ranging");
            return Ok(());
        }

        info!("Stopping ranging");
        self.sensor.stop_ranging().await?;
        self.status_filter = None;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Waits for one completed sample and returns it.
    ///
    /// Polls data-ready per [`ControllerConfig::sample_poll`], then reads status
    /// and distance and clears the interrupt. The interrupt is cleared even
    /// when one of the reads failed, otherwise the sensor would not produce
    /// the next sample.
    ///
    /// # Returns
    ///
    /// * `Ok(RangeSample)` - Distance and interpreted status; check
    ///   [`RangeSample::valid_distance_mm`] before trusting the distance
    ///
    /// # Errors
    ///
    /// * `Err(Error::SampleTimeout)` - No sample within the poll budget; skip
    ///   this cycle, the session is unaffected
    /// * `Err(Error::I2cError(E))` - Reading or clearing failed
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use vl53l1x_ranging::{Error, RangingController, Vl53l1x};
    /// use embedded_hal_mock::eh1::{delay::NoopDelay, i2c::Mock};
    ///
    /// let sensor = Vl53l1x::new(Mock::new(&[]), NoopDelay);
    /// let mut controller = RangingController::new(sensor, NoopDelay);
    /// controller.bring_up().unwrap();
    /// controller.start_ranging().unwrap();
    ///
    /// match controller.poll_sample() {
    ///     Ok(sample) => match sample.valid_distance_mm() {
    ///         Some(mm) => println!("{mm} mm"),
    ///         None => println!("rejected: {}", sample.status),
    ///     },
    ///     Err(Error::SampleTimeout) => println!("no sample this cycle"),
    ///     Err(e) => println!("bus error: {e}"),
    /// }
    /// ```
    pub async fn poll_sample(&mut self) -> Result<RangeSample, Error<E>> {
        if let Err(attempts) = self
            .wait_until(Readiness::DataReady, self.config.sample_poll)
            .await
        {
            warn!("No sample after {} polls", attempts);
            return Err(Error::SampleTimeout);
        }

        let sample = self.read_sample().await?;
        log_sample(&sample);
        Ok(sample)
    }

    /// Handles a data-ready interrupt.
    ///
    /// Reads and clears the pending sample, then hands it to the registered
    /// [`DistanceHandler`] when it passes the status filter installed by
    /// [`start_ranging`](Self::start_ranging). Returns the sample if it was
    /// delivered. Outside a ranging session the event is ignored without
    /// touching the bus.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - Reading or clearing failed
    pub async fn on_data_ready(&mut self) -> Result<Option<RangeSample>, Error<E>> {
        if self.state != SessionState::Ranging {
            debug!("Data ready ignored while not ranging");
            return Ok(None);
        }
        let sample = self.read_sample().await?;
        trace!("Interrupt sample: {} mm, {:?}", sample.distance_mm, sample.status);

        if self.status_filter.is_some_and(|accepted| accepted != sample.status) {
            trace!("Sample filtered out");
            return Ok(None);
        }
        match self.handler {
            Some(handler) => {
                handler(sample);
                Ok(Some(sample))
            }
            None => Ok(None),
        }
    }

    async fn read_sample(&mut self) -> Result<RangeSample, Error<E>> {
        let status = self.sensor.get_range_status().await;
        let distance = self.sensor.get_distance().await;
        let cleared = self.sensor.clear_interrupt().await;

        let status = RangeStatus::from(status?);
        let distance_mm = distance?;
        cleared?;
        Ok(RangeSample {
            distance_mm,
            status,
        })
    }

    // Bounded poll. Ok carries the attempt that saw the flag, Err the number
    // of attempts spent. A failed read counts as "not yet".
    async fn wait_until(&mut self, what: Readiness, policy: PollPolicy) -> Result<u16, u16> {
        for attempt in 1..=policy.max_attempts {
            let ready = match what {
                Readiness::Booted => self.sensor.boot_state().await,
                Readiness::DataReady => self.sensor.check_data_ready().await,
            };
            match ready {
                Ok(true) => return Ok(attempt),
                Ok(false) => trace!("{:?} not set, attempt {}", what, attempt),
                Err(_) => trace!("{:?} read failed, attempt {}", what, attempt),
            }
            self.delay.delay_ms(policy.interval_ms).await;
        }
        Err(policy.max_attempts)
    }
}

fn log_sample(sample: &RangeSample) {
    match sample.status.severity() {
        Severity::Ok => debug!("distance: {} mm", sample.distance_mm),
        Severity::Warning => warn!("[ranging warning] {}", sample.status.description()),
        Severity::Error => warn!("[ranging error] {}", sample.status.description()),
    }
}
