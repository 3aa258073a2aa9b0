//! Application context for a cooperative scheduler.
//!
//! [`App`] owns the controller and the ambient monitor and is the only thing
//! the dispatch loop talks to. The loop asks [`App::due_events`] which periodic
//! work is due, forwards the data-ready interrupt as [`Event::DataReady`], and
//! runs each event to completion with [`App::handle`].
//!
//! Everything runs on one execution context, so the sensor is shared between
//! the sample path and the ambient monitor without locking. A multi-threaded
//! port has to serialize all access to the `App` (single owner task or mutex).

use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::delay::DelayNs;
#[cfg(feature = "async")]
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::{
    AmbientMonitor, AmbientUpdate, DistanceHandler, Error, RangeSample, RangingConfiguration,
    RangingController, RangingDriver, SessionState,
};

/// Period of the ambient check in milliseconds.
pub const AMBIENT_PERIOD_MS: u32 = 500;

/// How samples reach the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplingMode {
    /// The data-ready interrupt delivers samples to the distance handler.
    Interrupt,
    /// A periodic tick polls for each sample.
    Polled,
}

/// Where the application is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppRunState {
    /// Nothing started yet
    Uninitialized,
    /// Sensor bring-up in progress
    BringingUp,
    /// Ranging parameters being applied
    Configuring,
    /// Ranging and serving events
    Running,
    /// Startup failed, the sensor is unusable
    Faulted,
    /// Ranging stopped by [`App::shutdown`]
    Stopped,
}

/// Work delivered by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Ambient check period elapsed
    AmbientTick,
    /// Sample period elapsed (polled mode)
    SampleTick,
    /// Interrupt line signalled a completed sample
    DataReady,
}

/// What handling an event produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    /// Ambient check result
    Ambient(AmbientUpdate),
    /// Polled sample
    Sample(RangeSample),
    /// No sample this cycle (not ranging, or the poll timed out)
    SampleSkipped,
    /// Interrupt sample, `Some` if it reached the distance handler
    Delivered(Option<RangeSample>),
}

/// Application level failure.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError<E: core::fmt::Debug, PE> {
    /// Sensor or controller error
    Sensor(Error<E>),
    /// Indicator pin error
    Indicator(PE),
}

impl<E: core::fmt::Debug, PE: core::fmt::Debug> core::fmt::Display for AppError<E, PE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AppError::Sensor(e) => write!(f, "sensor error: {e}"),
            AppError::Indicator(e) => write!(f, "indicator error: {e:?}"),
        }
    }
}

impl<E: core::fmt::Debug, PE> From<Error<E>> for AppError<E, PE> {
    fn from(error: Error<E>) -> Self {
        AppError::Sensor(error)
    }
}

/// Fixed-period timer on a monotonic millisecond clock.
///
/// Missed periods are not replayed: a late poll fires once and the next
/// deadline is one period after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Periodic {
    period_ms: u32,
    next_due_ms: u64,
}

impl Periodic {
    /// First deadline is one period after `now_ms`. A zero period counts as 1 ms.
    #[must_use]
    pub fn new(period_ms: u32, now_ms: u64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            period_ms,
            next_due_ms: now_ms + u64::from(period_ms),
        }
    }

    /// Timer period in milliseconds.
    #[must_use]
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Returns true, and re-arms, when the deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms += u64::from(self.period_ms);
        if self.next_due_ms <= now_ms {
            self.next_due_ms = now_ms + u64::from(self.period_ms);
        }
        true
    }
}

/// Owns every component the scheduler dispatches to.
pub struct App<S, D, P> {
    controller: RangingController<S, D>,
    ambient: AmbientMonitor<P>,
    config: RangingConfiguration,
    mode: SamplingMode,
    handler: Option<DistanceHandler>,
    run_state: AppRunState,
    ambient_timer: Periodic,
    sample_timer: Periodic,
}

impl<S, D, P> App<S, D, P> {
    /// Creates the context. Timers start at clock zero.
    pub fn new(
        controller: RangingController<S, D>,
        ambient: AmbientMonitor<P>,
        config: RangingConfiguration,
        mode: SamplingMode,
    ) -> Self {
        Self {
            controller,
            ambient,
            config,
            mode,
            handler: None,
            run_state: AppRunState::Uninitialized,
            ambient_timer: Periodic::new(AMBIENT_PERIOD_MS, 0),
            sample_timer: Periodic::new(u32::from(config.inter_measurement_ms), 0),
        }
    }

    /// Distance handler registered during [`startup`](Self::startup) in
    /// interrupt mode.
    #[must_use]
    pub fn with_distance_handler(mut self, handler: DistanceHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Replaces the ambient check period.
    #[must_use]
    pub fn with_ambient_period(mut self, period_ms: u32) -> Self {
        self.ambient_timer = Periodic::new(period_ms, 0);
        self
    }

    /// Current lifecycle state.
    pub fn run_state(&self) -> AppRunState {
        self.run_state
    }

    /// Configured sampling mode.
    pub fn sampling_mode(&self) -> SamplingMode {
        self.mode
    }

    /// The ranging controller.
    pub fn controller(&self) -> &RangingController<S, D> {
        &self.controller
    }

    /// The ambient monitor.
    pub fn ambient(&self) -> &AmbientMonitor<P> {
        &self.ambient
    }

    /// Periodic events due at `now_ms`, ambient first.
    pub fn due_events(&mut self, now_ms: u64) -> Vec<Event, 2> {
        let mut events = Vec::new();
        if self.run_state == AppRunState::Stopped {
            return events;
        }
        // capacity 2 holds both events
        if self.ambient_timer.poll(now_ms) {
            events.push(Event::AmbientTick).ok();
        }
        if self.mode == SamplingMode::Polled
            && self.run_state == AppRunState::Running
            && self.sample_timer.poll(now_ms)
        {
            events.push(Event::SampleTick).ok();
        }
        events
    }

    /// Gives back the controller and the ambient monitor.
    pub fn release(self) -> (RangingController<S, D>, AmbientMonitor<P>) {
        (self.controller, self.ambient)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<S, D, P, E> App<S, D, P>
where
    S: RangingDriver<BusError = E>,
    E: core::fmt::Debug,
    D: DelayNs,
    P: OutputPin,
{
    /// Brings the sensor up, configures it, registers the distance handler
    /// (interrupt mode) and starts ranging.
    ///
    /// Failed individual steps are logged and tolerated; the run state becomes
    /// [`AppRunState::Faulted`] only when the sensor cannot range at all.
    ///
    /// # Errors
    ///
    /// * `Err(AppError::Sensor(Error::BringUpTimeout))` - The sensor never booted
    /// * `Err(AppError::Sensor(Error::NotBooted))` - Initialization failed
    /// * `Err(AppError::Sensor(_))` - Configuration was rejected or ranging did not start
    pub async fn startup(&mut self) -> Result<(), AppError<E, P::Error>> {
        self.run_state = AppRunState::BringingUp;
        let report = match self.controller.bring_up().await {
            Ok(report) => report,
            Err(e) => return Err(self.fault(e)),
        };
        if self.controller.state() != SessionState::Idle {
            error!("Sensor not initialized, {} failed steps", report.failure_count());
            return Err(self.fault(Error::NotBooted));
        }

        self.run_state = AppRunState::Configuring;
        if let Err(e) = self.controller.apply_configuration(&self.config).await {
            return Err(self.fault(e));
        }

        if self.mode == SamplingMode::Interrupt {
            if let Some(handler) = self.handler {
                if let Err(e) = self.controller.set_distance_handler(handler) {
                    return Err(self.fault(e));
                }
            }
        }

        if let Err(e) = self.controller.start_ranging().await {
            return Err(self.fault(e));
        }
        info!("Ranging in {:?} mode", self.mode);
        self.run_state = AppRunState::Running;
        Ok(())
    }

    /// Runs one event to completion.
    ///
    /// # Errors
    ///
    /// * `Err(AppError::Sensor(_))` - Reading a sample failed
    /// * `Err(AppError::Indicator(_))` - The ambient indicator could not be driven
    pub async fn handle(&mut self, event: Event) -> Result<Handled, AppError<E, P::Error>> {
        match event {
            Event::AmbientTick => {
                let update = self
                    .ambient
                    .check(self.controller.sensor_mut())
                    .await
                    .map_err(AppError::Indicator)?;
                Ok(Handled::Ambient(update))
            }
            Event::SampleTick => {
                if self.controller.state() != SessionState::Ranging {
                    return Ok(Handled::SampleSkipped);
                }
                match self.controller.poll_sample().await {
                    Ok(sample) => Ok(Handled::Sample(sample)),
                    Err(Error::SampleTimeout) => Ok(Handled::SampleSkipped),
                    Err(e) => Err(e.into()),
                }
            }
            Event::DataReady => {
                let delivered = self.controller.on_data_ready().await?;
                Ok(Handled::Delivered(delivered))
            }
        }
    }

    /// Stops ranging. Periodic events stop being due.
    ///
    /// # Errors
    ///
    /// * `Err(AppError::Sensor(_))` - The stop command failed
    pub async fn shutdown(&mut self) -> Result<(), AppError<E, P::Error>> {
        self.controller.stop_ranging().await?;
        info!("Ranging stopped");
        self.run_state = AppRunState::Stopped;
        Ok(())
    }

    fn fault(&mut self, error: Error<E>) -> AppError<E, P::Error> {
        error!("Startup failed in {:?}", self.run_state);
        self.run_state = AppRunState::Faulted;
        AppError::Sensor(error)
    }
}
