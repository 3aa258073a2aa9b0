//! Ambient light threshold monitor.
//!
//! Reads the sensor's ambient counters and drives an indicator output: on when
//! the ambient rate is below the threshold, off otherwise. The threshold is
//! hard, evaluated fresh on every check, with no hysteresis.

use embedded_hal::digital::OutputPin;

use crate::RangingDriver;

/// Ambient rate (kcps) below which the indicator turns on.
pub const DEFAULT_AMBIENT_THRESHOLD: u16 = 400;

/// Raw ambient counters from one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmbientReading {
    /// Ambient rate per SPAD in kcps
    pub per_spad_kcps: u16,
    /// Ambient rate in kcps
    pub rate_kcps: u16,
}

/// Result of one [`AmbientMonitor::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmbientUpdate {
    /// Counters the decision was taken on
    pub reading: AmbientReading,
    /// Whether the indicator was driven on
    pub indicator_on: bool,
    /// At least one counter could not be read and kept its previous value
    pub stale: bool,
}

/// Drives an indicator pin from the sensor's ambient rate.
///
/// Sensor read failures are not propagated: the affected counter keeps its
/// last good value (zero before the first successful read) and the update is
/// flagged [`stale`](AmbientUpdate::stale). Only indicator pin errors are
/// returned.
pub struct AmbientMonitor<P> {
    indicator: P,
    threshold: u16,
    last: AmbientReading,
}

impl<P> AmbientMonitor<P> {
    /// Creates a monitor with [`DEFAULT_AMBIENT_THRESHOLD`].
    pub fn new(indicator: P) -> Self {
        Self {
            indicator,
            threshold: DEFAULT_AMBIENT_THRESHOLD,
            last: AmbientReading::default(),
        }
    }

    /// Replaces the threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold_kcps: u16) -> Self {
        self.threshold = threshold_kcps;
        self
    }

    /// Current threshold in kcps.
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Counters used by the last check.
    pub fn last_reading(&self) -> AmbientReading {
        self.last
    }

    /// Whether `reading` turns the indicator on.
    pub fn is_dark(&self, reading: AmbientReading) -> bool {
        reading.rate_kcps < self.threshold
    }

    /// Gives back the indicator pin.
    pub fn release(self) -> P {
        self.indicator
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<P> AmbientMonitor<P>
where
    P: OutputPin,
{
    /// Reads the ambient counters from `sensor` and updates the indicator.
    ///
    /// # Errors
    ///
    /// * `Err(P::Error)` - The indicator pin could not be driven
    pub async fn check<S: RangingDriver>(
        &mut self,
        sensor: &mut S,
    ) -> Result<AmbientUpdate, P::Error> {
        let mut stale = false;

        match sensor.get_ambient_per_spad().await {
            Ok(value) => self.last.per_spad_kcps = value,
            Err(_) => {
                warn!(
                    "Ambient per SPAD read failed, keeping {}",
                    self.last.per_spad_kcps
                );
                stale = true;
            }
        }
        match sensor.get_ambient_rate().await {
            Ok(value) => self.last.rate_kcps = value,
            Err(_) => {
                warn!("Ambient rate read failed, keeping {}", self.last.rate_kcps);
                stale = true;
            }
        }

        let reading = self.last;
        let indicator_on = self.is_dark(reading);
        if indicator_on {
            self.indicator.set_high()?;
        } else {
            self.indicator.set_low()?;
        }
        debug!(
            "Ambient: {} kcps/SPAD, {} kcps, indicator {}",
            reading.per_spad_kcps,
            reading.rate_kcps,
            indicator_on
        );

        Ok(AmbientUpdate {
            reading,
            indicator_on,
            stale,
        })
    }
}
