// Scripted stand-ins for the sensor and the delay, shared by the unit tests.

use embedded_hal::delay::DelayNs;

use crate::{DistanceMode, DistanceThreshold, Error, RangingDriver, TimingBudget};

pub(crate) struct FakeSensor {
    pub calls: Vec<&'static str>,
    pub failing: Vec<&'static str>,
    /// `boot_state` turns true on this poll (1-based); `None` never.
    pub booted_on: Option<u16>,
    /// `check_data_ready` turns true on this poll (1-based); `None` never.
    pub data_ready_on: Option<u16>,
    pub range_status: u8,
    pub distance_mm: u16,
    pub ambient_per_spad: u16,
    pub ambient_rate: u16,
    pub offset_mm: i16,
    pub crosstalk_cps: u16,
    pub distance_mode: DistanceMode,
    pub inter_measurement_ms: u16,
    pub timing_budget: TimingBudget,
    pub threshold: Option<DistanceThreshold>,
    boot_polls: u16,
    data_polls: u16,
}

impl FakeSensor {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            failing: Vec::new(),
            booted_on: Some(1),
            data_ready_on: Some(1),
            range_status: 0,
            distance_mm: 0,
            ambient_per_spad: 0,
            ambient_rate: 0,
            offset_mm: 0,
            crosstalk_cps: 0,
            distance_mode: DistanceMode::Long,
            inter_measurement_ms: 100,
            timing_budget: TimingBudget::Ms100,
            threshold: None,
            boot_polls: 0,
            data_polls: 0,
        }
    }

    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.push(call);
        self
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn forget_calls(&mut self) {
        self.calls.clear();
    }

    fn call(&mut self, name: &'static str) -> Result<(), Error<()>> {
        self.calls.push(name);
        if self.failing.contains(&name) {
            Err(Error::I2cError(()))
        } else {
            Ok(())
        }
    }
}

impl RangingDriver for FakeSensor {
    type BusError = ();

    fn reset(&mut self) -> Result<(), Error<()>> {
        self.call("reset")
    }

    fn boot_state(&mut self) -> Result<bool, Error<()>> {
        self.call("boot_state")?;
        self.boot_polls += 1;
        Ok(self.booted_on.is_some_and(|on| self.boot_polls >= on))
    }

    fn clear_interrupt(&mut self) -> Result<(), Error<()>> {
        self.call("clear_interrupt")
    }

    fn sensor_init(&mut self) -> Result<(), Error<()>> {
        self.call("sensor_init")
    }

    fn get_offset(&mut self) -> Result<i16, Error<()>> {
        self.call("get_offset")?;
        Ok(self.offset_mm)
    }

    fn set_offset(&mut self, offset_mm: i16) -> Result<(), Error<()>> {
        self.call("set_offset")?;
        self.offset_mm = offset_mm;
        Ok(())
    }

    fn get_crosstalk(&mut self) -> Result<u16, Error<()>> {
        self.call("get_crosstalk")?;
        Ok(self.crosstalk_cps)
    }

    fn set_crosstalk(&mut self, crosstalk_cps: u16) -> Result<(), Error<()>> {
        self.call("set_crosstalk")?;
        self.crosstalk_cps = crosstalk_cps;
        Ok(())
    }

    fn get_distance_mode(&mut self) -> Result<DistanceMode, Error<()>> {
        self.call("get_distance_mode")?;
        Ok(self.distance_mode)
    }

    fn set_distance_mode(&mut self, mode: DistanceMode) -> Result<(), Error<()>> {
        self.call("set_distance_mode")?;
        self.distance_mode = mode;
        Ok(())
    }

    fn get_inter_measurement_ms(&mut self) -> Result<u16, Error<()>> {
        self.call("get_inter_measurement_ms")?;
        Ok(self.inter_measurement_ms)
    }

    fn set_inter_measurement_ms(&mut self, period_ms: u16) -> Result<(), Error<()>> {
        self.call("set_inter_measurement_ms")?;
        self.inter_measurement_ms = period_ms;
        Ok(())
    }

    fn get_timing_budget(&mut self) -> Result<TimingBudget, Error<()>> {
        self.call("get_timing_budget")?;
        Ok(self.timing_budget)
    }

    fn set_timing_budget(&mut self, budget: TimingBudget) -> Result<(), Error<()>> {
        self.call("set_timing_budget")?;
        if !budget.is_supported_in(self.distance_mode) {
            return Err(Error::IncompatibleTimingBudget);
        }
        self.timing_budget = budget;
        Ok(())
    }

    fn set_distance_threshold(&mut self, threshold: DistanceThreshold) -> Result<(), Error<()>> {
        self.call("set_distance_threshold")?;
        self.threshold = Some(threshold);
        Ok(())
    }

    fn enable_interrupt(&mut self) -> Result<(), Error<()>> {
        self.call("enable_interrupt")
    }

    fn start_ranging(&mut self) -> Result<(), Error<()>> {
        self.call("start_ranging")
    }

    fn stop_ranging(&mut self) -> Result<(), Error<()>> {
        self.call("stop_ranging")
    }

    fn check_data_ready(&mut self) -> Result<bool, Error<()>> {
        self.call("check_data_ready")?;
        self.data_polls += 1;
        Ok(self.data_ready_on.is_some_and(|on| self.data_polls >= on))
    }

    fn get_range_status(&mut self) -> Result<u8, Error<()>> {
        self.call("get_range_status")?;
        Ok(self.range_status)
    }

    fn get_distance(&mut self) -> Result<u16, Error<()>> {
        self.call("get_distance")?;
        Ok(self.distance_mm)
    }

    fn get_ambient_per_spad(&mut self) -> Result<u16, Error<()>> {
        self.call("get_ambient_per_spad")?;
        Ok(self.ambient_per_spad)
    }

    fn get_ambient_rate(&mut self) -> Result<u16, Error<()>> {
        self.call("get_ambient_rate")?;
        Ok(self.ambient_rate)
    }
}

/// Delay that only counts how often and how long it was asked to wait.
#[derive(Debug, Default)]
pub(crate) struct CountingDelay {
    pub ms_calls: u32,
    pub total_ms: u32,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ms_calls += 1;
        self.total_ms += ms;
    }
}
