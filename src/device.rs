//! VL53L1X register driver over I2C.
//!
//! Register semantics follow ST's Ultra Lite Driver. Calibration routines and
//! ROI programming are not provided.

#[cfg(not(feature = "async"))]
use embedded_hal::{delay::DelayNs, i2c::I2c};
#[cfg(feature = "async")]
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::register::{DEFAULT_CONFIGURATION, DEFAULT_CONFIGURATION_START};
use crate::{DistanceMode, DistanceThreshold, Error, RangingDriver, Register, TimingBudget};

/// Default 7-bit I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x29;

/// Model ID reported by a genuine VL53L1X.
pub const MODEL_ID: u16 = 0xEACC;

// Raw ULD status byte to range status code. 255 marks codes with no mapping.
const STATUS_RTN: [u8; 24] = [
    255, 255, 255, 5, 2, 4, 1, 7, 3, 0, 255, 255, 9, 13, 255, 255, 255, 255, 10, 6, 255, 255, 11,
    12,
];

// (timeout A, timeout B) per budget, Short mode.
const SHORT_MODE_MACROP: [(TimingBudget, u16, u16); 7] = [
    (TimingBudget::Ms15, 0x001D, 0x0027),
    (TimingBudget::Ms20, 0x0051, 0x006E),
    (TimingBudget::Ms33, 0x00D6, 0x006E),
    (TimingBudget::Ms50, 0x01AE, 0x01E8),
    (TimingBudget::Ms100, 0x02E1, 0x0388),
    (TimingBudget::Ms200, 0x03E1, 0x0496),
    (TimingBudget::Ms500, 0x0591, 0x05C1),
];

// (timeout A, timeout B) per budget, Long mode. 15 ms does not exist here.
const LONG_MODE_MACROP: [(TimingBudget, u16, u16); 6] = [
    (TimingBudget::Ms20, 0x001E, 0x0022),
    (TimingBudget::Ms33, 0x0060, 0x006E),
    (TimingBudget::Ms50, 0x00AD, 0x00C6),
    (TimingBudget::Ms100, 0x01CC, 0x01EA),
    (TimingBudget::Ms200, 0x02D9, 0x02F8),
    (TimingBudget::Ms500, 0x048F, 0x04A4),
];

fn macrop_table(mode: DistanceMode) -> &'static [(TimingBudget, u16, u16)] {
    match mode {
        DistanceMode::Short => &SHORT_MODE_MACROP,
        DistanceMode::Long => &LONG_MODE_MACROP,
    }
}

/// VL53L1X time-of-flight sensor on an I2C bus.
///
/// Owns the bus handle and a delay source. The sensor must be reset and
/// booted, then initialized with [`sensor_init`](RangingDriver::sensor_init),
/// before any ranging call.
pub struct Vl53l1x<I2C, D> {
    i2c: I2C,
    address: u8,
    delay: D,
}

impl<I2C, D> Vl53l1x<I2C, D> {
    /// Creates a driver for a sensor at [`DEFAULT_ADDRESS`].
    ///
    /// Nothing is sent on the bus. The sensor still has to be reset, booted
    /// and initialized, which [`RangingController::bring_up`](crate::RangingController::bring_up)
    /// does.
    ///
    /// # Arguments
    ///
    /// * `i2c` - I2C bus the sensor is attached to
    /// * `delay` - Delay source for the VHV wait in `sensor_init` and the
    ///   oscillator calibration
    ///
    /// # Returns
    ///
    /// A driver addressing 0x29
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use vl53l1x_ranging::{Vl53l1x, MODEL_ID};
    ///
    /// let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
    /// let delay = embedded_hal_mock::eh1::delay::NoopDelay;
    ///
    /// let mut sensor = Vl53l1x::new(i2c, delay);
    /// assert_eq!(sensor.get_sensor_id().unwrap(), MODEL_ID);
    /// ```
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
            delay,
        }
    }

    /// Creates a driver for a sensor that was already moved to `address`.
    ///
    /// # Arguments
    ///
    /// * `i2c` - I2C bus the sensor is attached to
    /// * `delay` - Delay source, as for [`new`](Self::new)
    /// * `address` - 7-bit address the sensor answers on
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            address,
            delay,
        }
    }

    /// Current 7-bit I2C address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives back the bus and the delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C, E, D> Vl53l1x<I2C, D>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    D: DelayNs,
{
    /// Writes a new I2C address to the sensor and talks to it there from now on.
    ///
    /// With several sensors on one bus, hold all but one in hardware standby
    /// through XSHUT, move the awake one, and repeat.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn set_i2c_address(&mut self, address: u8) -> Result<(), Error<E>> {
        self.write_byte(Register::I2cSlaveDeviceAddress, address & 0x7F)
            .await?;
        self.address = address & 0x7F;
        Ok(())
    }

    /// Reads the model ID, [`MODEL_ID`] for a VL53L1X.
    ///
    /// # Returns
    ///
    /// * `Ok(u16)` - The 16-bit model and module type, big-endian on the wire
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn get_sensor_id(&mut self) -> Result<u16, Error<E>> {
        self.read_word(Register::IdentificationModelId).await
    }

    /// Interrupt polarity: `true` when GPIO1 drives high on a new sample.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn interrupt_active_high(&mut self) -> Result<bool, Error<E>> {
        let mux = self.read_byte(Register::GpioHvMuxCtrl).await?;
        Ok(mux & 0x10 == 0)
    }

    /// Writes an 8-bit value to a register.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn write_byte<R>(&mut self, register_address: R, value: u8) -> Result<(), Error<E>>
    where
        R: Into<u16>,
    {
        let reg: u16 = register_address.into();
        let mut buffer = [0u8; 3];
        buffer[0..2].copy_from_slice(&reg.to_be_bytes());
        buffer[2] = value;
        self.i2c.write(self.address, &buffer).await?;
        Ok(())
    }

    /// Reads an 8-bit value from a register.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn read_byte<R>(&mut self, register_address: R) -> Result<u8, Error<E>>
    where
        R: Into<u16>,
    {
        let reg: u16 = register_address.into();
        let mut read_buffer = [0u8; 1];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut read_buffer)
            .await?;
        Ok(read_buffer[0])
    }

    /// Writes a big-endian 16-bit value to a register pair.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn write_word<R>(&mut self, register_address: R, value: u16) -> Result<(), Error<E>>
    where
        R: Into<u16>,
    {
        let reg: u16 = register_address.into();
        let mut buffer = [0u8; 4];
        buffer[0..2].copy_from_slice(&reg.to_be_bytes());
        buffer[2..4].copy_from_slice(&value.to_be_bytes());
        self.i2c.write(self.address, &buffer).await?;
        Ok(())
    }

    /// Reads a big-endian 16-bit value from a register pair.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn read_word<R>(&mut self, register_address: R) -> Result<u16, Error<E>>
    where
        R: Into<u16>,
    {
        let reg: u16 = register_address.into();
        let mut read_buffer = [0u8; 2];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut read_buffer)
            .await?;
        Ok(u16::from_be_bytes(read_buffer))
    }

    /// Writes a big-endian 32-bit value to four consecutive registers.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn write_dword<R>(&mut self, register_address: R, value: u32) -> Result<(), Error<E>>
    where
        R: Into<u16>,
    {
        let reg: u16 = register_address.into();
        let mut buffer = [0u8; 6];
        buffer[0..2].copy_from_slice(&reg.to_be_bytes());
        buffer[2..6].copy_from_slice(&value.to_be_bytes());
        self.i2c.write(self.address, &buffer).await?;
        Ok(())
    }

    /// Reads a big-endian 32-bit value from four consecutive registers.
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    pub async fn read_dword<R>(&mut self, register_address: R) -> Result<u32, Error<E>>
    where
        R: Into<u16>,
    {
        let reg: u16 = register_address.into();
        let mut read_buffer = [0u8; 4];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut read_buffer)
            .await?;
        Ok(u32::from_be_bytes(read_buffer))
    }

    async fn clock_pll(&mut self) -> Result<u16, Error<E>> {
        Ok(self.read_word(Register::ResultOscCalibrateVal).await? & 0x3FF)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C, E, D> RangingDriver for Vl53l1x<I2C, D>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    D: DelayNs,
{
    type BusError = E;

    async fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_byte(Register::SoftReset, 0x00).await?;
        self.delay.delay_us(100).await;
        self.write_byte(Register::SoftReset, 0x01).await
    }

    async fn boot_state(&mut self) -> Result<bool, Error<E>> {
        let status = self.read_byte(Register::FirmwareSystemStatus).await?;
        Ok(status & 0x01 != 0)
    }

    async fn clear_interrupt(&mut self) -> Result<(), Error<E>> {
        self.write_byte(Register::SystemInterruptClear, 0x01).await
    }

    async fn sensor_init(&mut self) -> Result<(), Error<E>> {
        info!("Loading default configuration");
        for (i, &value) in DEFAULT_CONFIGURATION.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            self.write_byte(DEFAULT_CONFIGURATION_START + i as u16, value)
                .await?;
        }

        // One ranging cycle runs the VHV temperature calibration.
        info!("Starting VHV");
        self.start_ranging().await?;
        let mut attempts = 0u16;
        loop {
            if self.check_data_ready().await? {
                break Ok(());
            }

            attempts += 1;
            if attempts >= 1000 {
                error!("VHV ranging never completed");
                break Err(Error::BringUpTimeout);
            }

            self.delay.delay_ms(1).await;
        }?;

        self.clear_interrupt().await?;
        self.stop_ranging().await?;
        self.write_byte(Register::VhvConfigTimeoutMacropLoopBound, 0x09)
            .await?;
        self.write_byte(0x000Bu16, 0x00).await?;
        Ok(())
    }

    async fn get_offset(&mut self) -> Result<i16, Error<E>> {
        let raw = self.read_word(Register::PartToPartRangeOffsetMm).await?;
        // 11-bit two's complement in 2.2 fixed point
        let raw = (raw << 3) >> 5;
        #[allow(clippy::cast_possible_wrap)]
        let mut offset = raw as i16;
        if offset > 1024 {
            offset -= 2048;
        }
        Ok(offset)
    }

    async fn set_offset(&mut self, offset_mm: i16) -> Result<(), Error<E>> {
        if !(-1024..=1023).contains(&offset_mm) {
            error!("Invalid offset: {}", offset_mm);
            return Err(Error::InvalidArgument);
        }
        #[allow(clippy::cast_sign_loss)]
        self.write_word(Register::PartToPartRangeOffsetMm, (offset_mm * 4) as u16)
            .await?;
        self.write_word(Register::MmConfigInnerOffsetMm, 0).await?;
        self.write_word(Register::MmConfigOuterOffsetMm, 0).await?;
        Ok(())
    }

    async fn get_crosstalk(&mut self) -> Result<u16, Error<E>> {
        let raw = self.read_word(Register::XtalkPlaneOffsetKcps).await?;
        #[allow(clippy::cast_possible_truncation)]
        Ok(((u32::from(raw) * 1000) >> 9) as u16)
    }

    async fn set_crosstalk(&mut self, crosstalk_cps: u16) -> Result<(), Error<E>> {
        self.write_word(Register::XtalkXPlaneGradientKcps, 0).await?;
        self.write_word(Register::XtalkYPlaneGradientKcps, 0).await?;
        #[allow(clippy::cast_possible_truncation)]
        self.write_word(
            Register::XtalkPlaneOffsetKcps,
            ((u32::from(crosstalk_cps) << 9) / 1000) as u16,
        )
        .await?;
        Ok(())
    }

    async fn get_distance_mode(&mut self) -> Result<DistanceMode, Error<E>> {
        match self.read_byte(Register::PhasecalConfigTimeoutMacrop).await? {
            0x14 => Ok(DistanceMode::Short),
            0x0A => Ok(DistanceMode::Long),
            other => {
                warn!("Unknown distance mode register value: {}", other);
                Err(Error::InvalidRegisterValue(u16::from(other)))
            }
        }
    }

    async fn set_distance_mode(&mut self, mode: DistanceMode) -> Result<(), Error<E>> {
        let budget = self.get_timing_budget().await?;
        let (phasecal, vcsel_a, vcsel_b, valid_phase, woi, initial_phase) = match mode {
            DistanceMode::Short => (0x14, 0x07, 0x05, 0x38, 0x0705, 0x0606),
            DistanceMode::Long => (0x0A, 0x0F, 0x0D, 0xB8, 0x0F0D, 0x0E0E),
        };
        self.write_byte(Register::PhasecalConfigTimeoutMacrop, phasecal)
            .await?;
        self.write_byte(Register::RangeConfigVcselPeriodA, vcsel_a)
            .await?;
        self.write_byte(Register::RangeConfigVcselPeriodB, vcsel_b)
            .await?;
        self.write_byte(Register::RangeConfigValidPhaseHigh, valid_phase)
            .await?;
        self.write_word(Register::SdConfigWoiSd0, woi).await?;
        self.write_word(Register::SdConfigInitialPhaseSd0, initial_phase)
            .await?;
        // The timeout registers are mode specific, rewrite them for the new mode.
        self.set_timing_budget(budget).await
    }

    async fn get_inter_measurement_ms(&mut self) -> Result<u16, Error<E>> {
        let raw = self.read_dword(Register::SystemIntermeasurementPeriod).await?;
        let clock_pll = self.clock_pll().await?;
        #[allow(
            clippy::cast_sign_loss,
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss
        )]
        let period = (raw as f32 / (f32::from(clock_pll) * 1.065f32)) as u16;
        Ok(period)
    }

    async fn set_inter_measurement_ms(&mut self, period_ms: u16) -> Result<(), Error<E>> {
        if period_ms == 0 {
            error!("Invalid inter measurement in ms: {}", period_ms);
            return Err(Error::InvalidArgument);
        }
        let clock_pll = self.clock_pll().await?;
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let raw = (f32::from(clock_pll) * f32::from(period_ms) * 1.075f32) as u32;
        self.write_dword(Register::SystemIntermeasurementPeriod, raw)
            .await
    }

    async fn get_timing_budget(&mut self) -> Result<TimingBudget, Error<E>> {
        let raw = self.read_word(Register::RangeConfigTimeoutMacropAHi).await?;
        SHORT_MODE_MACROP
            .iter()
            .chain(LONG_MODE_MACROP.iter())
            .find(|(_, a, _)| *a == raw)
            .map(|(budget, _, _)| *budget)
            .ok_or_else(|| {
                warn!("Unknown timing budget register value: {}", raw);
                Error::InvalidRegisterValue(raw)
            })
    }

    async fn set_timing_budget(&mut self, budget: TimingBudget) -> Result<(), Error<E>> {
        let mode = self.get_distance_mode().await?;
        let Some(&(_, timeout_a, timeout_b)) =
            macrop_table(mode).iter().find(|(b, _, _)| *b == budget)
        else {
            error!("Timing budget {:?} is not supported in {:?} mode", budget, mode);
            return Err(Error::IncompatibleTimingBudget);
        };
        self.write_word(Register::RangeConfigTimeoutMacropAHi, timeout_a)
            .await?;
        self.write_word(Register::RangeConfigTimeoutMacropBHi, timeout_b)
            .await?;
        Ok(())
    }

    async fn set_distance_threshold(&mut self, threshold: DistanceThreshold) -> Result<(), Error<E>> {
        let config = self.read_byte(Register::SystemInterruptConfigGpio).await? & 0x47;
        self.write_byte(
            Register::SystemInterruptConfigGpio,
            config | (u8::from(threshold.window) & 0x07),
        )
        .await?;
        self.write_word(Register::SystemThreshHigh, threshold.high_mm)
            .await?;
        self.write_word(Register::SystemThreshLow, threshold.low_mm)
            .await?;
        Ok(())
    }

    async fn enable_interrupt(&mut self) -> Result<(), Error<E>> {
        // Bit 4 clear: GPIO1 goes high when a sample is ready.
        let mux = self.read_byte(Register::GpioHvMuxCtrl).await? & 0xEF;
        self.write_byte(Register::GpioHvMuxCtrl, mux).await
    }

    async fn start_ranging(&mut self) -> Result<(), Error<E>> {
        self.write_byte(Register::SystemModeStart, 0x40).await
    }

    async fn stop_ranging(&mut self) -> Result<(), Error<E>> {
        self.write_byte(Register::SystemModeStart, 0x00).await
    }

    async fn check_data_ready(&mut self) -> Result<bool, Error<E>> {
        let active_high = u8::from(self.interrupt_active_high().await?);
        let status = self.read_byte(Register::GpioTioHvStatus).await?;
        Ok(status & 0x01 == active_high)
    }

    async fn get_range_status(&mut self) -> Result<u8, Error<E>> {
        let raw = self.read_byte(Register::ResultRangeStatus).await? & 0x1F;
        Ok(STATUS_RTN.get(usize::from(raw)).copied().unwrap_or(raw))
    }

    async fn get_distance(&mut self) -> Result<u16, Error<E>> {
        self.read_word(Register::ResultFinalCrosstalkCorrectedRangeMmSd0)
            .await
    }

    async fn get_ambient_per_spad(&mut self) -> Result<u16, Error<E>> {
        let rate = self.read_word(Register::ResultAmbientCountRateMcpsSd0).await?;
        let spads = self
            .read_word(Register::ResultDssActualEffectiveSpadsSd0)
            .await?
            >> 8;
        if spads == 0 {
            return Ok(0);
        }
        let per_spad = 2000 * u32::from(rate) / u32::from(spads);
        Ok(u16::try_from(per_spad).unwrap_or(u16::MAX))
    }

    async fn get_ambient_rate(&mut self) -> Result<u16, Error<E>> {
        let rate = self.read_word(Register::ResultAmbientCountRateMcpsSd0).await?;
        Ok(rate.saturating_mul(8))
    }
}

#[cfg(all(test, not(feature = "async")))]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    fn read(reg: u16, data: &[u8]) -> Transaction {
        Transaction::write_read(ADDR, reg.to_be_bytes().to_vec(), data.to_vec())
    }

    fn write(reg: u16, data: &[u8]) -> Transaction {
        let mut bytes = reg.to_be_bytes().to_vec();
        bytes.extend_from_slice(data);
        Transaction::write(ADDR, bytes)
    }

    fn with_sensor(expectations: &[Transaction], test: impl FnOnce(&mut Vl53l1x<Mock, NoopDelay>)) {
        let mut i2c = Mock::new(expectations);
        let mut sensor = Vl53l1x::new(i2c.clone(), NoopDelay);
        test(&mut sensor);
        i2c.done();
    }

    #[test]
    fn reset_toggles_soft_reset() {
        with_sensor(&[write(0x0000, &[0x00]), write(0x0000, &[0x01])], |sensor| {
            sensor.reset().unwrap();
        });
    }

    #[test]
    fn boot_state_reads_bit_zero() {
        with_sensor(&[read(0x00E5, &[0x00]), read(0x00E5, &[0x03])], |sensor| {
            assert!(!sensor.boot_state().unwrap());
            assert!(sensor.boot_state().unwrap());
        });
    }

    #[test]
    fn sensor_init_loads_defaults_and_runs_vhv() {
        let mut expectations: Vec<Transaction> = DEFAULT_CONFIGURATION
            .iter()
            .enumerate()
            .map(|(i, &value)| write(0x2D + i as u16, &[value]))
            .collect();
        expectations.extend([
            write(0x0087, &[0x40]),
            // polarity active high, status not ready yet
            read(0x0030, &[0x01]),
            read(0x0031, &[0x00]),
            read(0x0030, &[0x01]),
            read(0x0031, &[0x01]),
            write(0x0086, &[0x01]),
            write(0x0087, &[0x00]),
            write(0x0008, &[0x09]),
            write(0x000B, &[0x00]),
        ]);
        with_sensor(&expectations, |sensor| {
            sensor.sensor_init().unwrap();
        });
    }

    #[test]
    fn data_ready_honours_polarity() {
        with_sensor(
            &[
                read(0x0030, &[0x01]),
                read(0x0031, &[0x01]),
                read(0x0030, &[0x11]),
                read(0x0031, &[0x01]),
                read(0x0030, &[0x11]),
                read(0x0031, &[0x00]),
            ],
            |sensor| {
                assert!(sensor.check_data_ready().unwrap());
                assert!(!sensor.check_data_ready().unwrap());
                assert!(sensor.check_data_ready().unwrap());
            },
        );
    }

    #[test]
    fn range_status_goes_through_uld_table() {
        with_sensor(
            &[
                read(0x0089, &[0x09]),
                read(0x0089, &[0x06]),
                read(0x0089, &[0x07]),
                read(0x0089, &[0xE4]),
                read(0x0089, &[0x1F]),
            ],
            |sensor| {
                assert_eq!(sensor.get_range_status().unwrap(), 0);
                assert_eq!(sensor.get_range_status().unwrap(), 1);
                assert_eq!(sensor.get_range_status().unwrap(), 7);
                // upper bits are masked off: 0xE4 & 0x1F = 4 -> 2
                assert_eq!(sensor.get_range_status().unwrap(), 2);
                // beyond the table the masked code passes through
                assert_eq!(sensor.get_range_status().unwrap(), 0x1F);
            },
        );
    }

    #[test]
    fn offset_round_trips_through_fixed_point() {
        with_sensor(
            &[
                write(0x001E, &[0x00, 0x64]),
                write(0x0020, &[0x00, 0x00]),
                write(0x0022, &[0x00, 0x00]),
                read(0x001E, &[0x00, 0x64]),
                read(0x001E, &[0xFF, 0xEC]),
            ],
            |sensor| {
                sensor.set_offset(25).unwrap();
                assert_eq!(sensor.get_offset().unwrap(), 25);
                assert_eq!(sensor.get_offset().unwrap(), -5);
            },
        );
    }

    #[test]
    fn crosstalk_zero_clears_gradients() {
        with_sensor(
            &[
                write(0x0018, &[0x00, 0x00]),
                write(0x001A, &[0x00, 0x00]),
                write(0x0016, &[0x00, 0x00]),
            ],
            |sensor| sensor.set_crosstalk(0).unwrap(),
        );
    }

    #[test]
    fn short_budget_rejected_in_long_mode() {
        with_sensor(&[read(0x004B, &[0x0A])], |sensor| {
            assert_eq!(
                sensor.set_timing_budget(TimingBudget::Ms15),
                Err(Error::IncompatibleTimingBudget)
            );
        });
    }

    #[test]
    fn short_budget_accepted_in_short_mode() {
        with_sensor(
            &[
                read(0x004B, &[0x14]),
                write(0x005E, &[0x00, 0x1D]),
                write(0x0061, &[0x00, 0x27]),
            ],
            |sensor| sensor.set_timing_budget(TimingBudget::Ms15).unwrap(),
        );
    }

    #[test]
    fn distance_mode_switch_keeps_budget() {
        with_sensor(
            &[
                read(0x005E, &[0x00, 0xAD]),
                write(0x004B, &[0x14]),
                write(0x0060, &[0x07]),
                write(0x0063, &[0x05]),
                write(0x0069, &[0x38]),
                write(0x0078, &[0x07, 0x05]),
                write(0x007A, &[0x06, 0x06]),
                read(0x004B, &[0x14]),
                write(0x005E, &[0x01, 0xAE]),
                write(0x0061, &[0x01, 0xE8]),
            ],
            |sensor| sensor.set_distance_mode(DistanceMode::Short).unwrap(),
        );
    }

    #[test]
    fn timing_budget_decodes_either_mode() {
        with_sensor(
            &[read(0x005E, &[0x01, 0xCC]), read(0x005E, &[0x12, 0x34])],
            |sensor| {
                assert_eq!(sensor.get_timing_budget().unwrap(), TimingBudget::Ms100);
                assert_eq!(
                    sensor.get_timing_budget(),
                    Err(Error::InvalidRegisterValue(0x1234))
                );
            },
        );
    }

    #[test]
    fn threshold_window_preserves_reserved_bits() {
        with_sensor(
            &[
                read(0x0046, &[0x20]),
                write(0x0046, &[0x03]),
                write(0x0072, &[0x03, 0xE8]),
                write(0x0074, &[0x00, 0x64]),
            ],
            |sensor| {
                sensor
                    .set_distance_threshold(DistanceThreshold {
                        low_mm: 100,
                        high_mm: 1000,
                        window: crate::WindowType::Within,
                    })
                    .unwrap();
            },
        );
    }

    #[test]
    fn ambient_rates_are_scaled() {
        with_sensor(
            &[
                read(0x0090, &[0x00, 0x32]),
                read(0x0090, &[0x00, 0x32]),
                read(0x008C, &[0x10, 0x00]),
                read(0x0090, &[0x00, 0x32]),
                read(0x008C, &[0x00, 0x00]),
            ],
            |sensor| {
                assert_eq!(sensor.get_ambient_rate().unwrap(), 400);
                assert_eq!(sensor.get_ambient_per_spad().unwrap(), 6250);
                assert_eq!(sensor.get_ambient_per_spad().unwrap(), 0);
            },
        );
    }

    #[test]
    fn sensor_id_is_read_from_model_register() {
        with_sensor(&[read(0x010F, &[0xEA, 0xCC])], |sensor| {
            assert_eq!(sensor.get_sensor_id().unwrap(), MODEL_ID);
        });
    }

    #[test]
    fn custom_address_is_used_from_the_start() {
        let mut i2c = Mock::new(&[Transaction::write_read(
            0x30,
            vec![0x00, 0xE5],
            vec![0x01],
        )]);
        let mut sensor = Vl53l1x::with_address(i2c.clone(), NoopDelay, 0x30);
        assert_eq!(sensor.address(), 0x30);
        assert!(sensor.boot_state().unwrap());
        i2c.done();
    }

    #[test]
    fn address_change_is_masked_to_seven_bits() {
        with_sensor(&[Transaction::write(ADDR, vec![0x00, 0x01, 0x30])], |sensor| {
            sensor.set_i2c_address(0xB0).unwrap();
            assert_eq!(sensor.address(), 0x30);
        });
    }
}
