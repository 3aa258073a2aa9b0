//! VL53L1X register map and the ULD default configuration block.

/// Register addresses for the VL53L1X sensor.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Soft reset register (0x0000)
    SoftReset = 0x0000,
    /// I2C slave device address register (0x0001)
    I2cSlaveDeviceAddress = 0x0001,
    /// VHV configuration timeout macro loop bound register (0x0008)
    VhvConfigTimeoutMacropLoopBound = 0x0008,
    /// Crosstalk compensation plane offset register (0x0016)
    XtalkPlaneOffsetKcps = 0x0016,
    /// Crosstalk compensation X plane gradient register (0x0018)
    XtalkXPlaneGradientKcps = 0x0018,
    /// Crosstalk compensation Y plane gradient register (0x001A)
    XtalkYPlaneGradientKcps = 0x001A,
    /// Part-to-part range offset register (0x001E)
    PartToPartRangeOffsetMm = 0x001E,
    /// Inner offset register (0x0020)
    MmConfigInnerOffsetMm = 0x0020,
    /// Outer offset register (0x0022)
    MmConfigOuterOffsetMm = 0x0022,
    /// GPIO HV mux control register, holds the interrupt polarity (0x0030)
    GpioHvMuxCtrl = 0x0030,
    /// GPIO TIO HV status register (0x0031)
    GpioTioHvStatus = 0x0031,
    /// System interrupt configuration register (0x0046)
    SystemInterruptConfigGpio = 0x0046,
    /// Phase calibration timeout register (0x004B)
    PhasecalConfigTimeoutMacrop = 0x004B,
    /// Range timeout A, high byte (0x005E)
    RangeConfigTimeoutMacropAHi = 0x005E,
    /// VCSEL period A register (0x0060)
    RangeConfigVcselPeriodA = 0x0060,
    /// Range timeout B, high byte (0x0061)
    RangeConfigTimeoutMacropBHi = 0x0061,
    /// VCSEL period B register (0x0063)
    RangeConfigVcselPeriodB = 0x0063,
    /// Valid phase high register (0x0069)
    RangeConfigValidPhaseHigh = 0x0069,
    /// Inter-measurement period register (0x006C)
    SystemIntermeasurementPeriod = 0x006C,
    /// High distance threshold register (0x0072)
    SystemThreshHigh = 0x0072,
    /// Low distance threshold register (0x0074)
    SystemThreshLow = 0x0074,
    /// SD0 window of interest register (0x0078)
    SdConfigWoiSd0 = 0x0078,
    /// SD0 initial phase register (0x007A)
    SdConfigInitialPhaseSd0 = 0x007A,
    /// System interrupt clear register (0x0086)
    SystemInterruptClear = 0x0086,
    /// System mode start register (0x0087)
    SystemModeStart = 0x0087,
    /// Result range status register (0x0089)
    ResultRangeStatus = 0x0089,
    /// Effective SPAD count register (0x008C)
    ResultDssActualEffectiveSpadsSd0 = 0x008C,
    /// Ambient count rate register (0x0090)
    ResultAmbientCountRateMcpsSd0 = 0x0090,
    /// Crosstalk corrected range register (0x0096)
    ResultFinalCrosstalkCorrectedRangeMmSd0 = 0x0096,
    /// Oscillator calibration value register (0x00DE)
    ResultOscCalibrateVal = 0x00DE,
    /// Firmware system status register (0x00E5)
    FirmwareSystemStatus = 0x00E5,
    /// Identification model ID register (0x010F)
    IdentificationModelId = 0x010F,
}

impl From<Register> for u16 {
    fn from(r: Register) -> Self {
        r as u16
    }
}

/// First address of the default configuration block.
pub(crate) const DEFAULT_CONFIGURATION_START: u16 = 0x2D;

// Loaded verbatim by `sensor_init`, one byte per register from 0x2D to 0x87.
pub(crate) const DEFAULT_CONFIGURATION: [u8; 91] = [
    0x00, /* 0x2d */
    0x00, /* 0x2e */
    0x00, /* 0x2f */
    0x01, /* 0x30 : bit 4 selects interrupt polarity */
    0x02, /* 0x31 */
    0x00, /* 0x32 */
    0x02, /* 0x33 */
    0x08, /* 0x34 */
    0x00, /* 0x35 */
    0x08, /* 0x36 */
    0x10, /* 0x37 */
    0x01, /* 0x38 */
    0x01, /* 0x39 */
    0x00, /* 0x3a */
    0x00, /* 0x3b */
    0x00, /* 0x3c */
    0x00, /* 0x3d */
    0xff, /* 0x3e */
    0x00, /* 0x3f */
    0x0F, /* 0x40 */
    0x00, /* 0x41 */
    0x00, /* 0x42 */
    0x00, /* 0x43 */
    0x00, /* 0x44 */
    0x00, /* 0x45 */
    0x20, /* 0x46 : interrupt on new sample ready */
    0x0b, /* 0x47 */
    0x00, /* 0x48 */
    0x00, /* 0x49 */
    0x02, /* 0x4a */
    0x0a, /* 0x4b */
    0x21, /* 0x4c */
    0x00, /* 0x4d */
    0x00, /* 0x4e */
    0x05, /* 0x4f */
    0x00, /* 0x50 */
    0x00, /* 0x51 */
    0x00, /* 0x52 */
    0x00, /* 0x53 */
    0xc8, /* 0x54 */
    0x00, /* 0x55 */
    0x00, /* 0x56 */
    0x38, /* 0x57 */
    0xff, /* 0x58 */
    0x01, /* 0x59 */
    0x00, /* 0x5a */
    0x08, /* 0x5b */
    0x00, /* 0x5c */
    0x00, /* 0x5d */
    0x01, /* 0x5e */
    0xcc, /* 0x5f */
    0x0f, /* 0x60 */
    0x01, /* 0x61 */
    0xf1, /* 0x62 */
    0x0d, /* 0x63 */
    0x01, /* 0x64 : sigma threshold MSB */
    0x68, /* 0x65 : sigma threshold LSB */
    0x00, /* 0x66 : min count rate MSB */
    0x80, /* 0x67 : min count rate LSB */
    0x08, /* 0x68 */
    0xb8, /* 0x69 */
    0x00, /* 0x6a */
    0x00, /* 0x6b */
    0x00, /* 0x6c : inter-measurement period MSB */
    0x00, /* 0x6d */
    0x0f, /* 0x6e */
    0x89, /* 0x6f : inter-measurement period LSB */
    0x00, /* 0x70 */
    0x00, /* 0x71 */
    0x00, /* 0x72 : high threshold MSB */
    0x00, /* 0x73 */
    0x00, /* 0x74 : low threshold MSB */
    0x00, /* 0x75 */
    0x00, /* 0x76 */
    0x01, /* 0x77 */
    0x0f, /* 0x78 */
    0x0d, /* 0x79 */
    0x0e, /* 0x7a */
    0x0e, /* 0x7b */
    0x00, /* 0x7c */
    0x00, /* 0x7d */
    0x02, /* 0x7e */
    0xc7, /* 0x7f : ROI center */
    0xff, /* 0x80 : ROI size */
    0x9B, /* 0x81 */
    0x00, /* 0x82 */
    0x00, /* 0x83 */
    0x00, /* 0x84 */
    0x01, /* 0x85 */
    0x00, /* 0x86 : interrupt clear */
    0x00, /* 0x87 : 0x40 here would start ranging straight after init */
];
