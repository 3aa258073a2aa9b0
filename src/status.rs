//! Range status interpretation.
//!
//! The driver reports the outcome of a ranging cycle as a raw ULD status byte.
//! [`RangeStatus::from`] is the only place that byte is looked at; everything
//! past it works on the variant.

/// Outcome of a single ranging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeStatus {
    /// Valid measurement.
    NoError,
    /// Repeatability is poor because the signal to noise ratio dropped.
    SigmaFailure,
    /// Return signal too weak for a reliable answer.
    SignalFailure,
    /// Phase out of bounds, the sensor is ranging in an unsupported zone.
    RangingError,
    /// Target beyond the unambiguous range of the current distance mode.
    WrapAround,
    /// Any other raw status code.
    Unknown(u8),
}

/// How much a status should worry the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    /// Distance is usable.
    Ok,
    /// Distance may be usable but is degraded.
    Warning,
    /// Distance must not be used.
    Error,
}

impl From<u8> for RangeStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => RangeStatus::NoError,
            1 => RangeStatus::SigmaFailure,
            2 => RangeStatus::SignalFailure,
            4 => RangeStatus::RangingError,
            7 => RangeStatus::WrapAround,
            other => RangeStatus::Unknown(other),
        }
    }
}

impl RangeStatus {
    /// Whether the accompanying distance can be trusted.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, RangeStatus::NoError)
    }

    /// Severity class used for diagnostics.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            RangeStatus::NoError => Severity::Ok,
            RangeStatus::SigmaFailure | RangeStatus::SignalFailure => Severity::Warning,
            RangeStatus::RangingError | RangeStatus::WrapAround | RangeStatus::Unknown(_) => {
                Severity::Error
            }
        }
    }

    /// Human readable explanation of the status.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            RangeStatus::NoError => "no error",
            RangeStatus::SigmaFailure => {
                "sigma failure: repeatability or noise issue, consider raising the timing budget"
            }
            RangeStatus::SignalFailure => {
                "signal failure: target too far, not reflective enough, or too small"
            }
            RangeStatus::RangingError => {
                "out of bounds: near the maximum range of about 5 m, usually benign for bright targets"
            }
            RangeStatus::WrapAround => {
                "wraparound: target beyond the unambiguous range of the current distance mode"
            }
            RangeStatus::Unknown(_) => "unrecognized status code",
        }
    }
}

impl core::fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.description())
    }
}

/// One completed ranging cycle.
///
/// `distance_mm` is only meaningful when `status` is [`RangeStatus::NoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeSample {
    /// Measured distance in millimeters
    pub distance_mm: u16,
    /// Outcome of the cycle
    pub status: RangeStatus,
}

impl RangeSample {
    /// The distance, if the status says it can be used.
    #[must_use]
    pub const fn valid_distance_mm(&self) -> Option<u16> {
        if self.status.is_valid() {
            Some(self.distance_mm)
        } else {
            None
        }
    }
}
