//! Bitrate planning for size-targeted encodes

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SizeFitError, SizeFitResult};

/// Megabytes to kilobits conversion factor (8 bits * 1024)
pub const BITS_PER_MEGABYTE: f64 = 8.0 * 1024.0;

/// Requested output size in megabytes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeTarget(f64);

impl SizeTarget {
    /// Create a size target, rejecting zero, negative and non-finite values
    pub fn new(megabytes: f64) -> SizeFitResult<Self> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(SizeFitError::InvalidSizeTarget { megabytes });
        }
        Ok(Self(megabytes))
    }

    pub fn megabytes(&self) -> f64 {
        self.0
    }

    pub fn kilobytes(&self) -> f64 {
        self.0 * 1024.0
    }
}

/// Video bitrate budget in kilobits per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bitrate {
    pub kbps: u64,
}

impl Bitrate {
    /// Encoder argument value, e.g. `1365k`
    pub fn as_encoder_value(&self) -> String {
        format!("{}k", self.kbps)
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kbps", self.kbps)
    }
}

/// Derives the bitrate that makes a clip fit a size target
#[derive(Debug, Clone, Copy, Default)]
pub struct BitratePlanner;

impl BitratePlanner {
    pub fn new() -> Self {
        Self
    }

    /// `floor(size_mb * 8192 / duration_seconds)`
    ///
    /// Flooring keeps the encode at or under budget. Both inputs must be
    /// strictly positive.
    pub fn plan_bitrate(&self, size_mb: f64, duration_seconds: f64) -> SizeFitResult<Bitrate> {
        let target = SizeTarget::new(size_mb)?;
        self.plan_for_target(target, duration_seconds)
    }

    /// Same as [`plan_bitrate`](Self::plan_bitrate) for an already validated target
    pub fn plan_for_target(
        &self,
        target: SizeTarget,
        duration_seconds: f64,
    ) -> SizeFitResult<Bitrate> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(SizeFitError::InvalidDuration {
                seconds: duration_seconds,
            });
        }

        let kbps = (target.megabytes() * BITS_PER_MEGABYTE / duration_seconds).floor();
        debug!(
            size_mb = target.megabytes(),
            duration_seconds,
            kbps,
            "Planned bitrate"
        );

        Ok(Bitrate { kbps: kbps as u64 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_megabytes_over_a_minute() {
        let bitrate = BitratePlanner::new().plan_bitrate(10.0, 60.0).unwrap();
        assert_eq!(bitrate.kbps, 1365);
        assert_eq!(bitrate.as_encoder_value(), "1365k");
    }

    #[test]
    fn five_megabytes_over_thirty_seconds() {
        let bitrate = BitratePlanner::new().plan_bitrate(5.0, 30.0).unwrap();
        assert_eq!(bitrate.kbps, 1365);
    }

    #[test]
    fn rounds_down() {
        // 1 * 8192 / 3 = 2730.67
        assert_eq!(BitratePlanner::new().plan_bitrate(1.0, 3.0).unwrap().kbps, 2730);
        // exact division is untouched
        assert_eq!(BitratePlanner::new().plan_bitrate(1.0, 8.0).unwrap().kbps, 1024);
    }

    #[test]
    fn rejects_non_positive_duration() {
        for duration in [0.0, -0.0, -1.0, -3600.0, f64::NAN, f64::NEG_INFINITY] {
            let err = BitratePlanner::new().plan_bitrate(10.0, duration).unwrap_err();
            assert!(
                matches!(err, SizeFitError::InvalidDuration { .. }),
                "duration {duration}"
            );
        }
    }

    #[test]
    fn rejects_non_positive_size() {
        for size in [0.0, -2.5, f64::NAN, f64::INFINITY] {
            let err = BitratePlanner::new().plan_bitrate(size, 60.0).unwrap_err();
            assert!(matches!(err, SizeFitError::InvalidSizeTarget { .. }), "size {size}");
        }
    }

    #[test]
    fn size_is_checked_before_duration() {
        let err = BitratePlanner::new().plan_bitrate(0.0, 0.0).unwrap_err();
        assert!(matches!(err, SizeFitError::InvalidSizeTarget { .. }));
    }

    #[test]
    fn tiny_budgets_floor_to_zero() {
        let bitrate = BitratePlanner::new().plan_bitrate(0.0001, 3600.0).unwrap();
        assert_eq!(bitrate.kbps, 0);
    }
}
