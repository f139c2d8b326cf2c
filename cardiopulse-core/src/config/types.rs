//! Motion configuration types
//!
//! Timing parameters for the cardiac cycle. Delays are in microseconds and
//! describe the base rhythm at `reference_bpm`; they are rescaled for the
//! active heart rate whenever a profile is generated.

use crate::motion::ProfileShape;
use crate::safety::DEFAULT_HOMING_TOLERANCE_STEPS;

/// Fast and slow inter-step delay of a speed envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedBounds {
    /// Shortest delay (peak speed)
    pub fast_us: u32,
    /// Longest delay (envelope ends)
    pub slow_us: u32,
}

impl SpeedBounds {
    pub const fn new(fast_us: u32, slow_us: u32) -> Self {
        Self { fast_us, slow_us }
    }

    /// Same bounds with `fast_us <= slow_us` guaranteed
    pub fn ordered(self) -> Self {
        if self.fast_us <= self.slow_us {
            self
        } else {
            Self::new(self.slow_us, self.fast_us)
        }
    }

    /// Bounds rescaled by `num / den`, never below 1 µs
    pub fn scaled(self, num: u16, den: u16) -> Self {
        Self::new(scale_delay(self.fast_us, num, den), scale_delay(self.slow_us, num, den))
    }

    pub fn is_valid(&self) -> bool {
        self.fast_us >= 1 && self.fast_us <= self.slow_us
    }
}

/// Rescale a delay by `num / den` with integer math, minimum 1 µs
pub fn scale_delay(delay_us: u32, num: u16, den: u16) -> u32 {
    if den == 0 {
        return delay_us.max(1);
    }
    let scaled = delay_us as u64 * num as u64 / den as u64;
    scaled.clamp(1, u32::MAX as u64) as u32
}

/// Cardiac cycle timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpConfig {
    /// Contraction envelope
    pub systole: SpeedBounds,
    /// Relaxation envelope
    pub diastole: SpeedBounds,
    /// Steps per leg (profile length is twice this)
    pub stroke_steps: u16,
    /// Envelope shape used for every leg
    pub stroke_shape: ProfileShape,
    /// Initial heart rate
    pub heart_rate_bpm: u16,
    /// Heart rate at which the configured delays apply unscaled
    pub reference_bpm: u16,
    /// Step delay while correcting back to home between cycles
    pub return_delay_us: u32,
    /// Step delay while parking after a shutdown request
    pub shutdown_delay_us: u32,
    /// Step delay for operator-requested moves
    pub manual_delay_us: u32,
    /// Maximum residual error considered "at home"
    pub homing_tolerance_steps: u16,
    /// Session runtime limit, `None` for unlimited
    pub max_runtime_s: Option<u32>,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            systole: SpeedBounds::new(1, 300),
            diastole: SpeedBounds::new(15, 400),
            stroke_steps: 300,
            stroke_shape: ProfileShape::Half,
            heart_rate_bpm: 60,
            reference_bpm: 60,
            return_delay_us: 40,
            shutdown_delay_us: 250,
            manual_delay_us: 40,
            homing_tolerance_steps: DEFAULT_HOMING_TOLERANCE_STEPS,
            max_runtime_s: Some(2700),
        }
    }
}

impl PumpConfig {
    /// Rescale a base delay for `heart_rate_bpm`
    ///
    /// Faster heart rates shorten every delay proportionally.
    pub fn delay_at_rate(&self, delay_us: u32, heart_rate_bpm: u16) -> u32 {
        scale_delay(delay_us, self.reference_bpm, heart_rate_bpm)
    }

    /// Rescale a speed envelope for `heart_rate_bpm`
    pub fn bounds_at_rate(&self, bounds: SpeedBounds, heart_rate_bpm: u16) -> SpeedBounds {
        bounds.scaled(self.reference_bpm, heart_rate_bpm)
    }
}

/// Safe operating bounds for operator adjustments
pub mod limits {
    use crate::motion::MAX_PROFILE_LEN;

    pub const MIN_HEART_RATE_BPM: u16 = 30;
    pub const MAX_HEART_RATE_BPM: u16 = 120;
    /// Increment for `+`/`-` and granularity of absolute rate requests
    pub const HEART_RATE_STEP_BPM: u16 = 5;

    pub const MIN_STROKE_STEPS: u16 = 10;
    /// Longest leg whose two-leg profile still fits the table
    pub const MAX_STROKE_STEPS: u16 = (MAX_PROFILE_LEN / 2) as u16;
    /// Stroke change per `v+`/`v-`, in percent
    pub const VOLUME_STEP_PERCENT: u16 = 10;

    /// Clamp and quantize a requested heart rate
    pub fn clamp_heart_rate(bpm: u16) -> u16 {
        let half = HEART_RATE_STEP_BPM / 2;
        let snapped = bpm.saturating_add(half) / HEART_RATE_STEP_BPM * HEART_RATE_STEP_BPM;
        snapped.clamp(MIN_HEART_RATE_BPM, MAX_HEART_RATE_BPM)
    }

    pub fn clamp_stroke(steps: u32) -> u16 {
        steps.clamp(MIN_STROKE_STEPS as u32, MAX_STROKE_STEPS as u32) as u16
    }

    /// Stroke after one `v+`
    pub fn stroke_up(steps: u16) -> u16 {
        let grown = steps as u32 * (100 + VOLUME_STEP_PERCENT as u32) / 100;
        // Always make progress on short strokes
        clamp_stroke(grown.max(steps as u32 + 1))
    }

    /// Stroke after one `v-`
    pub fn stroke_down(steps: u16) -> u16 {
        let shrunk = steps as u32 * (100 - VOLUME_STEP_PERCENT as u32) / 100;
        clamp_stroke(shrunk.min((steps as u32).saturating_sub(1)))
    }

    /// Clamp a manual target to ± `range` steps around home
    pub fn clamp_manual_target(target: i32, home: i32, range: u32) -> i32 {
        let range = range.min(i32::MAX as u32) as i32;
        let lo = home.saturating_sub(range);
        let hi = home.saturating_add(range);
        target.clamp(lo, hi)
    }

}
