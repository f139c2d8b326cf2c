//! Sinusoidal step-delay profiles
//!
//! A profile is a lookup table of inter-step delays in microseconds. The
//! table is built once when a leg begins, so the per-step path is a single
//! indexed read and an integer comparison.
//!
//! ```text
//!  slow ┤*                      *      slow ┤*
//!       │ *                    *            │  *
//!       │   *                *              │     *
//!       │      *          *                 │         *
//!  fast ┤          *  *                fast ┤              *
//!       └──────────────────────              └──────────────
//!                 Full                              Half
//! ```

use core::f32::consts::FRAC_PI_2;

use heapless::Vec;
use libm::{roundf, sinf};

use crate::config::SpeedBounds;

/// Maximum number of entries in a profile table
pub const MAX_PROFILE_LEN: usize = 1600;

/// Envelope shape of a generated profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileShape {
    /// Slow → fast → slow over the whole table (half sine lobe)
    Full,
    /// Slow → fast, monotonic (quarter sine lobe)
    Half,
}

/// Which half of a stroke a leg covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LegSegment {
    /// Delays shrink from slow toward fast
    Accelerate,
    /// Delays grow from fast back to slow
    Decelerate,
}

/// Precomputed delay table for one leg pair
#[derive(Debug, Clone)]
pub struct MotionProfile {
    delays: Vec<u32, MAX_PROFILE_LEN>,
    bounds: SpeedBounds,
    shape: ProfileShape,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionProfile {
    /// Create an empty profile
    pub const fn new() -> Self {
        Self {
            delays: Vec::new(),
            bounds: SpeedBounds::new(0, 0),
            shape: ProfileShape::Half,
        }
    }

    /// Build a new profile with `len` entries
    pub fn generate(bounds: SpeedBounds, shape: ProfileShape, len: usize) -> Self {
        let mut profile = Self::new();
        profile.regenerate(bounds, shape, len);
        profile
    }

    /// Rebuild the table in place
    ///
    /// `len` is capped at [`MAX_PROFILE_LEN`]. Bounds with `fast_us > slow_us`
    /// are swapped so every value stays inside `[fast_us, slow_us]`.
    pub fn regenerate(&mut self, bounds: SpeedBounds, shape: ProfileShape, len: usize) {
        debug_assert!(bounds.fast_us <= bounds.slow_us);
        let bounds = bounds.ordered();
        let n = len.min(MAX_PROFILE_LEN);

        self.delays.clear();
        self.bounds = bounds;
        self.shape = shape;

        match n {
            0 => {}
            1 => {
                let _ = self.delays.push(bounds.slow_us);
            }
            _ => match shape {
                ProfileShape::Full => self.fill_full(n),
                ProfileShape::Half => self.fill_half(n),
            },
        }
    }

    /// Rising quarter lobe up to `mid`, mirrored after it
    ///
    /// `mid` always lands on π/2, so an odd table peaks on its centre entry
    /// and an even table on its central pair.
    fn fill_full(&mut self, n: usize) {
        let last = n - 1;
        let mid = last / 2;
        for i in 0..n {
            let delay = if i > mid {
                self.delays[last - i]
            } else if mid == 0 {
                // Two entries are both endpoints
                self.bounds.slow_us
            } else {
                self.bounds.sample(FRAC_PI_2 * i as f32 / mid as f32)
            };
            let _ = self.delays.push(delay);
        }
    }

    fn fill_half(&mut self, n: usize) {
        let last = n - 1;
        let mut prev = self.bounds.slow_us;
        for i in 0..n {
            let angle = FRAC_PI_2 * i as f32 / last as f32;
            // Rounding must never make the table climb
            let delay = self.bounds.sample(angle).min(prev);
            prev = delay;
            let _ = self.delays.push(delay);
        }
    }

    /// The raw delay table
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    pub fn shape(&self) -> ProfileShape {
        self.shape
    }

    pub fn bounds(&self) -> SpeedBounds {
        self.bounds
    }

    /// Delay for step `step` of a leg that is `leg_steps` pulses long
    ///
    /// The leg is resampled across its half of the envelope so that the
    /// first step of an accelerate leg is slow and the last step of a
    /// decelerate leg is slow again, regardless of the table length.
    pub fn leg_delay(&self, step: u16, leg_steps: u16, segment: LegSegment) -> u32 {
        let n = self.delays.len();
        if n == 0 {
            return self.bounds.slow_us;
        }
        let last = n - 1;

        let index = match self.shape {
            ProfileShape::Half => match segment {
                LegSegment::Accelerate => scale(step, leg_steps, last),
                LegSegment::Decelerate => last - scale(step, leg_steps, last),
            },
            ProfileShape::Full => {
                let mid = last / 2;
                match segment {
                    LegSegment::Accelerate => scale(step, leg_steps, mid),
                    LegSegment::Decelerate => (last - mid) + scale(step, leg_steps, mid),
                }
            }
        };

        self.delays[index.min(last)]
    }
}

/// Map `step` in `[0, leg_steps)` linearly onto `[0, span]`
fn scale(step: u16, leg_steps: u16, span: usize) -> usize {
    if leg_steps <= 1 {
        return 0;
    }
    let last_step = (leg_steps - 1) as usize;
    let step = (step as usize).min(last_step);
    step * span / last_step
}

impl SpeedBounds {
    /// `slow − (slow − fast)·sin(angle)`, rounded and clamped
    fn sample(&self, angle: f32) -> u32 {
        let span = (self.slow_us - self.fast_us) as f32;
        let value = roundf(self.slow_us as f32 - span * sinf(angle));
        if value <= self.fast_us as f32 {
            self.fast_us
        } else if value >= self.slow_us as f32 {
            self.slow_us
        } else {
            value as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(fast: u32, slow: u32) -> SpeedBounds {
        SpeedBounds::new(fast, slow)
    }

    #[test]
    fn test_half_systole_default() {
        let profile = MotionProfile::generate(bounds(1, 300), ProfileShape::Half, 600);
        let d = profile.delays();
        assert_eq!(d.len(), 600);
        assert_eq!(d[0], 300);
        assert_eq!(d[599], 1);
        assert!(d.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_full_endpoints_and_peak() {
        let profile = MotionProfile::generate(bounds(15, 400), ProfileShape::Full, 601);
        let d = profile.delays();
        assert_eq!(d[0], 400);
        assert_eq!(d[600], 400);
        assert_eq!(d[300], 15);
        assert_eq!(*d.iter().min().unwrap(), 15);
    }

    #[test]
    fn test_degenerate_lengths() {
        let empty = MotionProfile::generate(bounds(1, 300), ProfileShape::Full, 0);
        assert!(empty.is_empty());
        assert_eq!(empty.leg_delay(0, 10, LegSegment::Accelerate), 300);

        let single = MotionProfile::generate(bounds(1, 300), ProfileShape::Half, 1);
        assert_eq!(single.delays(), &[300]);
    }

    #[test]
    fn test_length_capped() {
        let profile = MotionProfile::generate(bounds(1, 300), ProfileShape::Half, MAX_PROFILE_LEN + 50);
        assert_eq!(profile.len(), MAX_PROFILE_LEN);
    }

    #[test]
    fn test_equal_bounds_is_flat() {
        let profile = MotionProfile::generate(bounds(40, 40), ProfileShape::Full, 100);
        assert!(profile.delays().iter().all(|&d| d == 40));
    }

    #[test]
    fn test_regenerate_replaces_contents() {
        let mut profile = MotionProfile::generate(bounds(1, 300), ProfileShape::Half, 600);
        profile.regenerate(bounds(15, 400), ProfileShape::Full, 10);
        assert_eq!(profile.len(), 10);
        assert_eq!(profile.shape(), ProfileShape::Full);
        assert_eq!(profile.delays()[0], 400);
    }

    #[test]
    fn test_half_leg_sampling() {
        let profile = MotionProfile::generate(bounds(1, 300), ProfileShape::Half, 600);
        // Accelerate: slow → fast
        assert_eq!(profile.leg_delay(0, 300, LegSegment::Accelerate), 300);
        assert_eq!(profile.leg_delay(299, 300, LegSegment::Accelerate), 1);
        // Decelerate: fast → slow
        assert_eq!(profile.leg_delay(0, 300, LegSegment::Decelerate), 1);
        assert_eq!(profile.leg_delay(299, 300, LegSegment::Decelerate), 300);
    }

    #[test]
    fn test_full_leg_sampling() {
        let profile = MotionProfile::generate(bounds(15, 400), ProfileShape::Full, 600);
        assert_eq!(profile.leg_delay(0, 300, LegSegment::Accelerate), 400);
        assert_eq!(profile.leg_delay(299, 300, LegSegment::Decelerate), 400);

        assert_eq!(profile.leg_delay(299, 300, LegSegment::Accelerate), 15);
        assert_eq!(profile.leg_delay(0, 300, LegSegment::Decelerate), 15);
    }

    #[test]
    fn test_full_even_short_table_peaks() {
        let profile = MotionProfile::generate(bounds(15, 5_000), ProfileShape::Full, 20);
        let d = profile.delays();
        assert_eq!(d[0], 5_000);
        assert_eq!(d[19], 5_000);
        assert_eq!(d[9], 15);
        assert_eq!(d[10], 15);
        assert_eq!(profile.leg_delay(9, 10, LegSegment::Accelerate), 15);
        assert_eq!(profile.leg_delay(0, 10, LegSegment::Decelerate), 15);

        let pair = MotionProfile::generate(bounds(15, 400), ProfileShape::Full, 2);
        assert_eq!(pair.delays(), &[400, 400]);
    }

    #[test]
    fn test_single_step_leg() {
        let profile = MotionProfile::generate(bounds(1, 300), ProfileShape::Half, 2);
        assert_eq!(profile.leg_delay(0, 1, LegSegment::Accelerate), 300);
        assert_eq!(profile.leg_delay(0, 1, LegSegment::Decelerate), 1);
    }

    proptest! {
        #[test]
        fn prop_values_within_bounds(
            fast in 1u32..2_000,
            extra in 0u32..5_000,
            len in 0usize..MAX_PROFILE_LEN,
            full in any::<bool>(),
        ) {
            let slow = fast + extra;
            let shape = if full { ProfileShape::Full } else { ProfileShape::Half };
            let profile = MotionProfile::generate(bounds(fast, slow), shape, len);
            prop_assert_eq!(profile.len(), len);
            for &d in profile.delays() {
                prop_assert!(d >= fast && d <= slow);
            }
        }

        #[test]
        fn prop_full_symmetric_with_slow_ends(
            fast in 1u32..500,
            extra in 0u32..2_000,
            len in 2usize..MAX_PROFILE_LEN,
        ) {
            let slow = fast + extra;
            let profile = MotionProfile::generate(bounds(fast, slow), ProfileShape::Full, len);
            let d = profile.delays();
            prop_assert_eq!(d[0], slow);
            prop_assert_eq!(d[len - 1], slow);
            for i in 0..len {
                prop_assert_eq!(d[i], d[len - 1 - i]);
            }
        }

        #[test]
        fn prop_full_reaches_fast(
            fast in 1u32..500,
            extra in 0u32..5_000,
            len in 3usize..=MAX_PROFILE_LEN,
        ) {
            let slow = fast + extra;
            let profile = MotionProfile::generate(bounds(fast, slow), ProfileShape::Full, len);
            prop_assert_eq!(*profile.delays().iter().min().unwrap(), fast);
        }

        #[test]
        fn prop_full_stroke_legs_reach_fast(
            fast in 1u32..500,
            extra in 0u32..5_000,
            stroke in 2u16..=(MAX_PROFILE_LEN as u16 / 2),
        ) {
            let slow = fast + extra;
            let len = stroke as usize * 2;
            let profile = MotionProfile::generate(bounds(fast, slow), ProfileShape::Full, len);
            prop_assert_eq!(profile.leg_delay(0, stroke, LegSegment::Accelerate), slow);
            prop_assert_eq!(profile.leg_delay(stroke - 1, stroke, LegSegment::Accelerate), fast);
            prop_assert_eq!(profile.leg_delay(0, stroke, LegSegment::Decelerate), fast);
            prop_assert_eq!(profile.leg_delay(stroke - 1, stroke, LegSegment::Decelerate), slow);
        }

        #[test]
        fn prop_half_non_increasing(
            fast in 1u32..500,
            extra in 0u32..2_000,
            len in 2usize..MAX_PROFILE_LEN,
        ) {
            let slow = fast + extra;
            let profile = MotionProfile::generate(bounds(fast, slow), ProfileShape::Half, len);
            let d = profile.delays();
            prop_assert_eq!(d[0], slow);
            prop_assert_eq!(d[len - 1], fast);
            prop_assert!(d.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
