//! Circular-buffer delay line with fractional, linearly interpolated reads.
//!
//! The BBD chorus reads each buffer at an LFO-modulated, non-integer delay.
//! Linear interpolation between neighbouring taps keeps the sweep smooth and
//! mimics the soft high end of a bucket-brigade line.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Interpolated delay line using a circular buffer (heap-allocated).
///
/// # Memory
///
/// The buffer is allocated during construction and never reallocates.
/// No allocations occur during audio processing.
///
/// # Example
///
/// ```rust
/// use poorhouse_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(512);
/// delay.write(1.0);
/// delay.write(0.0);
///
/// // Halfway between the newest sample (0.0) and the one before (1.0)
/// assert!((delay.read(0.5) - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    /// Circular buffer storage
    buffer: Vec<f32>,
    /// Next write position
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a new delay line holding `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "Delay capacity must be >= 2");

        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Reads the sample `delay_samples` behind the most recent write.
    ///
    /// A delay of `0.0` returns the newest sample. Fractional delays blend
    /// the two neighbouring taps linearly. Delays beyond the capacity are
    /// clamped to the oldest stored sample.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 2) as f32);

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let newer = (self.write_pos + len - delay_int - 1) % len;
        let older = (newer + len - 1) % len;

        let a = self.buffer[newer];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Clears the delay line and rewinds the write position.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Returns the capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
