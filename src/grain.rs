// src/grain.rs

//! Film-grain noise frame generation.
//!
//! `NoiseFrameGenerator` is the hot path of the overlay: it fills an RGBA
//! buffer with an achromatic speckle pattern, one independent uniform draw
//! per pixel. It knows nothing about scheduling or surfaces; the scheduler
//! calls it once per throttled tick.

use log::trace;
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::error::GrainError;
use crate::frame::PixelBuffer;

/// Lower bound of the noise amplitude. Clamping to this range is a hard
/// invariant of `generate`, applied regardless of caller input.
pub const MIN_INTENSITY: u8 = 5;
/// Upper bound of the noise amplitude.
pub const MAX_INTENSITY: u8 = 50;

/// Generates grain frames, reusing one backing buffer across calls.
///
/// Each pixel draws `noise` uniformly from `[0, intensity)` and writes
/// `255 - noise` into R, G and B with alpha fully opaque, so the pattern's
/// brightness floor is `255 - intensity` and its ceiling is 255. There is
/// no seeding contract: consecutive calls are independent.
pub struct NoiseFrameGenerator {
    rng: ThreadRng,
    buffer: PixelBuffer,
}

impl NoiseFrameGenerator {
    pub fn new() -> Self {
        Self {
            rng: rand::rng(),
            buffer: PixelBuffer::new(0, 0),
        }
    }

    /// Generate one grain frame.
    ///
    /// Zero width or height is valid and yields an empty buffer. The
    /// returned buffer borrows the generator's backing store, which is
    /// reallocated only when the pixel count changes between calls.
    ///
    /// # Errors
    ///
    /// `GrainError::InvalidDimension` if `width` or `height` is negative.
    pub fn generate(
        &mut self,
        width: i32,
        height: i32,
        intensity: i32,
    ) -> Result<&PixelBuffer, GrainError> {
        if width < 0 || height < 0 {
            return Err(GrainError::InvalidDimension { width, height });
        }
        let intensity = intensity.clamp(MIN_INTENSITY as i32, MAX_INTENSITY as i32) as u8;

        self.buffer.reshape(width as u32, height as u32);
        for pixel in self.buffer.as_bytes_mut().chunks_exact_mut(4) {
            let noise: u8 = self.rng.random_range(0..intensity);
            let value = 255 - noise;
            pixel[0] = value;
            pixel[1] = value;
            pixel[2] = value;
            pixel[3] = 255;
        }

        trace!(
            "NoiseFrameGenerator: filled {}x{} at intensity {}",
            width,
            height,
            intensity
        );
        Ok(&self.buffer)
    }
}

impl Default for NoiseFrameGenerator {
    fn default() -> Self {
        Self::new()
    }
}
