// src/error.rs

//! Typed errors for the grain core.
//!
//! The taxonomy is deliberately small: dimension validation on the
//! generator, and surface acquisition on the scheduler. Steady-state tick
//! failures never surface here; the scheduler swallows them (see
//! `scheduler::GrainAnimator::tick`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrainError {
    /// Negative width or height passed to the generator. Zero is valid
    /// (empty buffer); negative is a caller bug and is never clamped away.
    #[error("Invalid dimensions {width}x{height}: width and height must be non-negative")]
    InvalidDimension { width: i32, height: i32 },

    /// The host surface or its drawing context could not be acquired when
    /// starting an animation loop.
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),
}
