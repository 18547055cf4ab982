// src/surface/mod.rs

//! Defines the `Surface` trait for host-surface implementations (console,
//! mock) and the shared dimension/event types.
//!
//! The overlay core never draws to a platform API directly; it drives a
//! `Surface`, which owns the backing pixel store and the platform plumbing.

use anyhow::Result;

use crate::color::Color;
use crate::frame::PixelBuffer;

pub mod console;
#[cfg(test)]
pub mod mock;

/// Most recent known viewport size, in pixels.
///
/// Zero values are valid and mean "render nothing"; they are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceDimensions {
    pub width: u32,
    pub height: u32,
}

impl SurfaceDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when there is no drawable area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Events originating from the host surface.
///
/// These are processed by the host loop, which restarts the animator on
/// `Resized` and tears everything down on `CloseRequested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The viewport was resized by the host. Dimensions are in pixels.
    Resized { width: u32, height: u32 },
    /// The host asked for the overlay to be torn down (window closed,
    /// stdin EOF, quit key).
    CloseRequested,
}

/// Defines the interface for a drawable host surface.
///
/// A `Surface` is responsible for:
/// 1. Tracking the current viewport size and reporting changes as
///    `SurfaceEvent::Resized`.
/// 2. Implementing the drawing primitives the scheduler needs: an opaque
///    whole-surface fill, an alpha-blended composite of a pixel buffer at
///    the origin, and frame presentation.
/// 3. Treating the global compositing alpha as scoped state: the scheduler
///    sets it before a composite and restores it to 1.0 afterwards, and the
///    surface must apply whatever value is current at composite time.
/// 4. Releasing platform resources in `cleanup` (idempotent).
pub trait Surface {
    /// Current viewport size in pixels.
    fn dimensions(&self) -> SurfaceDimensions;

    /// Acquire or re-validate the drawing context.
    ///
    /// Called once when an animation loop starts. Failing here is loud:
    /// the scheduler maps the error to `GrainError::SurfaceUnavailable`
    /// and refuses to start. Mid-loop failures go through the drawing
    /// methods instead and are swallowed by the scheduler.
    fn acquire(&mut self) -> Result<()>;

    /// Processes any pending host events (resize, close).
    fn poll_events(&mut self) -> Result<Vec<SurfaceEvent>>;

    /// Fill the entire surface with an opaque color, replacing prior
    /// content. Ignores the global alpha.
    fn fill_all(&mut self, color: Color) -> Result<()>;

    /// Set the global compositing alpha for subsequent composites.
    /// Values are clamped to [0.0, 1.0].
    fn set_global_alpha(&mut self, alpha: f32);

    /// Blend `frame` onto the surface at the origin using the current
    /// global alpha. A frame larger than the surface is clipped.
    fn composite(&mut self, frame: &PixelBuffer) -> Result<()>;

    /// Present the composed content to the display.
    fn present(&mut self) -> Result<()>;

    /// Release platform resources. Idempotent.
    fn cleanup(&mut self) -> Result<()>;
}
