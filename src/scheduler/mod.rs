// src/scheduler/mod.rs

//! The animation scheduler.
//!
//! `GrainAnimator` turns host refresh ticks into throttled grain redraws.
//! It is a two-state machine:
//!
//! - **Idle**: no loop is running; ticks are ignored.
//! - **Running**: an owned `RunState` record holds the issued handle, the
//!   frame counter, the captured config, and the precomputed update
//!   frequency. `stop()` or a restart (`resize`/`reconfigure`) returns to
//!   Idle or re-enters Running under a fresh handle and a fresh counter.
//!
//! Throttling is a drawing decision, not a scheduling one: every tick
//! increments the frame counter by exactly one, but only ticks landing on a
//! multiple of `update_frequency = max(1, floor(16 / speed))` repaint the
//! surface. On all other ticks the previously presented frame stays up.
//!
//! Handles are generation-stamped. A tick presented under a stale handle
//! does nothing, which is what guarantees that no drawing happens after
//! `stop()` even if a refresh signal was already in flight.

#[cfg(test)]
mod tests;

use log::{debug, trace};

use crate::config::GrainConfig;
use crate::error::GrainError;
use crate::grain::NoiseFrameGenerator;
use crate::surface::{Surface, SurfaceDimensions};

/// Opaque token identifying one running animation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHandle(u64);

/// Ticks between redraws at `speed == 1`.
const BASE_TICKS_PER_UPDATE: f64 = 16.0;

/// Outcome of a single tick. Mostly of interest to tests and to hosts that
/// want to know whether a present occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick was counted but drew nothing; the previous frame stays up.
    /// Also reported when the surface went away mid-draw (an expected
    /// teardown race) or the viewport is zero-sized.
    Skipped,
    /// A fresh frame was drawn and presented.
    Drawn,
    /// The handle was stale or the animator is Idle; nothing was counted.
    Ignored,
}

/// Per-loop state. Owned by the animator while Running; discarded wholesale
/// on stop, so no counter or config survives into the next loop.
struct RunState {
    handle: AnimationHandle,
    frame_count: u64,
    dimensions: SurfaceDimensions,
    config: GrainConfig,
    update_frequency: u64,
}

pub struct GrainAnimator {
    generator: NoiseFrameGenerator,
    run: Option<RunState>,
    next_generation: u64,
}

impl GrainAnimator {
    pub fn new() -> Self {
        Self {
            generator: NoiseFrameGenerator::new(),
            run: None,
            next_generation: 0,
        }
    }

    /// Ticks between redraws for a given speed: `max(1, floor(16 / speed))`.
    ///
    /// Speed 1 repaints every 16th tick; speed 16 and anything above
    /// repaints every tick. The floor of 1 means the frequency never
    /// reaches zero regardless of input.
    pub fn update_frequency(speed: f64) -> u64 {
        (BASE_TICKS_PER_UPDATE / speed).floor().max(1.0) as u64
    }

    /// Start a new animation loop against `surface`.
    ///
    /// Any previously running loop is cancelled first. The config is
    /// normalized (clamped into its documented domains) as it is captured.
    ///
    /// # Errors
    ///
    /// `GrainError::SurfaceUnavailable` if the surface's drawing context
    /// cannot be acquired.
    pub fn start(
        &mut self,
        surface: &mut dyn Surface,
        dimensions: SurfaceDimensions,
        config: GrainConfig,
    ) -> Result<AnimationHandle, GrainError> {
        if let Some(old) = self.run.take() {
            debug!("GrainAnimator: cancelling {:?} for restart", old.handle);
        }
        surface
            .acquire()
            .map_err(|e| GrainError::SurfaceUnavailable(format!("{e:#}")))?;

        let config = config.normalized();
        let update_frequency = Self::update_frequency(config.speed);
        self.next_generation += 1;
        let handle = AnimationHandle(self.next_generation);
        debug!(
            "GrainAnimator: started {:?} at {}x{}, redraw every {} ticks",
            handle, dimensions.width, dimensions.height, update_frequency
        );
        self.run = Some(RunState {
            handle,
            frame_count: 0,
            dimensions,
            config,
            update_frequency,
        });
        Ok(handle)
    }

    /// Stop the loop identified by `handle`. Idempotent: stale handles and
    /// repeated stops are no-ops.
    pub fn stop(&mut self, handle: AnimationHandle) {
        match &self.run {
            Some(run) if run.handle == handle => {
                debug!("GrainAnimator: stopped {:?}", handle);
                self.run = None;
            }
            _ => trace!("GrainAnimator: stop on inactive handle {:?}", handle),
        }
    }

    /// Restart the running loop against new dimensions, keeping its config.
    /// Returns the fresh handle, or `None` when Idle.
    pub fn resize(
        &mut self,
        surface: &mut dyn Surface,
        dimensions: SurfaceDimensions,
    ) -> Result<Option<AnimationHandle>, GrainError> {
        match self.run.take() {
            Some(run) => self.start(surface, dimensions, run.config).map(Some),
            None => Ok(None),
        }
    }

    /// Restart the running loop with a new config, keeping its dimensions.
    /// Returns the fresh handle, or `None` when Idle.
    pub fn reconfigure(
        &mut self,
        surface: &mut dyn Surface,
        config: GrainConfig,
    ) -> Result<Option<AnimationHandle>, GrainError> {
        match self.run.take() {
            Some(run) => self.start(surface, run.dimensions, config).map(Some),
            None => Ok(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// One refresh tick.
    ///
    /// Counts the tick, and on update-frequency multiples repaints: fill
    /// the surface with the background, generate a grain frame for the
    /// current dimensions, composite it at the configured opacity, present.
    /// The global alpha is restored to 1.0 on every exit path.
    ///
    /// Surface failures here are an expected teardown race and are
    /// swallowed after a debug log; they never reach the caller.
    pub fn tick(&mut self, handle: AnimationHandle, surface: &mut dyn Surface) -> TickOutcome {
        let run = match self.run.as_mut() {
            Some(run) if run.handle == handle => run,
            _ => {
                trace!("GrainAnimator: tick under inactive handle {:?}", handle);
                return TickOutcome::Ignored;
            }
        };

        run.frame_count += 1;
        if run.frame_count % run.update_frequency != 0 {
            return TickOutcome::Skipped;
        }

        match draw(&mut self.generator, run, surface) {
            Ok(true) => TickOutcome::Drawn,
            Ok(false) => TickOutcome::Skipped,
            Err(e) => {
                debug!("GrainAnimator: dropped frame, surface went away: {e:#}");
                TickOutcome::Skipped
            }
        }
    }
}

impl Default for GrainAnimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Repaint the surface for one throttled tick. Returns `Ok(false)` when the
/// viewport is zero-sized and there is nothing to draw.
fn draw(
    generator: &mut NoiseFrameGenerator,
    run: &RunState,
    surface: &mut dyn Surface,
) -> anyhow::Result<bool> {
    let dims = run.dimensions;
    if dims.is_empty() {
        return Ok(false);
    }

    surface.fill_all(run.config.background)?;
    let frame = generator.generate(
        dims.width as i32,
        dims.height as i32,
        run.config.intensity as i32,
    )?;

    surface.set_global_alpha(run.config.opacity);
    let composited = surface.composite(frame);
    // Scoped alpha: restored on every path, including a failed composite.
    surface.set_global_alpha(1.0);
    composited?;

    surface.present()?;
    Ok(true)
}
