// src/surface/mock.rs

use anyhow::{bail, Result};

use crate::color::Color;
use crate::frame::PixelBuffer;
use crate::surface::{Surface, SurfaceDimensions, SurfaceEvent};

/// One recorded drawing call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    FillAll(Color),
    SetGlobalAlpha(f32),
    Composite { width: u32, height: u32 },
    Present,
}

/// Spy surface for scheduler tests: records every drawing call and can
/// simulate an unavailable or mid-loop-failing host.
pub struct MockSurface {
    dimensions: SurfaceDimensions,
    events: Vec<SurfaceEvent>,
    calls: Vec<SurfaceCall>,
    available: bool,
    fail_draws: bool,
    fail_composites: bool,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: SurfaceDimensions::new(width, height),
            events: Vec::new(),
            calls: Vec::new(),
            available: true,
            fail_draws: false,
            fail_composites: false,
        }
    }

    pub fn push_event(&mut self, event: SurfaceEvent) {
        self.events.push(event);
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Number of composites recorded, i.e. frames actually drawn.
    pub fn composite_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Composite { .. }))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// When false, `acquire` fails, as a torn-down host would.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// When set, drawing calls fail, as a host torn down mid-loop would.
    pub fn set_fail_draws(&mut self, fail: bool) {
        self.fail_draws = fail;
    }

    /// When set, only `composite` fails: the fill has already landed, so
    /// the caller's alpha discipline around the failure becomes visible.
    pub fn set_fail_composites(&mut self, fail: bool) {
        self.fail_composites = fail;
    }
}

impl Surface for MockSurface {
    fn dimensions(&self) -> SurfaceDimensions {
        self.dimensions
    }

    fn acquire(&mut self) -> Result<()> {
        if !self.available {
            bail!("mock surface is gone");
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<SurfaceEvent>> {
        Ok(self.events.drain(..).collect())
    }

    fn fill_all(&mut self, color: Color) -> Result<()> {
        if self.fail_draws {
            bail!("mock surface lost its context");
        }
        self.calls.push(SurfaceCall::FillAll(color));
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.calls.push(SurfaceCall::SetGlobalAlpha(alpha));
    }

    fn composite(&mut self, frame: &PixelBuffer) -> Result<()> {
        if self.fail_draws || self.fail_composites {
            bail!("mock surface lost its context");
        }
        self.calls.push(SurfaceCall::Composite {
            width: frame.width(),
            height: frame.height(),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if self.fail_draws {
            bail!("mock surface lost its context");
        }
        self.calls.push(SurfaceCall::Present);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_drain_in_order() {
        let mut surface = MockSurface::new(4, 4);
        surface.push_event(SurfaceEvent::Resized {
            width: 8,
            height: 8,
        });
        surface.push_event(SurfaceEvent::CloseRequested);
        assert_eq!(
            surface.poll_events().unwrap(),
            vec![
                SurfaceEvent::Resized {
                    width: 8,
                    height: 8
                },
                SurfaceEvent::CloseRequested
            ]
        );
        assert!(surface.poll_events().unwrap().is_empty());
    }
}
