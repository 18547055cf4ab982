// src/main.rs

//! Demo host for the filmgrain overlay: a console surface driven by a
//! vsync tick thread. All of the interesting work happens in the library;
//! this binary is the plumbing that connects surface, scheduler, and
//! refresh signal.

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::mpsc;

use filmgrain::config::CONFIG;
use filmgrain::scheduler::GrainAnimator;
use filmgrain::surface::console::ConsoleSurface;
use filmgrain::surface::{Surface, SurfaceDimensions, SurfaceEvent};
use filmgrain::vsync::VsyncActor;

fn main() -> Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting filmgrain...");
    let config = *CONFIG;
    info!(
        "Configuration loaded: intensity {}, speed {}, opacity {}, {} FPS",
        config.grain.intensity, config.grain.speed, config.grain.opacity,
        config.animation.target_fps
    );

    let mut surface = ConsoleSurface::new().context("Failed to initialize console surface")?;
    let dimensions = surface.dimensions();
    info!(
        "Console surface initialized at {}x{} px.",
        dimensions.width, dimensions.height
    );

    let (tick_tx, tick_rx) = mpsc::channel();
    let vsync = VsyncActor::spawn(tick_tx, config.animation.target_fps)
        .context("Failed to spawn vsync actor")?;

    let mut animator = GrainAnimator::new();
    let mut handle = animator
        .start(&mut surface, dimensions, config.grain)
        .context("Failed to start the animation loop")?;

    info!("Entering animation loop (press q or ESC to quit).");
    'animation: while let Ok(_tick) = tick_rx.recv() {
        let events = match surface.poll_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("Surface event polling failed: {:#}. Shutting down.", e);
                break 'animation;
            }
        };
        for event in events {
            match event {
                SurfaceEvent::Resized { width, height } => {
                    info!("Viewport resized to {}x{} px.", width, height);
                    if let Some(new_handle) =
                        animator.resize(&mut surface, SurfaceDimensions::new(width, height))?
                    {
                        handle = new_handle;
                    }
                }
                SurfaceEvent::CloseRequested => {
                    info!("Close requested.");
                    break 'animation;
                }
            }
        }
        animator.tick(handle, &mut surface);
    }

    animator.stop(handle);
    drop(tick_rx);
    drop(vsync);
    surface
        .cleanup()
        .context("Failed to clean up console surface")?;
    info!("filmgrain exited successfully.");
    Ok(())
}
