// src/vsync.rs

//! Refresh-signal source.
//!
//! `VsyncActor` runs in a dedicated background thread and sends one `Tick`
//! per frame interval to its subscriber. Drawing stays on the subscriber's
//! thread: the actor only provides cadence, so ticks are consumed strictly
//! one at a time. The actor itself is the cancellation token; dropping it
//! shuts the thread down and joins it.

use anyhow::{Context, Result};
use log::{debug, error, info};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A single refresh tick. Carries nothing; the cadence is the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

#[derive(Debug)]
enum VsyncCommand {
    Shutdown,
}

pub struct VsyncActor {
    thread_handle: Option<JoinHandle<()>>,
    control_tx: Sender<VsyncCommand>,
}

impl VsyncActor {
    /// Spawn the tick thread.
    ///
    /// `target_fps` is clamped to [1, 240]. The subscriber hanging up also
    /// stops the thread, so an actor can outlive its receiver safely.
    pub fn spawn(tick_tx: Sender<Tick>, target_fps: u32) -> Result<Self> {
        let (control_tx, control_rx) = mpsc::channel();
        let safe_fps = target_fps.clamp(1, 240);

        let thread_handle = thread::Builder::new()
            .name("vsync".to_string())
            .spawn(move || {
                run_vsync_loop(tick_tx, control_rx, safe_fps);
            })
            .context("Failed to spawn vsync thread")?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            control_tx,
        })
    }
}

impl Drop for VsyncActor {
    fn drop(&mut self) {
        // The thread wakes from recv_timeout within one frame interval.
        let _ = self.control_tx.send(VsyncCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("VsyncActor thread panicked: {:?}", e);
            }
        }
    }
}

fn run_vsync_loop(tick_tx: Sender<Tick>, control_rx: Receiver<VsyncCommand>, fps: u32) {
    info!("VsyncActor: Started (target: {} FPS)", fps);
    let frame_duration = Duration::from_secs_f64(1.0 / fps as f64);

    loop {
        match control_rx.recv_timeout(frame_duration) {
            Ok(VsyncCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                debug!("VsyncActor: Shutdown, exiting");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                // Frame interval elapsed. Tick!
                if tick_tx.send(Tick).is_err() {
                    info!("VsyncActor: Subscriber gone, exiting");
                    break;
                }
            }
        }
    }
    debug!("VsyncActor: Thread exiting");
}
