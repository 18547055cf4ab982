// src/scheduler/tests.rs

use super::*;
use crate::color::{Color, NamedColor};
use crate::surface::mock::{MockSurface, SurfaceCall};
use test_log::test;

fn config_with_speed(speed: f64) -> GrainConfig {
    GrainConfig {
        speed,
        ..GrainConfig::default()
    }
}

fn dims(width: u32, height: u32) -> SurfaceDimensions {
    SurfaceDimensions::new(width, height)
}

#[test]
fn update_frequency_matches_the_speed_table() {
    assert_eq!(GrainAnimator::update_frequency(1.0), 16);
    assert_eq!(GrainAnimator::update_frequency(3.0), 5);
    assert_eq!(GrainAnimator::update_frequency(16.0), 1);
    // The floor of 1 holds however fast the caller asks to go.
    assert_eq!(GrainAnimator::update_frequency(100.0), 1);
}

#[test]
fn it_should_draw_on_every_fifth_tick_at_speed_three() {
    let mut surface = MockSurface::new(40, 30);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(40, 30), config_with_speed(3.0))
        .unwrap();

    let mut drawn = 0;
    for _ in 0..48 {
        if animator.tick(handle, &mut surface) == TickOutcome::Drawn {
            drawn += 1;
        }
    }
    // update_frequency = max(1, floor(16 / 3)) = 5, so ticks 5, 10, ... 45.
    assert_eq!(drawn, 9);
    assert_eq!(surface.composite_count(), 9);
}

#[test]
fn it_should_fill_then_composite_then_present_per_draw() {
    let mut surface = MockSurface::new(8, 8);
    let mut animator = GrainAnimator::new();
    let config = GrainConfig {
        speed: 16.0,
        opacity: 0.07,
        background: Color::Named(NamedColor::Ivory),
        ..GrainConfig::default()
    };
    let handle = animator.start(&mut surface, dims(8, 8), config).unwrap();

    assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Drawn);
    assert_eq!(
        surface.calls(),
        &[
            SurfaceCall::FillAll(Color::Named(NamedColor::Ivory)),
            SurfaceCall::SetGlobalAlpha(0.07),
            SurfaceCall::Composite {
                width: 8,
                height: 8
            },
            SurfaceCall::SetGlobalAlpha(1.0),
            SurfaceCall::Present,
        ]
    );
}

#[test]
fn it_should_not_draw_after_stop() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(16, 16), config_with_speed(16.0))
        .unwrap();

    assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Drawn);
    animator.stop(handle);
    surface.clear_calls();

    // Refresh signals keep firing after stop; none may draw.
    for _ in 0..32 {
        assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Ignored);
    }
    assert!(surface.calls().is_empty());
    assert!(!animator.is_running());
}

#[test]
fn stop_is_idempotent() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(16, 16), GrainConfig::default())
        .unwrap();
    animator.stop(handle);
    animator.stop(handle);
    assert!(!animator.is_running());
}

#[test]
fn it_should_restart_the_frame_counter_on_resize() {
    let mut surface = MockSurface::new(40, 30);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(40, 30), config_with_speed(3.0))
        .unwrap();

    // Three ticks into a five-tick cycle, then the viewport changes.
    for _ in 0..3 {
        animator.tick(handle, &mut surface);
    }
    let new_handle = animator
        .resize(&mut surface, dims(20, 10))
        .unwrap()
        .expect("animator was running");
    assert_ne!(handle, new_handle);

    // The old handle is dead.
    assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Ignored);

    // The counter starts over: nothing draws until a full cycle elapses.
    for _ in 0..4 {
        assert_eq!(animator.tick(new_handle, &mut surface), TickOutcome::Skipped);
    }
    assert_eq!(animator.tick(new_handle, &mut surface), TickOutcome::Drawn);
    assert_eq!(surface.composite_count(), 1);
    assert_eq!(
        surface.calls().last(),
        Some(&SurfaceCall::Present),
        "resize restart should draw at the new dimensions"
    );
    assert!(surface
        .calls()
        .contains(&SurfaceCall::Composite {
            width: 20,
            height: 10
        }));
}

#[test]
fn reconfigure_captures_the_new_config_under_a_fresh_handle() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(16, 16), config_with_speed(1.0))
        .unwrap();

    let new_handle = animator
        .reconfigure(&mut surface, config_with_speed(16.0))
        .unwrap()
        .expect("animator was running");
    assert_ne!(handle, new_handle);

    // Speed 16 redraws every tick.
    assert_eq!(animator.tick(new_handle, &mut surface), TickOutcome::Drawn);
}

#[test]
fn resize_while_idle_is_a_no_op() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    assert_eq!(animator.resize(&mut surface, dims(8, 8)).unwrap(), None);
    assert_eq!(
        animator
            .reconfigure(&mut surface, GrainConfig::default())
            .unwrap(),
        None
    );
}

#[test]
fn start_fails_loudly_when_the_surface_is_unavailable() {
    let mut surface = MockSurface::new(16, 16);
    surface.set_available(false);
    let mut animator = GrainAnimator::new();
    let err = animator
        .start(&mut surface, dims(16, 16), GrainConfig::default())
        .unwrap_err();
    assert!(matches!(err, GrainError::SurfaceUnavailable(_)));
    assert!(!animator.is_running());
}

#[test]
fn it_should_swallow_surface_loss_mid_loop() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(16, 16), config_with_speed(16.0))
        .unwrap();

    surface.set_fail_draws(true);
    // The drawing tick fails inside the surface; the loop keeps going.
    assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Skipped);
    assert!(animator.is_running());

    // The host comes back: the next tick draws again.
    surface.set_fail_draws(false);
    assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Drawn);
}

#[test]
fn alpha_is_restored_even_when_the_composite_fails() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(16, 16), config_with_speed(16.0))
        .unwrap();

    // Let the fill succeed but fail the composite after the alpha was set:
    // the restore must still be recorded.
    surface.set_fail_composites(true);
    animator.tick(handle, &mut surface);
    let alphas: Vec<&SurfaceCall> = surface
        .calls()
        .iter()
        .filter(|c| matches!(c, SurfaceCall::SetGlobalAlpha(_)))
        .collect();
    assert_eq!(alphas.last(), Some(&&SurfaceCall::SetGlobalAlpha(1.0)));
}

#[test]
fn zero_sized_viewports_tick_without_drawing() {
    let mut surface = MockSurface::new(0, 0);
    let mut animator = GrainAnimator::new();
    let handle = animator
        .start(&mut surface, dims(0, 0), config_with_speed(16.0))
        .unwrap();

    for _ in 0..8 {
        assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Skipped);
    }
    assert!(surface.calls().is_empty());
}

#[test]
fn speed_is_clamped_when_the_config_is_captured() {
    let mut surface = MockSurface::new(16, 16);
    let mut animator = GrainAnimator::new();
    // Raw speed 99 would give frequency 1 anyway; raw speed 0.1 would give
    // 160 but the domain clamp holds it at speed 1 => frequency 16.
    let handle = animator
        .start(&mut surface, dims(16, 16), config_with_speed(0.1))
        .unwrap();
    for _ in 0..15 {
        assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Skipped);
    }
    assert_eq!(animator.tick(handle, &mut surface), TickOutcome::Drawn);
}
