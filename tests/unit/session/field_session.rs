use super::*;
use crate::{
    foundation::core::Rgb,
    mapping::config::{MappingPolicy, SizeRange},
    source::{
        feed::{FixedViewport, FrameQueue},
        frame::Frame,
    },
};

fn checker() -> Frame {
    Frame::new(
        2,
        2,
        vec![
            255, 255, 255, 255, 0, 0, 0, 255, //
            0, 0, 0, 255, 255, 255, 255, 255,
        ],
    )
    .unwrap()
}

fn size_config() -> MapperConfig {
    MapperConfig {
        min_brightness: 0.0,
        max_brightness: 1.0,
        size_range: SizeRange {
            min: 0.01,
            max: 0.05,
        },
        ..MapperConfig::default().with_policy(MappingPolicy::SizeFromBrightness)
    }
}

fn queue_with(frame: Frame) -> FrameQueue {
    let mut q = FrameQueue::new();
    q.push(frame);
    q
}

#[test]
fn size_policy_end_to_end() {
    let mut s = FieldSession::new(size_config(), 2, AspectMode::Viewport, 1.0).unwrap();
    let outcome = s
        .tick(&mut queue_with(checker()), &FixedViewport::square())
        .unwrap();
    assert!(matches!(outcome, TickOutcome::Applied(d) if d.sizes && !d.positions));
    assert_eq!(s.current_attributes().sizes, &[0.05, 0.01, 0.01, 0.05]);
}

#[test]
fn missing_frame_skips_and_keeps_attributes() {
    let mut s = FieldSession::new(size_config(), 2, AspectMode::Viewport, 1.0).unwrap();
    let mut q = queue_with(checker());
    s.tick(&mut q, &FixedViewport::square()).unwrap();
    let before = s.current_attributes().sizes.to_vec();

    let outcome = s.tick(&mut q, &FixedViewport::square()).unwrap();
    assert_eq!(outcome, TickOutcome::Skipped);
    assert_eq!(s.current_attributes().sizes, before.as_slice());
}

#[test]
fn invalid_config_is_rejected_and_previous_stays() {
    let mut s = FieldSession::new(size_config(), 2, AspectMode::Viewport, 1.0).unwrap();
    let bad = MapperConfig {
        min_brightness: 0.6,
        max_brightness: 0.6,
        ..size_config()
    };
    assert!(s.set_config(bad).unwrap_err().is_config());
    assert_eq!(*s.config(), size_config());
}

#[test]
fn new_rejects_degenerate_density() {
    assert!(FieldSession::new(size_config(), 1, AspectMode::Viewport, 1.0).is_err());
}

#[test]
fn same_density_twice_rebuilds_once() {
    let mut s = FieldSession::new(size_config(), 10, AspectMode::Viewport, 16.0 / 9.0).unwrap();
    assert!(s.set_grid_density(40).unwrap());
    let first = *s.grid();
    assert!(!s.set_grid_density(40).unwrap());
    assert_eq!(*s.grid(), first);
    assert_eq!(s.generation(), 1);
    assert_eq!((first.grid_width, first.grid_height), (72, 40));
}

#[test]
fn invalid_density_keeps_current_grid() {
    let mut s = FieldSession::new(size_config(), 10, AspectMode::Viewport, 1.0).unwrap();
    assert!(s.set_grid_density(1).unwrap_err().is_config());
    assert_eq!(s.grid_size(), 10);
    assert_eq!(s.field().len(), 100);
}

#[test]
fn viewport_change_relayouts_before_mapping() {
    let mut s = FieldSession::new(size_config(), 4, AspectMode::Viewport, 1.0).unwrap();
    let frame = Frame::solid(8, 4, [255, 255, 255, 255]).unwrap();
    let outcome = s
        .tick(&mut queue_with(frame), &FixedViewport::new(2.0, 1.0))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Applied(DirtyFlags::ALL));
    assert_eq!((s.grid().grid_width, s.grid().grid_height), (8, 4));
    assert_eq!(s.generation(), 1);
    assert!(s.current_attributes().sizes.iter().all(|v| *v == 0.05));
}

#[test]
fn source_aspect_mode_follows_the_video() {
    let mut s = FieldSession::new(size_config(), 4, AspectMode::Source, 1.0).unwrap();
    let frame = Frame::solid(4, 8, [0, 0, 0, 255]).unwrap();
    s.tick(&mut queue_with(frame), &FixedViewport::new(2.0, 0.5))
        .unwrap();
    assert_eq!((s.grid().grid_width, s.grid().grid_height), (4, 8));
}

#[test]
fn invalid_viewport_aspect_keeps_layout() {
    let mut s = FieldSession::new(size_config(), 4, AspectMode::Viewport, 1.0).unwrap();
    let outcome = s
        .tick(&mut queue_with(checker()), &FixedViewport::new(0.0, 1.0))
        .unwrap();
    assert!(matches!(outcome, TickOutcome::Applied(_)));
    assert_eq!(s.generation(), 0);
}

#[test]
fn static_policies_never_dirty_positions() {
    let mut s = FieldSession::new(
        MapperConfig::default(),
        3,
        AspectMode::Viewport,
        1.0,
    )
    .unwrap();
    let vp = FixedViewport::square();
    s.tick(&mut queue_with(checker()), &vp).unwrap();
    let outcome = s.tick(&mut queue_with(checker()), &vp).unwrap();
    assert_eq!(outcome, TickOutcome::Applied(DirtyFlags::default()));
}

#[test]
fn drift_moves_particles_and_wraps() {
    let cfg = MapperConfig {
        flow_step_scale: 1.0,
        flow_stride: 1,
        ..MapperConfig::default().with_policy(MappingPolicy::Drift)
    };
    let mut s = FieldSession::new(cfg, 2, AspectMode::Viewport, 1.0).unwrap();
    assert!(s.is_tracking_motion());
    let vp = FixedViewport::square();

    let dark = Frame::solid(4, 4, [0, 0, 0, 255]).unwrap();
    let red = Frame::solid(4, 4, [255, 0, 0, 255]).unwrap();

    s.tick(&mut queue_with(dark), &vp).unwrap();
    let start = s.current_attributes().positions.to_vec();

    let outcome = s.tick(&mut queue_with(red), &vp).unwrap();
    let TickOutcome::Applied(dirty) = outcome else {
        panic!("tick should apply");
    };
    assert!(dirty.positions);
    assert!(dirty.colors);

    let a = s.current_attributes();
    for (p, p0) in a.positions.iter().zip(&start) {
        assert!((-1.0..=1.0).contains(&p.x) && (-1.0..=1.0).contains(&p.y));
        assert_eq!(p.y, p0.y);
    }
    // x = -1 + 1 stays in range, x = 1 + 1 wraps around to 0.
    assert_eq!(a.positions[0].x, 0.0);
    assert_eq!(a.positions[1].x, 0.0);
    assert!(a.colors.iter().all(|c| *c == Rgb::new(1.0, 0.0, 0.0)));
}

#[test]
fn leaving_drift_restores_the_grid() {
    let cfg = MapperConfig {
        flow_step_scale: 0.5,
        flow_stride: 1,
        ..MapperConfig::default().with_policy(MappingPolicy::Drift)
    };
    let mut s = FieldSession::new(cfg, 3, AspectMode::Viewport, 1.0).unwrap();
    let base = s.current_attributes().positions.to_vec();
    let vp = FixedViewport::square();
    s.tick(&mut queue_with(Frame::solid(6, 6, [0, 0, 0, 255]).unwrap()), &vp)
        .unwrap();
    s.tick(&mut queue_with(Frame::solid(6, 6, [255, 0, 0, 255]).unwrap()), &vp)
        .unwrap();
    assert_ne!(s.current_attributes().positions, base.as_slice());

    s.set_config(MapperConfig::default()).unwrap();
    assert!(!s.is_tracking_motion());
    assert_eq!(s.current_attributes().positions, base.as_slice());
}

#[test]
fn oversized_viewport_layout_is_refused_and_tick_still_applies() {
    let mut s = FieldSession::new(size_config(), 100, AspectMode::Viewport, 1.0).unwrap();
    let outcome = s
        .tick(&mut queue_with(checker()), &FixedViewport::new(1e-7, 1.0))
        .unwrap();
    assert!(matches!(outcome, TickOutcome::Applied(_)));
    assert_eq!(s.generation(), 0);
    assert_eq!((s.grid().grid_width, s.grid().grid_height), (100, 100));
    assert_eq!(s.field().len(), 10_000);
}

#[test]
fn stuck_invalid_aspect_is_remembered_until_a_valid_one_arrives() {
    let mut s = FieldSession::new(size_config(), 4, AspectMode::Viewport, 1.0).unwrap();
    let bad = FixedViewport::new(f64::NAN, 1.0);
    s.tick(&mut queue_with(checker()), &bad).unwrap();
    assert_eq!(s.rejected_aspect.map(f64::to_bits), Some(f64::NAN.to_bits()));
    s.tick(&mut queue_with(checker()), &bad).unwrap();
    assert_eq!(s.rejected_aspect.map(f64::to_bits), Some(f64::NAN.to_bits()));
    assert_eq!(s.generation(), 0);

    s.tick(&mut queue_with(checker()), &FixedViewport::new(2.0, 1.0))
        .unwrap();
    assert!(s.rejected_aspect.is_none());
    assert_eq!(s.generation(), 1);
}
