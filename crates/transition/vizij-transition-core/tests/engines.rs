use std::cell::Cell;
use std::rc::Rc;

use vizij_transition_core::{
    interp::TweenEngine, Config, Curve, EngineKind, Scheduler, State, StateShape,
    TransitionError, TransitionSpec,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

/// Single-component tween that counts how often it is constructed.
fn counting_kind(built: Rc<Cell<usize>>) -> EngineKind {
    EngineKind::new(1, move |cfg| {
        built.set(built.get() + 1);
        Box::new(TweenEngine::new(cfg))
    })
}

#[test]
fn register_never_overwrites_and_unregister_reports_absence() {
    let mut s = Scheduler::default();
    let built = Rc::new(Cell::new(0));
    assert!(!s.registry_mut().register("tween", counting_kind(built.clone())));
    assert!(s.registry_mut().register("counting", counting_kind(built.clone())));
    assert!(!s.registry_mut().register("counting", EngineKind::tween()));
    assert!(!s.registry_mut().unregister("missing"));
    assert!(s.registry_mut().unregister("counting"));
    assert!(!s.registry().contains("counting"));

    // The original tween is still what "tween" resolves to.
    let id = s.create(None).unwrap();
    s.set(id, 1.0, Some(TransitionSpec::new(10.0).with_curve("tween")), None)
        .unwrap();
    assert_eq!(built.get(), 0);
}

#[test]
fn unknown_curves_fall_back_to_the_default_tween() {
    init_logger();
    let mut s = Scheduler::default();
    let id = s.create(None).unwrap();
    s.set(
        id,
        10.0,
        Some(TransitionSpec::new(100.0).with_curve("wobble")),
        None,
    )
    .unwrap();
    assert_eq!(s.instance(id).unwrap().engine_kind(), Some("tween"));
    s.tick(50.0);
    approx(s.get(id).unwrap().as_scalar().unwrap(), 5.0, 1e-9);
}

#[test]
fn default_curve_comes_from_config() {
    let cfg = Config {
        default_curve: "easeIn".to_string(),
        ..Config::default()
    };
    let mut s = Scheduler::new(cfg);
    let id = s.create(None).unwrap();
    s.set(id, 10.0, Some(TransitionSpec::new(100.0)), None).unwrap();
    s.tick(50.0);
    approx(s.get(id).unwrap().as_scalar().unwrap(), 2.5, 1e-9);
}

#[test]
fn custom_and_bezier_curves_shape_the_tween() {
    let mut s = Scheduler::default();
    let a = s.create(None).unwrap();
    let b = s.create(None).unwrap();
    s.set(
        a,
        10.0,
        Some(TransitionSpec::new(100.0).with_curve(Curve::custom(|t| t * t * t))),
        None,
    )
    .unwrap();
    s.set(
        b,
        10.0,
        Some(TransitionSpec::new(100.0).with_curve(Curve::CubicBezier([0.0, 0.0, 1.0, 1.0]))),
        None,
    )
    .unwrap();
    s.tick(50.0);
    approx(s.get(a).unwrap().as_scalar().unwrap(), 1.25, 1e-9);
    approx(s.get(b).unwrap().as_scalar().unwrap(), 5.0, 1e-3);
}

#[test]
fn wide_states_get_a_composite_and_engines_are_reused() {
    let mut s = Scheduler::default();
    let built = Rc::new(Cell::new(0));
    s.registry_mut()
        .register("counting", counting_kind(built.clone()));

    let id = s.create(Some(State::Sequence(vec![0.0; 3]))).unwrap();
    s.flush();
    let step = TransitionSpec::new(20.0).with_curve("counting");
    s.iterate(
        id,
        vec![vec![1.0, 2.0, 3.0].into(), vec![0.0, 0.0, 0.0].into()],
        step,
        None,
    )
    .unwrap();
    assert_eq!(built.get(), 3);
    assert_eq!(s.instance(id).unwrap().engine_kind(), Some("counting"));

    s.tick(10.0);
    assert_eq!(s.get(id).unwrap(), &State::Sequence(vec![0.5, 1.0, 1.5]));
    for _ in 0..3 {
        s.tick(10.0);
    }
    assert_eq!(s.get(id).unwrap(), &State::Sequence(vec![0.0, 0.0, 0.0]));
    // Consecutive entries of the same kind and shape share the engine.
    assert_eq!(built.get(), 3);
}

#[test]
fn spring_settles_exactly_on_target() {
    init_logger();
    let mut s = Scheduler::default();
    let id = s.create(None).unwrap();
    s.set(
        id,
        10.0,
        Some(
            TransitionSpec::new(0.0)
                .with_curve("spring")
                .with_period(200.0)
                .with_damping_ratio(0.4),
        ),
        None,
    )
    .unwrap();
    assert_eq!(s.instance(id).unwrap().engine_kind(), Some("spring"));

    let mut peak: f64 = 0.0;
    for _ in 0..500 {
        s.tick(16.0);
        peak = peak.max(s.get(id).unwrap().as_scalar().unwrap());
        if !s.is_registered(id).unwrap() {
            break;
        }
    }
    assert!(peak > 10.0, "underdamped spring should overshoot, peak={peak}");
    assert_eq!(s.get(id).unwrap().as_scalar(), Some(10.0));
    assert!(!s.is_active(id).unwrap());
}

#[test]
fn velocity_is_tracked_once_seeded() {
    let mut s = Scheduler::default();
    let id = s.create(None).unwrap();
    s.reset(id, 0.0, Some(State::Scalar(0.0))).unwrap();
    s.set(
        id,
        10.0,
        Some(TransitionSpec::new(100.0).with_curve("linear")),
        None,
    )
    .unwrap();
    s.tick(50.0);
    let v = s.velocity(id).unwrap().and_then(State::as_scalar).unwrap();
    approx(v, 0.1, 1e-6);

    // Untracked instances report no velocity.
    let other = s.create(None).unwrap();
    s.set(other, 1.0, Some(TransitionSpec::new(10.0)), None)
        .unwrap();
    s.tick(5.0);
    assert_eq!(s.velocity(other).unwrap(), None);
}

#[test]
fn seeded_velocity_starts_the_spring_moving() {
    let mut s = Scheduler::default();
    let id = s.create(None).unwrap();
    s.reset(id, 0.0, Some(State::Scalar(0.5))).unwrap();
    s.set(id, 0.0, Some(TransitionSpec::new(0.0).with_curve("spring")), None)
        .unwrap();
    s.tick(1.0);
    assert!(s.get(id).unwrap().as_scalar().unwrap() > 0.0);

    // An explicit spec velocity applies when the instance tracks none.
    let other = s.create(None).unwrap();
    s.set(
        other,
        0.0,
        Some(
            TransitionSpec::new(0.0)
                .with_curve("spring")
                .with_velocity(-0.5),
        ),
        None,
    )
    .unwrap();
    s.tick(1.0);
    assert!(s.get(other).unwrap().as_scalar().unwrap() < 0.0);
}

#[test]
fn keyed_velocity_follows_the_state_keys() {
    let mut s = Scheduler::default();
    let start: State = [("x", 0.0), ("y", 0.0)].into_iter().collect();
    let id = s.create(None).unwrap();
    let velocity: State = [("y", 0.05), ("x", 0.0)].into_iter().collect();
    s.reset(id, start.clone(), Some(velocity)).unwrap();
    let stored: State = [("x", 0.0), ("y", 0.05)].into_iter().collect();
    assert_eq!(s.velocity(id).unwrap(), Some(&stored));

    s.set(
        id,
        start,
        Some(
            TransitionSpec::new(0.0)
                .with_curve("spring")
                .with_damping_ratio(1.0),
        ),
        None,
    )
    .unwrap();
    s.tick(5.0);
    let State::Keyed(value) = s.get(id).unwrap() else {
        panic!("expected a keyed state");
    };
    assert_eq!(value["x"], 0.0);
    assert!(value["y"] > 0.0, "y did not move: {value:?}");
}

#[test]
fn spec_velocity_is_checked_against_the_state() {
    let mut s = Scheduler::default();
    let id = s.create(None).unwrap();
    let spring = TransitionSpec::new(0.0).with_curve("spring");
    assert_eq!(
        s.set(id, 1.0, Some(spring.clone().with_velocity(vec![1.0, 2.0])), None),
        Err(TransitionError::InvalidStateShape {
            expected: StateShape::Scalar,
            actual: StateShape::Sequence(2),
        })
    );
    assert_eq!(
        s.set(id, 1.0, Some(spring.clone().with_velocity(f64::NAN)), None),
        Err(TransitionError::NonFiniteValue { index: 0 })
    );
    assert!(matches!(
        s.set(id, 1.0, Some(spring.with_period(-1.0)), None),
        Err(TransitionError::InvalidSpringParameter { .. })
    ));
    assert!(s.ticker().is_empty());
}

#[test]
fn queued_spring_steps_do_not_inherit_parameters() {
    let spring = TransitionSpec::new(0.0).with_curve("spring").with_period(100.0);

    let mut reference = Scheduler::default();
    let fresh = reference.create(Some(State::Scalar(1.0))).unwrap();
    reference.flush();
    reference.set(fresh, 0.0, Some(spring.clone()), None).unwrap();
    reference.tick(30.0);
    let expected = reference.get(fresh).unwrap().as_scalar().unwrap();

    let mut s = Scheduler::default();
    let id = s.create(None).unwrap();
    s.iterate(
        id,
        vec![1.0.into(), 0.0.into()],
        vec![spring.clone().with_damping_ratio(5.0), spring],
        None,
    )
    .unwrap();
    let mut waited = 0.0;
    while s.instance(id).unwrap().queued() > 0 && waited < 20_000.0 {
        s.tick(10.0);
        waited += 10.0;
    }
    assert_eq!(s.instance(id).unwrap().queued(), 0);
    assert_eq!(s.get(id).unwrap().as_scalar(), Some(1.0));

    s.tick(30.0);
    approx(s.get(id).unwrap().as_scalar().unwrap(), expected, 1e-12);
}
