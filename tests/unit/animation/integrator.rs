use super::*;

#[test]
fn disabled_auto_rotate_is_identity() {
    assert_eq!(advance(1.25, 10.0, false), 1.25);

    let mut s = RotationState::default();
    for _ in 0..50 {
        s.tick(7.0, false);
    }
    assert_eq!(s.radians(), 0.0);
    assert_eq!(s.ticks(), 0);
}

#[test]
fn one_tick_is_speed_times_tick_unit() {
    assert!((advance(0.0, 3.0, true) - 0.03).abs() < 1e-12);
    assert!((advance(2.0, 0.0, true) - 2.0).abs() < 1e-12);
}

#[test]
fn accumulates_linearly_over_calls() {
    let mut s = RotationState::default();
    let n = 250;
    let speed = 4.0;
    for _ in 0..n {
        s.tick(speed, true);
    }
    let expected = f64::from(n) * speed * ROTATION_TICK;
    assert!((s.radians() - expected).abs() < 1e-9);
    assert_eq!(s.ticks(), 250);
}

#[test]
fn rotation_is_not_wrapped() {
    let mut s = RotationState::default();
    for _ in 0..1000 {
        s.tick(10.0, true);
    }
    // 1000 * 10 * 0.01 = 100 rad, well past 2π.
    assert!(s.radians() > std::f64::consts::TAU);
    assert!((s.radians() - 100.0).abs() < 1e-9);
}
