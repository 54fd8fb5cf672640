use approx::assert_relative_eq;
use nalgebra::Vector3;
use std::f64::consts::TAU;

use crate::drift::{drift, drift_single};
use crate::error::KeplerError;

/// Periapsis state of an orbit with the given semi-major axis and
/// eccentricity about μ = 1.
fn periapsis_state(a: f64, e: f64) -> (Vector3<f64>, Vector3<f64>) {
    let r_peri = a * (1.0 - e);
    let v_peri = ((1.0 + e) / (a * (1.0 - e))).sqrt();
    (Vector3::new(r_peri, 0.0, 0.0), Vector3::new(0.0, v_peri, 0.0))
}

fn specific_energy(mu: f64, r: Vector3<f64>, v: Vector3<f64>) -> f64 {
    0.5 * v.norm_squared() - mu / r.norm()
}

#[test]
fn circular_orbit_keeps_radius() {
    let mut r = Vector3::new(1.0, 0.0, 0.0);
    let mut v = Vector3::new(0.0, 1.0, 0.0);

    drift_single(0.7, 1.0, &mut r, &mut v).unwrap();

    assert_relative_eq!(r.norm(), 1.0, epsilon = 1e-13);
    assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-13);
}

#[test]
fn full_period_returns_to_start() {
    // a = 1 about μ = 1 has period 2π exactly.
    let (r0, v0) = periapsis_state(1.0, 0.4);
    let (mut r, mut v) = (r0, v0);

    drift_single(TAU, 1.0, &mut r, &mut v).unwrap();

    assert_relative_eq!(r.x, r0.x, epsilon = 1e-10);
    assert_relative_eq!(r.y, r0.y, epsilon = 1e-10);
    assert_relative_eq!(v.y, v0.y, epsilon = 1e-10);
}

#[test]
fn drift_is_a_flow() {
    // Drifting t₁ then t₂ must equal drifting t₁ + t₂: the Kepler
    // advance is the exact flow of the two-body problem.
    let (mut r_split, mut v_split) = periapsis_state(1.3, 0.5);
    let (mut r_whole, mut v_whole) = (r_split, v_split);

    drift_single(0.3, 1.0, &mut r_split, &mut v_split).unwrap();
    drift_single(0.7, 1.0, &mut r_split, &mut v_split).unwrap();
    drift_single(1.0, 1.0, &mut r_whole, &mut v_whole).unwrap();

    assert_relative_eq!((r_split - r_whole).norm(), 0.0, epsilon = 1e-10);
    assert_relative_eq!((v_split - v_whole).norm(), 0.0, epsilon = 1e-10);
}

#[test]
fn drift_conserves_energy_and_angular_momentum() {
    let (r0, v0) = periapsis_state(2.0, 0.7);
    let (mut r, mut v) = (r0, v0);

    drift_single(5.3, 1.0, &mut r, &mut v).unwrap();

    assert_relative_eq!(
        specific_energy(1.0, r, v),
        specific_energy(1.0, r0, v0),
        epsilon = 1e-12
    );
    let l0 = r0.cross(&v0);
    let l1 = r.cross(&v);
    assert_relative_eq!((l1 - l0).norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn radius_stays_within_apsidal_bounds() {
    let (a, e) = (1.5, 0.6);
    let (mut r, mut v) = periapsis_state(a, e);

    for _ in 0..50 {
        drift_single(0.37, 1.0, &mut r, &mut v).unwrap();
        let dist = r.norm();
        assert!(dist >= a * (1.0 - e) - 1e-9, "below periapsis: {dist}");
        assert!(dist <= a * (1.0 + e) + 1e-9, "above apoapsis: {dist}");
    }
}

#[test]
fn unbound_orbit_is_fatal() {
    // v² = 4 > 2μ/r = 2 at r = 1: hyperbolic.
    let mut r = Vector3::new(1.0, 0.0, 0.0);
    let mut v = Vector3::new(0.0, 2.0, 0.0);

    let err = drift_single(0.1, 1.0, &mut r, &mut v).unwrap_err();

    match err {
        KeplerError::UnboundOrbit { index, energy } => {
            assert_eq!(index, 0);
            assert!(energy >= 0.0);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn masked_bodies_are_skipped_and_cannot_fail() {
    let mu = [1.0, 1.0];
    let mut r = [Vector3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
    // Body 1 is unbound but masked out.
    let mut v = [Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 5.0, 0.0)];
    let skip = [false, true];

    drift(0.5, &mu, &mut r, &mut v, 0, 2, Some(&skip)).unwrap();

    assert_relative_eq!(r[1].x, 1.0, epsilon = 1e-15);
    assert_relative_eq!(v[1].y, 5.0, epsilon = 1e-15);
    assert!((r[0] - Vector3::new(1.0, 0.0, 0.0)).norm() > 1e-3);
}

#[test]
fn array_drift_matches_single() {
    let mu = [0.0, 1.0, 1.0];
    let (r0, v0) = periapsis_state(1.2, 0.3);
    let mut r = [Vector3::zeros(), r0, r0];
    let mut v = [Vector3::zeros(), v0, v0];

    drift(0.9, &mu, &mut r, &mut v, 1, 2, None).unwrap();

    let (mut r_single, mut v_single) = (r0, v0);
    drift_single(0.9, 1.0, &mut r_single, &mut v_single).unwrap();

    for i in 1..3 {
        assert_relative_eq!((r[i] - r_single).norm(), 0.0, epsilon = 1e-14);
        assert_relative_eq!((v[i] - v_single).norm(), 0.0, epsilon = 1e-14);
    }
}
