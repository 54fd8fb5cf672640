use approx::assert_relative_eq;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::frames::{
    eta, find_barycenter, helio_to_jacobi_r_planets, helio_to_jacobi_v_planets,
    jacobi_to_helio_planets, to_bary, to_helio,
};
use crate::state::{ParticleState, PlanetState};

fn random_vector(rng: &mut ChaChaRng, scale: f64) -> Vector3<f64> {
    Vector3::new(
        scale * (rng.random::<f64>() - 0.5),
        scale * (rng.random::<f64>() - 0.5),
        scale * (rng.random::<f64>() - 0.5),
    )
}

/// A random heliocentric system: solar-mass central body, planets with
/// masses up to ~1e-3.
fn random_system(rng: &mut ChaChaRng, n: usize) -> (Vec<f64>, Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
    let mut m = vec![1.0];
    let mut r = vec![Vector3::zeros()];
    let mut v = vec![Vector3::zeros()];
    for _ in 1..n {
        m.push(1e-3 * rng.random::<f64>() + 1e-6);
        r.push(random_vector(rng, 10.0));
        v.push(random_vector(rng, 0.5));
    }
    (m, r, v)
}

#[test]
fn eta_is_a_monotone_prefix_sum() {
    let m = [1.0, 0.5, 0.25, 0.125];
    let eta = eta(&m);

    assert_eq!(eta.len(), 4);
    assert_relative_eq!(eta[0], 1.0);
    assert_relative_eq!(eta[3], 1.875);
    for i in 1..eta.len() {
        assert!(eta[i] >= eta[i - 1]);
    }
}

#[test]
fn helio_jacobi_round_trips() {
    let mut rng = ChaChaRng::seed_from_u64(42);

    for n in 2..8 {
        let (m, r, v) = random_system(&mut rng, n);
        let eta = eta(&m);

        let mut rj = vec![Vector3::zeros(); n];
        let mut vj = vec![Vector3::zeros(); n];
        helio_to_jacobi_r_planets(&r, &m, &eta, &mut rj, n);
        helio_to_jacobi_v_planets(&v, &m, &eta, &mut vj, n);

        let mut r_back = vec![Vector3::zeros(); n];
        let mut v_back = vec![Vector3::zeros(); n];
        jacobi_to_helio_planets(&rj, &vj, &m, &eta, &mut r_back, &mut v_back, n);

        for i in 0..n {
            assert_relative_eq!((r_back[i] - r[i]).norm(), 0.0, epsilon = 1e-12);
            assert_relative_eq!((v_back[i] - v[i]).norm(), 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn jacobi_helio_round_trips() {
    let mut rng = ChaChaRng::seed_from_u64(7);
    let n = 5;
    let (m, rj_random, vj_random) = random_system(&mut rng, n);
    let eta = eta(&m);

    let mut r = vec![Vector3::zeros(); n];
    let mut v = vec![Vector3::zeros(); n];
    jacobi_to_helio_planets(&rj_random, &vj_random, &m, &eta, &mut r, &mut v, n);

    let mut rj_back = vec![Vector3::zeros(); n];
    let mut vj_back = vec![Vector3::zeros(); n];
    helio_to_jacobi_r_planets(&r, &m, &eta, &mut rj_back, n);
    helio_to_jacobi_v_planets(&v, &m, &eta, &mut vj_back, n);

    for i in 0..n {
        assert_relative_eq!((rj_back[i] - rj_random[i]).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!((vj_back[i] - vj_random[i]).norm(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn first_jacobi_coordinate_equals_heliocentric() {
    let mut rng = ChaChaRng::seed_from_u64(3);
    let (m, r, _v) = random_system(&mut rng, 4);
    let eta = eta(&m);

    let mut rj = vec![Vector3::zeros(); 4];
    helio_to_jacobi_r_planets(&r, &m, &eta, &mut rj, 4);

    // Body 0 sits at the origin, so body 1 is its own Jacobi coordinate.
    assert_relative_eq!((rj[1] - r[1]).norm(), 0.0, epsilon = 1e-15);
}

#[test]
fn barycentric_momentum_is_zero() {
    let mut rng = ChaChaRng::seed_from_u64(11);
    let (m, r, v) = random_system(&mut rng, 6);
    let total_mass: f64 = m.iter().sum();

    let mut pl = PlanetState::new(m, r, v);
    let mut pa = ParticleState::new(
        vec![random_vector(&mut rng, 10.0); 3],
        vec![random_vector(&mut rng, 0.5); 3],
    );

    to_bary(&mut pl, &mut pa);

    let mut weighted_r = Vector3::zeros();
    let mut weighted_v = Vector3::zeros();
    for i in 0..pl.n_alive {
        weighted_r += pl.m[i] * pl.r[i];
        weighted_v += pl.m[i] * pl.v[i];
    }

    assert!(weighted_r.norm() < 1e-12 * total_mass * 10.0);
    assert!(weighted_v.norm() < 1e-12 * total_mass);
}

#[test]
fn to_helio_pins_central_body_at_origin() {
    let mut rng = ChaChaRng::seed_from_u64(19);
    let (m, r, v) = random_system(&mut rng, 4);
    let mut pl = PlanetState::new(m, r, v);
    let mut pa = ParticleState::default();

    // Put the system in some shifted frame first.
    to_bary(&mut pl, &mut pa);
    to_helio(&mut pl, &mut pa);

    assert_relative_eq!(pl.r[0].norm(), 0.0, epsilon = 1e-15);
    assert_relative_eq!(pl.v[0].norm(), 0.0, epsilon = 1e-15);
}

#[test]
fn bary_and_helio_shift_particles_consistently() {
    let (m, r, v) = (
        vec![1.0, 1e-3],
        vec![Vector3::zeros(), Vector3::new(5.0, 0.0, 0.0)],
        vec![Vector3::zeros(), Vector3::new(0.0, 0.45, 0.0)],
    );
    let mut pl = PlanetState::new(m, r, v);
    let mut pa = ParticleState::new(
        vec![Vector3::new(3.0, 0.0, 0.0)],
        vec![Vector3::new(0.0, 0.57, 0.0)],
    );

    let separation = (pa.r[0] - pl.r[1]).norm();
    to_bary(&mut pl, &mut pa);
    assert_relative_eq!((pa.r[0] - pl.r[1]).norm(), separation, epsilon = 1e-13);
    to_helio(&mut pl, &mut pa);
    assert_relative_eq!((pa.r[0] - pl.r[1]).norm(), separation, epsilon = 1e-13);

    let (r_bary, v_bary) = find_barycenter(&pl.r, &pl.v, &pl.m, pl.n_alive);
    assert!(r_bary.norm() > 0.0);
    assert!(v_bary.norm() > 0.0);
}
