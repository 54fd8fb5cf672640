//! Coordinate-frame transforms.
//!
//! Three frames appear in a Wisdom-Holman step:
//! - **heliocentric**: relative to the central body (index 0), which the
//!   phase-space arrays use between steps;
//! - **Jacobi**: body i relative to the barycenter of bodies `0..i`,
//!   which diagonalizes the kinetic energy and is where planets drift;
//! - **barycentric**: relative to the system center of mass, used for
//!   initial conditions and conserved-quantity diagnostics.
//!
//! The Jacobi recurrences are driven by the cumulative-mass prefix η,
//! with `η[0] = m[0]` and `η[i] = η[i-1] + m[i]`.

use nalgebra::Vector3;

use crate::state::{ParticleState, PlanetState};

/// Cumulative-mass prefix η over the mass array.
pub fn eta(m: &[f64]) -> Vec<f64> {
    let mut eta = Vec::with_capacity(m.len());
    let mut sum = 0.0;
    for &mass in m {
        sum += mass;
        eta.push(sum);
    }
    eta
}

/// Heliocentric → Jacobi positions for planets `0..n`.
///
/// `rj[i]` is the position of body i relative to the barycenter of
/// bodies `0..i`; `rj[0] = 0`.
pub fn helio_to_jacobi_r_planets(
    r: &[Vector3<f64>],
    m: &[f64],
    eta: &[f64],
    rj: &mut [Vector3<f64>],
    n: usize,
) {
    rj[0] = Vector3::zeros();
    // Σ m[k]·r[k] over k < i; body 0 sits at the origin so it
    // contributes nothing.
    let mut weighted = Vector3::zeros();
    for i in 1..n {
        rj[i] = r[i] - weighted / eta[i - 1];
        weighted += m[i] * r[i];
    }
}

/// Heliocentric → Jacobi velocities; identical recurrence to
/// [`helio_to_jacobi_r_planets`].
pub fn helio_to_jacobi_v_planets(
    v: &[Vector3<f64>],
    m: &[f64],
    eta: &[f64],
    vj: &mut [Vector3<f64>],
    n: usize,
) {
    vj[0] = Vector3::zeros();
    let mut weighted = Vector3::zeros();
    for i in 1..n {
        vj[i] = v[i] - weighted / eta[i - 1];
        weighted += m[i] * v[i];
    }
}

/// Jacobi → heliocentric positions and velocities, the inverse
/// recurrence: each body is offset by the mass-weighted mean of the
/// already-converted inner bodies.
pub fn jacobi_to_helio_planets(
    rj: &[Vector3<f64>],
    vj: &[Vector3<f64>],
    m: &[f64],
    eta: &[f64],
    r: &mut [Vector3<f64>],
    v: &mut [Vector3<f64>],
    n: usize,
) {
    r[0] = Vector3::zeros();
    v[0] = Vector3::zeros();
    let mut weighted_r = Vector3::zeros();
    let mut weighted_v = Vector3::zeros();
    for i in 1..n {
        r[i] = rj[i] + weighted_r / eta[i - 1];
        v[i] = vj[i] + weighted_v / eta[i - 1];
        weighted_r += m[i] * r[i];
        weighted_v += m[i] * v[i];
    }
}

/// Mass-weighted mean position and velocity of bodies `0..n`.
pub fn find_barycenter(
    r: &[Vector3<f64>],
    v: &[Vector3<f64>],
    m: &[f64],
    n: usize,
) -> (Vector3<f64>, Vector3<f64>) {
    let mut r_sum = Vector3::zeros();
    let mut v_sum = Vector3::zeros();
    let mut mass = 0.0;
    for i in 0..n {
        r_sum += m[i] * r[i];
        v_sum += m[i] * v[i];
        mass += m[i];
    }
    (r_sum / mass, v_sum / mass)
}

/// Shifts every body, particles included, into the barycentric frame.
pub fn to_bary(pl: &mut PlanetState, pa: &mut ParticleState) {
    let (r_bary, v_bary) = find_barycenter(&pl.r, &pl.v, &pl.m, pl.n_alive);
    shift_all(pl, pa, r_bary, v_bary);
}

/// Shifts every body, particles included, into the heliocentric frame
/// (central body at the origin). A no-op when already heliocentric.
pub fn to_helio(pl: &mut PlanetState, pa: &mut ParticleState) {
    let (r0, v0) = (pl.r[0], pl.v[0]);
    shift_all(pl, pa, r0, v0);
}

fn shift_all(pl: &mut PlanetState, pa: &mut ParticleState, dr: Vector3<f64>, dv: Vector3<f64>) {
    for r in &mut pl.r {
        *r -= dr;
    }
    for v in &mut pl.v {
        *v -= dv;
    }
    for r in &mut pa.r {
        *r -= dr;
    }
    for v in &mut pa.v {
        *v -= dv;
    }
}
