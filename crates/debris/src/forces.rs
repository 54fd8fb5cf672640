//! Acceleration kernels for the Wisdom-Holman split.
//!
//! Planet accelerations mix heliocentric and Jacobi terms; the split
//! keeps the interaction Hamiltonian consistent with the Jacobi Kepler
//! drift, so the signs and index conditions here (indirect terms only
//! for bodies 2.., direct terms for all alive pairs) must not be
//! "simplified". Particle accelerations reuse the reference acceleration
//! h0 recorded by the planet pass and add the direct planet pulls.

use nalgebra::Vector3;

use crate::state::{collision_flags, DEATH_ESCAPE};

/// Hill radius of a body orbiting a central mass: the natural length
/// scale of its gravitational influence, used to size encounter shells.
///
/// # Examples
///
/// ```
/// use debris::forces::hill_radius;
///
/// // Earth's Hill radius at 1 AU is about 0.01 AU.
/// let r_hill = hill_radius(3.0e-6, 1.0, 1.0);
/// assert!((r_hill - 0.01).abs() < 0.001);
/// ```
pub fn hill_radius(mass: f64, orbital_radius: f64, central_mass: f64) -> f64 {
    orbital_radius * (mass / (3.0 * central_mass)).powf(1.0 / 3.0)
}

/// Classifies a particle-planet separation against the two encounter
/// shells: 0 outside `r1·rh`, 1 inside `r1·rh`, 2 inside `r2·rh`.
pub fn detect_encounter(r_rel_sq: f64, rh: f64, r1: f64, r2: f64) -> u8 {
    if r_rel_sq > (r1 * rh) * (r1 * rh) {
        0
    } else if r_rel_sq > (r2 * rh) * (r2 * rh) {
        1
    } else {
        2
    }
}

/// Heliocentric planet accelerations for bodies `1..n_alive`.
///
/// Writes `a[1..n_alive]` and returns the reference acceleration h0
/// that particles reuse. `inv_helio_cubed` / `inv_jacobi_cubed` are
/// caller-owned scratch sized to at least `n_alive`.
///
/// Body 1 participates asymmetrically: it receives only the common and
/// direct terms, while its own attraction on the central body is folded
/// into h0.
pub fn helio_acc_planets(
    m: &[f64],
    r: &[Vector3<f64>],
    rj: &[Vector3<f64>],
    eta: &[f64],
    n_alive: usize,
    inv_helio_cubed: &mut [f64],
    inv_jacobi_cubed: &mut [f64],
    a: &mut [Vector3<f64>],
) -> Vector3<f64> {
    for i in 1..n_alive {
        let r2 = r[i].norm_squared();
        inv_helio_cubed[i] = 1.0 / (r2 * r2.sqrt());
        let rj2 = rj[i].norm_squared();
        inv_jacobi_cubed[i] = 1.0 / (rj2 * rj2.sqrt());
    }

    // Common heliocentric acceleration from bodies 2..
    let mut a_common = Vector3::zeros();
    for i in 2..n_alive {
        a_common -= m[i] * inv_helio_cubed[i] * r[i];
    }
    for accel in a.iter_mut().take(n_alive).skip(1) {
        *accel = a_common;
    }

    let h0 = a_common - m[1] * inv_helio_cubed[1] * r[1];

    // Indirect Jacobi/heliocentric difference; the innermost planet does
    // not receive a contribution.
    for i in 2..n_alive {
        a[i] += m[0] * (rj[i] * inv_jacobi_cubed[i] - r[i] * inv_helio_cubed[i]);
    }

    // Jacobi self-interaction, accumulated from inner to outer; again
    // the innermost planet does not participate.
    let mut a_accum = Vector3::zeros();
    for i in 2..n_alive {
        a_accum += (m[i] * m[0] * inv_jacobi_cubed[i] / eta[i - 1]) * rj[i];
        a[i] += a_accum;
    }

    // Direct pairwise interactions over all alive pairs.
    for i in 1..n_alive {
        for j in (i + 1)..n_alive {
            let dr = r[j] - r[i];
            let r2 = dr.norm_squared();
            let irij3 = 1.0 / (r2 * r2.sqrt());

            a[j] -= m[i] * irij3 * dr;
            a[i] += m[j] * irij3 * dr;
        }
    }

    h0
}

/// Result of one particle's acceleration pass.
#[derive(Debug, Clone, Copy)]
pub struct ParticleAcc {
    pub accel: Vector3<f64>,
    /// Death flags to OR into the particle (0 if it survived).
    pub flags: u16,
    /// Deepest encounter shell crossed (0 when outside all shells or
    /// when shells are not being checked).
    pub encounter_level: u8,
    /// Planet owning the deepest crossed shell.
    pub encounter_planet: usize,
}

/// Heliocentric acceleration of a single particle at `r`, plus death and
/// encounter classification.
///
/// # Arguments
/// * `m` - planet masses, indices `0..n_alive`
/// * `planet_r` - positions of planets `1..n_alive` (central body
///   excluded), typically a slice of the per-timestep log
/// * `h0` - logged reference acceleration for this timestep
/// * `shells` - per-planet Hill radii and the two shell multipliers,
///   when encounter detection is active
pub fn helio_acc_particle(
    m: &[f64],
    planet_r: &[Vector3<f64>],
    h0: Vector3<f64>,
    r: Vector3<f64>,
    collision_radius_sq: f64,
    escape_radius_sq: f64,
    shells: Option<(&[f64], f64, f64)>,
) -> ParticleAcc {
    let mut acc = ParticleAcc {
        accel: h0,
        flags: 0,
        encounter_level: 0,
        encounter_planet: 0,
    };

    for (j, &rp) in planet_r.iter().enumerate() {
        let planet = j + 1;
        let dr = r - rp;
        let r2 = dr.norm_squared();
        let irij3 = 1.0 / (r2 * r2.sqrt());

        acc.accel -= m[planet] * irij3 * dr;

        if r2 < collision_radius_sq {
            acc.flags |= collision_flags(planet);
        }

        if let Some((rh, r1, r2_shell)) = shells {
            let level = detect_encounter(r2, rh[planet], r1, r2_shell);
            if level > acc.encounter_level {
                acc.encounter_level = level;
                acc.encounter_planet = planet;
            }
        }
    }

    if r.norm_squared() > escape_radius_sq {
        acc.flags |= DEATH_ESCAPE;
    }

    acc
}

/// Acceleration of a particle in the frame of an encounter planet.
///
/// The central planet is excluded from the direct sum (its monopole is
/// handled by the encounter drift) and from the reference sum; every
/// other body, the central mass included, contributes its direct pull on
/// the particle minus its pull on the encounter planet (the frame is
/// non-inertial).
pub fn nonhelio_acc_encounter_particle(
    m: &[f64],
    planet_r: &[Vector3<f64>],
    n_alive: usize,
    r_rel: Vector3<f64>,
    central_planet: usize,
) -> Vector3<f64> {
    let r_cp = planet_r[central_planet - 1];
    let r_abs = r_rel + r_cp;

    let mut accel = Vector3::zeros();

    // Central mass, sitting at the heliocentric origin.
    let d2 = r_abs.norm_squared();
    accel -= m[0] / (d2 * d2.sqrt()) * r_abs;
    let p2 = r_cp.norm_squared();
    accel += m[0] / (p2 * p2.sqrt()) * r_cp;

    for planet in 1..n_alive {
        if planet == central_planet {
            continue;
        }
        let rp = planet_r[planet - 1];

        let dr = r_abs - rp;
        let d2 = dr.norm_squared();
        accel -= m[planet] / (d2 * d2.sqrt()) * dr;

        let dp = r_cp - rp;
        let p2 = dp.norm_squared();
        accel += m[planet] / (p2 * p2.sqrt()) * dp;
    }

    accel
}
