//! Conversions between Cartesian state and Keplerian orbital elements.
//!
//! Cartesian coordinates are what the integrator works in (no
//! singularities); orbital elements are what analysis and initial
//! conditions are phrased in. Angles are in radians, lengths in AU.

use nalgebra::Vector3;

/// Keplerian orbital elements of a bound orbit about a central mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis (AU)
    pub semi_major_axis: f64,

    /// Eccentricity (0 ≤ e < 1 for bound orbits)
    pub eccentricity: f64,

    /// Inclination to the xy reference plane (radians)
    pub inclination: f64,

    /// Longitude of the ascending node Ω (radians)
    pub longitude_ascending_node: f64,

    /// Argument of periapsis ω (radians)
    pub argument_of_periapsis: f64,

    /// True anomaly ν (radians)
    pub true_anomaly: f64,
}

impl OrbitalElements {
    /// Mean motion n = √(μ/a³).
    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.semi_major_axis.powi(3)).sqrt()
    }

    /// Orbital period T = 2π/n.
    pub fn period(&self, mu: f64) -> f64 {
        std::f64::consts::TAU / self.mean_motion(mu)
    }
}

/// Angle thresholds below which the node line or the eccentricity vector
/// is treated as undefined and the corresponding angle set to zero.
const DEGENERATE: f64 = 1e-10;

/// Convert a Cartesian state to orbital elements.
///
/// Standard vector algorithm: angular-momentum vector for the orbit
/// plane, node vector for Ω, eccentricity vector for e and ω, with the
/// true anomaly signed by the radial velocity. Circular and equatorial
/// orbits collapse the undefined angles to zero rather than NaN.
///
/// # Arguments
/// * `mu` - Gravitational parameter of the central body
/// * `r` - Position relative to the central body (AU)
/// * `v` - Velocity relative to the central body
pub fn to_elements(mu: f64, r: Vector3<f64>, v: Vector3<f64>) -> OrbitalElements {
    let dist = r.norm();
    let h = r.cross(&v);
    let h_norm = h.norm();

    let specific_energy = 0.5 * v.norm_squared() - mu / dist;
    let semi_major_axis = -0.5 * mu / specific_energy;

    let inclination = (h.z / h_norm).clamp(-1.0, 1.0).acos();

    // Node vector points at the ascending node; vanishes for equatorial
    // orbits.
    let node = Vector3::new(-h.y, h.x, 0.0);
    let node_norm = node.norm();

    let e_vec = v.cross(&h) / mu - r / dist;
    let eccentricity = e_vec.norm();

    let longitude_ascending_node = if node_norm > DEGENERATE {
        let mut capom = (node.x / node_norm).clamp(-1.0, 1.0).acos();
        if node.y < 0.0 {
            capom = std::f64::consts::TAU - capom;
        }
        capom
    } else {
        0.0
    };

    let argument_of_periapsis = if node_norm > DEGENERATE && eccentricity > DEGENERATE {
        let mut om = (node.dot(&e_vec) / (node_norm * eccentricity)).clamp(-1.0, 1.0).acos();
        if e_vec.z < 0.0 {
            om = std::f64::consts::TAU - om;
        }
        om
    } else if eccentricity > DEGENERATE {
        // Equatorial orbit: measure periapsis from the x axis.
        let mut om = (e_vec.x / eccentricity).clamp(-1.0, 1.0).acos();
        if e_vec.y < 0.0 {
            om = std::f64::consts::TAU - om;
        }
        om
    } else {
        0.0
    };

    let true_anomaly = if eccentricity > DEGENERATE {
        let mut nu = (e_vec.dot(&r) / (eccentricity * dist)).clamp(-1.0, 1.0).acos();
        if r.dot(&v) < 0.0 {
            nu = std::f64::consts::TAU - nu;
        }
        nu
    } else {
        // Circular orbit: angle from the node line (or the x axis).
        let reference = if node_norm > DEGENERATE {
            node / node_norm
        } else {
            Vector3::x()
        };
        let mut nu = (reference.dot(&r) / dist).clamp(-1.0, 1.0).acos();
        if reference.cross(&r).dot(&h) < 0.0 {
            nu = std::f64::consts::TAU - nu;
        }
        nu
    };

    OrbitalElements {
        semi_major_axis,
        eccentricity,
        inclination,
        longitude_ascending_node,
        argument_of_periapsis,
        true_anomaly,
    }
}

/// Convert orbital elements back to a Cartesian state.
///
/// Builds the perifocal state from (a, e, ν) and rotates it through
/// Rz(Ω)·Rx(i)·Rz(ω) into the reference frame.
///
/// # Arguments
/// * `elements` - Orbital elements of a bound orbit
/// * `mu` - Gravitational parameter of the central body
///
/// # Returns
/// `(position, velocity)` relative to the central body
pub fn elements_to_cartesian(elements: &OrbitalElements, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
    let a = elements.semi_major_axis;
    let e = elements.eccentricity;
    let nu = elements.true_anomaly;

    let p = a * (1.0 - e * e);
    let dist = p / (1.0 + e * nu.cos());

    // Perifocal frame: x toward periapsis, z along angular momentum.
    let r_pf = Vector3::new(dist * nu.cos(), dist * nu.sin(), 0.0);
    let v_factor = (mu / p).sqrt();
    let v_pf = Vector3::new(-v_factor * nu.sin(), v_factor * (e + nu.cos()), 0.0);

    let (sin_om, cos_om) = elements.argument_of_periapsis.sin_cos();
    let (sin_i, cos_i) = elements.inclination.sin_cos();
    let (sin_capom, cos_capom) = elements.longitude_ascending_node.sin_cos();

    let rotate = |u: Vector3<f64>| -> Vector3<f64> {
        // Rz(ω)
        let x1 = cos_om * u.x - sin_om * u.y;
        let y1 = sin_om * u.x + cos_om * u.y;
        let z1 = u.z;
        // Rx(i)
        let x2 = x1;
        let y2 = cos_i * y1 - sin_i * z1;
        let z2 = sin_i * y1 + cos_i * z1;
        // Rz(Ω)
        Vector3::new(
            cos_capom * x2 - sin_capom * y2,
            sin_capom * x2 + cos_capom * y2,
            z2,
        )
    };

    (rotate(r_pf), rotate(v_pf))
}
