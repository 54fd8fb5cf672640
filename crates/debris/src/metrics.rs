//! Conserved-quantity diagnostics for the planetary system.

use nalgebra::Vector3;

use crate::frames::find_barycenter;
use crate::state::PlanetState;

/// Totals of the two quantities a symplectic integration should hold:
/// energy drifts within a bounded band, angular momentum to rounding.
#[derive(Debug, Clone, Copy)]
pub struct PlanetMetrics {
    /// Kinetic plus pairwise potential energy, barycentric frame.
    pub energy: f64,
    /// Total angular momentum, barycentric frame.
    pub angular_momentum: Vector3<f64>,
}

/// Computes total energy and angular momentum of the alive planets in
/// the barycentric frame, without mutating the state.
pub fn calculate_planet_metrics(pl: &PlanetState) -> PlanetMetrics {
    let n = pl.n_alive;
    let (r_bary, v_bary) = find_barycenter(&pl.r, &pl.v, &pl.m, n);

    let r: Vec<Vector3<f64>> = pl.r[..n].iter().map(|ri| ri - r_bary).collect();
    let v: Vec<Vector3<f64>> = pl.v[..n].iter().map(|vi| vi - v_bary).collect();

    let mut energy = 0.0;
    let mut angular_momentum = Vector3::zeros();
    for i in 0..n {
        energy += 0.5 * pl.m[i] * v[i].norm_squared();
        angular_momentum += pl.m[i] * r[i].cross(&v[i]);
    }
    for i in 0..n {
        for j in (i + 1)..n {
            energy -= pl.m[i] * pl.m[j] / (r[j] - r[i]).norm();
        }
    }

    PlanetMetrics {
        energy,
        angular_momentum,
    }
}
