//! Close-encounter substepping.
//!
//! A particle that crosses a planet's encounter shell leaves the regular
//! particle step and is re-integrated on a finer substep with that
//! planet as the dominant attractor: kick with the non-heliocentric
//! perturbation, Kepler drift about the planet's μ, kick. The substep
//! count depends on which shell the particle is inside. Substepping ends
//! when the particle re-emerges past the outer shell, collides, or
//! escapes.

use nalgebra::Vector3;

use keplerian::{drift_single, Result};

use crate::config::Configuration;
use crate::forces;
use crate::state::{collision_flags, ParticleState, PlanetState, DEATH_ESCAPE};

/// Transient encounter bookkeeping for one particle. Owned by the
/// integrator's working arrays; never recorded in `deathflags`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EncounterState {
    /// Planet whose shell the particle crossed.
    pub planet: usize,
    /// Current shell level (1 = outer, 2 = inner).
    pub level: u8,
    /// First timestep of the block still to integrate.
    pub resume_at: usize,
}

/// Substeps per global timestep at a given shell level.
pub fn encounter_substep_count(level: u8, config: &Configuration) -> usize {
    match level {
        0 => 1,
        1 => config.encounter_n1,
        _ => config.encounter_n2,
    }
}

/// Re-integrates one encounter particle from the timestep where it
/// crossed the shell to the end of the block, against the logged planet
/// trajectory.
///
/// Returns whether the particle re-emerged past the outer shell (its
/// transient state should then be cleared). Death flags set here are
/// final; the caller drops the encounter state of dead particles.
pub(crate) fn integrate_encounter_particle_catchup(
    pl: &PlanetState,
    pa: &mut ParticleState,
    particle: usize,
    state: &mut EncounterState,
    t: f64,
    config: &Configuration,
    planet_rh: &[f64],
) -> Result<bool> {
    let dt = config.dt;
    let collision_radius_sq = config.collision_radius * config.collision_radius;
    let escape_radius_sq = config.escape_radius * config.escape_radius;

    for timestep in state.resume_at..config.tbsize {
        if pa.deathflags[particle] != 0 {
            break;
        }
        let time = t + dt * (timestep as f64 + 1.0);

        if state.level == 0 {
            // Emerged mid-block: plain heliocentric stepping against the
            // logged planets, which may also re-enter a shell.
            step_helio_single(pl, pa, particle, timestep, time, config, planet_rh, state)?;
            continue;
        }

        let planet_r = pl.logged_r(timestep);
        let planet_v = pl.logged_v(timestep);
        let cp = state.planet;
        let r_cp = planet_r[cp - 1];
        let v_cp = planet_v[cp - 1];

        let mut r_rel = pa.r[particle] - r_cp;
        let mut v_rel = pa.v[particle] - v_cp;

        let n_sub = encounter_substep_count(state.level, config);
        let dt_sub = dt / n_sub as f64;

        for _ in 0..n_sub {
            encounter_substep(&pl.m, planet_r, pl.n_alive, cp, &mut r_rel, &mut v_rel, dt_sub)?;

            if r_rel.norm_squared() < collision_radius_sq {
                pa.kill(particle, collision_flags(cp), time);
                tracing::debug!(particle, planet = cp, time, "collision during encounter");
                break;
            }
            if (r_rel + r_cp).norm_squared() > escape_radius_sq {
                pa.kill(particle, DEATH_ESCAPE, time);
                tracing::debug!(particle, time, "escape during encounter");
                break;
            }
        }

        pa.r[particle] = r_rel + r_cp;
        pa.v[particle] = v_rel + v_cp;

        // Reclassify for the next timestep.
        state.level = forces::detect_encounter(
            r_rel.norm_squared(),
            planet_rh[cp],
            config.encounter_r1,
            config.encounter_r2,
        );
    }

    Ok(state.level == 0)
}

/// One substep about the encounter planet. Bound relative orbits take
/// the exact Kepler drift with the planet's monopole excluded from the
/// kicks; hyperbolic flybys take a leapfrog advance under the monopole
/// instead, which the elliptic drift cannot represent.
fn encounter_substep(
    m: &[f64],
    planet_r: &[Vector3<f64>],
    n_alive: usize,
    cp: usize,
    r_rel: &mut Vector3<f64>,
    v_rel: &mut Vector3<f64>,
    dt_sub: f64,
) -> Result<()> {
    let mu = m[cp];
    let half = 0.5 * dt_sub;

    let a0 = forces::nonhelio_acc_encounter_particle(m, planet_r, n_alive, *r_rel, cp);
    *v_rel += a0 * half;

    let energy = 0.5 * v_rel.norm_squared() - mu / r_rel.norm();
    if energy < 0.0 {
        drift_single(dt_sub, mu, r_rel, v_rel)?;
    } else {
        monopole_leapfrog(mu, r_rel, v_rel, dt_sub);
    }

    let a1 = forces::nonhelio_acc_encounter_particle(m, planet_r, n_alive, *r_rel, cp);
    *v_rel += a1 * half;

    Ok(())
}

/// Drift-kick-drift advance under the planet monopole alone.
fn monopole_leapfrog(mu: f64, r_rel: &mut Vector3<f64>, v_rel: &mut Vector3<f64>, dt: f64) {
    *r_rel += *v_rel * (0.5 * dt);
    let d2 = r_rel.norm_squared();
    *v_rel -= mu / (d2 * d2.sqrt()) * *r_rel * dt;
    *r_rel += *v_rel * (0.5 * dt);
}

/// Plain heliocentric kick-drift-kick for a single catchup particle at
/// one logged timestep. Updates the encounter state if the particle
/// crosses a shell again.
#[allow(clippy::too_many_arguments)]
fn step_helio_single(
    pl: &PlanetState,
    pa: &mut ParticleState,
    particle: usize,
    timestep: usize,
    time: f64,
    config: &Configuration,
    planet_rh: &[f64],
    state: &mut EncounterState,
) -> Result<()> {
    let dt = config.dt;
    let half_dt = 0.5 * dt;
    let collision_radius_sq = config.collision_radius * config.collision_radius;
    let escape_radius_sq = config.escape_radius * config.escape_radius;
    let shells = Some((planet_rh, config.encounter_r1, config.encounter_r2));

    let planet_r = pl.logged_r(timestep);
    let h0 = pl.h0_log[timestep];

    let acc0 = forces::helio_acc_particle(
        &pl.m,
        planet_r,
        h0,
        pa.r[particle],
        collision_radius_sq,
        escape_radius_sq,
        shells,
    );
    pa.v[particle] += acc0.accel * half_dt;

    drift_single(dt, pl.m[0], &mut pa.r[particle], &mut pa.v[particle])?;

    let acc1 = forces::helio_acc_particle(
        &pl.m,
        planet_r,
        h0,
        pa.r[particle],
        collision_radius_sq,
        escape_radius_sq,
        shells,
    );
    if acc1.flags != 0 {
        pa.kill(particle, acc1.flags, time);
        return Ok(());
    }
    pa.v[particle] += acc1.accel * half_dt;

    if acc1.encounter_level > 0 {
        state.planet = acc1.encounter_planet;
        state.level = acc1.encounter_level;
    }

    Ok(())
}
