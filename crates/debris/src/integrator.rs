//! The Wisdom-Holman integrator.
//!
//! `WhIntegrator` owns every working array (sized at construction to
//! the larger population and reused across steps) and borrows the
//! planet and particle state mutably only for the duration of a step
//! call. Planets advance serially in Jacobi coordinates; particles
//! advance independently of one another against the logged planet
//! trajectory, so their loops parallelize under the `parallel` feature
//! without changing results for a fixed partition.

use nalgebra::Vector3;

use keplerian::{drift, Result};

use crate::config::Configuration;
use crate::encounter::{self, EncounterState};
use crate::forces;
use crate::frames;
use crate::state::{gather, ParticleState, PlanetState};

/// The capability set an integrator offers the driver.
///
/// Implementations advance planets a block at a time, then particles in
/// ranges against the logged planet trajectory, and keep their
/// per-particle working arrays aligned when the driver compacts the
/// particle population.
///
/// # Examples
///
/// ```
/// use debris::{Configuration, Integrator, ParticleState, PlanetState, WhIntegrator};
/// use nalgebra::Vector3;
///
/// // Sun + Jupiter, one test particle on an interior circular orbit.
/// let mut pl = PlanetState::new(
///     vec![1.0, 9.54e-4],
///     vec![Vector3::zeros(), Vector3::new(5.2, 0.0, 0.0)],
///     vec![Vector3::zeros(), Vector3::new(0.0, (1.000954f64 / 5.2).sqrt(), 0.0)],
/// );
/// let mut pa = ParticleState::new(
///     vec![Vector3::new(3.0, 0.0, 0.0)],
///     vec![Vector3::new(0.0, (1.0f64 / 3.0).sqrt(), 0.0)],
/// );
/// let config = Configuration::default();
/// let mut integrator = WhIntegrator::new(&mut pl, &mut pa, &config);
///
/// integrator.integrate_planets_timeblock(&mut pl, 0.0).unwrap();
/// integrator.integrate_particles_timeblock(&pl, &mut pa, 0, 1, 0.0).unwrap();
/// assert!(pa.is_alive(0));
/// ```
pub trait Integrator: Send + Sync {
    /// Advance planets by one time block of `tbsize` steps starting at
    /// time `t`. On return the planet logs cover the whole block.
    fn integrate_planets_timeblock(&mut self, pl: &mut PlanetState, t: f64) -> Result<()>;

    /// Advance particles `[begin, begin + length)` through the block
    /// whose planet logs were just populated.
    fn integrate_particles_timeblock(
        &mut self,
        pl: &PlanetState,
        pa: &mut ParticleState,
        begin: usize,
        length: usize,
        t: f64,
    ) -> Result<()>;

    /// Reorder per-particle working arrays to match a gather the driver
    /// applied to the particle state (see
    /// [`ParticleState::stable_partition_alive`]).
    fn gather_particles(&mut self, indices: &[usize], begin: usize, length: usize);
}

/// Wisdom-Holman mixed-variable symplectic integrator.
pub struct WhIntegrator {
    config: Configuration,

    /// Cumulative-mass prefix over the planet masses.
    eta: Vec<f64>,
    /// Jacobi coordinates of the planets.
    planet_rj: Vec<Vector3<f64>>,
    planet_vj: Vec<Vector3<f64>>,
    planet_a: Vec<Vector3<f64>>,
    /// Per-planet Hill radii, refreshed each planet block.
    planet_rh: Vec<f64>,
    inverse_helio_cubed: Vec<f64>,
    inverse_jacobi_cubed: Vec<f64>,

    /// Per-body gravitational parameters for the drift, sized to the
    /// larger population.
    mu: Vec<f64>,
    /// Drift skip mask, sized to the larger population.
    skip: Vec<bool>,

    particle_a: Vec<Vector3<f64>>,
    /// Transient encounter state; `Some` while a particle is being
    /// substepped against a planet.
    encounter: Vec<Option<EncounterState>>,
}

impl WhIntegrator {
    /// Builds the integrator and initializes the system: converts the
    /// planets (and particles) to heliocentric coordinates, computes the
    /// initial Jacobi coordinates and accelerations, and flags particles
    /// born inside a collision or escape region.
    ///
    /// After construction the opening kick of the first step is
    /// well-defined.
    pub fn new(pl: &mut PlanetState, pa: &mut ParticleState, config: &Configuration) -> Self {
        let n_pl = pl.n();
        let n_pa = pa.n();
        let n_max = n_pl.max(n_pa);

        let mut integrator = Self {
            config: config.clone(),
            eta: frames::eta(&pl.m),
            planet_rj: vec![Vector3::zeros(); n_pl],
            planet_vj: vec![Vector3::zeros(); n_pl],
            planet_a: vec![Vector3::zeros(); n_pl],
            planet_rh: vec![0.0; n_pl],
            inverse_helio_cubed: vec![0.0; n_pl],
            inverse_jacobi_cubed: vec![0.0; n_pl],
            mu: vec![0.0; n_max],
            skip: vec![false; n_max],
            particle_a: vec![Vector3::zeros(); n_pa],
            encounter: vec![None; n_pa],
        };

        frames::to_helio(pl, pa);
        pl.prepare_logs(config.tbsize);

        frames::helio_to_jacobi_r_planets(
            &pl.r,
            &pl.m,
            &integrator.eta,
            &mut integrator.planet_rj,
            pl.n_alive,
        );
        frames::helio_to_jacobi_v_planets(
            &pl.v,
            &pl.m,
            &integrator.eta,
            &mut integrator.planet_vj,
            pl.n_alive,
        );

        pl.h0 = forces::helio_acc_planets(
            &pl.m,
            &pl.r,
            &integrator.planet_rj,
            &integrator.eta,
            pl.n_alive,
            &mut integrator.inverse_helio_cubed,
            &mut integrator.inverse_jacobi_cubed,
            &mut integrator.planet_a,
        );

        integrator.refresh_hill_radii(pl);
        integrator.accelerate_particles(pa, 0, n_pa, &pl.m, &pl.r[1..pl.n_alive], pl.h0, 0.0, 0);

        integrator
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Whether a particle is currently being substepped through an
    /// encounter.
    pub fn particle_in_encounter(&self, index: usize) -> bool {
        self.encounter[index].is_some()
    }

    fn refresh_hill_radii(&mut self, pl: &PlanetState) {
        for i in 1..pl.n_alive {
            self.planet_rh[i] = forces::hill_radius(pl.m[i], pl.r[i].norm(), pl.m[0]);
        }
    }

    /// One planet kick-drift-kick step, recording this timestep's log
    /// entries.
    fn step_planets(&mut self, pl: &mut PlanetState, timestep: usize) -> Result<()> {
        let dt = self.config.dt;
        let half_dt = 0.5 * dt;
        let n = pl.n_alive;

        for i in 1..n {
            pl.v[i] += self.planet_a[i] * half_dt;
        }

        frames::helio_to_jacobi_v_planets(&pl.v, &pl.m, &self.eta, &mut self.planet_vj, n);

        // Each Jacobi Kepler problem has its own central mass.
        for i in 1..n {
            self.mu[i] = pl.m[0] * self.eta[i] / self.eta[i - 1];
        }

        drift(
            dt,
            &self.mu,
            &mut self.planet_rj,
            &mut self.planet_vj,
            1,
            n - 1,
            None,
        )?;

        frames::jacobi_to_helio_planets(
            &self.planet_rj,
            &self.planet_vj,
            &pl.m,
            &self.eta,
            &mut pl.r,
            &mut pl.v,
            n,
        );

        pl.h0 = forces::helio_acc_planets(
            &pl.m,
            &pl.r,
            &self.planet_rj,
            &self.eta,
            n,
            &mut self.inverse_helio_cubed,
            &mut self.inverse_jacobi_cubed,
            &mut self.planet_a,
        );
        pl.record_step(timestep);

        for i in 1..n {
            pl.v[i] += self.planet_a[i] * half_dt;
        }

        Ok(())
    }

    /// One particle kick-drift-kick step against the logged planet
    /// trajectory at `timestep`. Dead and in-encounter particles are
    /// frozen; particles dying in the acceleration pass do not receive
    /// the closing kick.
    fn step_particles(
        &mut self,
        pl: &PlanetState,
        pa: &mut ParticleState,
        begin: usize,
        length: usize,
        time: f64,
        timestep: usize,
    ) -> Result<()> {
        let dt = self.config.dt;
        let half_dt = 0.5 * dt;
        let end = begin + length;

        for i in begin..end {
            self.skip[i] = pa.deathflags[i] != 0 || self.encounter[i].is_some();
            if !self.skip[i] {
                pa.v[i] += self.particle_a[i] * half_dt;
                self.mu[i] = pl.m[0];
            }
        }

        drift(dt, &self.mu, &mut pa.r, &mut pa.v, begin, length, Some(&self.skip))?;

        self.accelerate_particles(
            pa,
            begin,
            length,
            &pl.m,
            pl.logged_r(timestep),
            pl.h0_log[timestep],
            time,
            timestep + 1,
        );

        for i in begin..end {
            if !self.skip[i] && pa.deathflags[i] == 0 {
                pa.v[i] += self.particle_a[i] * half_dt;
            }
        }

        Ok(())
    }

    /// Computes particle accelerations over `[begin, begin + length)`
    /// against the given planet positions, recording deaths and
    /// encounter-shell crossings. `resume_at` is stored on fresh
    /// encounter states so catch-up knows where to start.
    #[allow(clippy::too_many_arguments)]
    fn accelerate_particles(
        &mut self,
        pa: &mut ParticleState,
        begin: usize,
        length: usize,
        planet_m: &[f64],
        planet_r: &[Vector3<f64>],
        h0: Vector3<f64>,
        time: f64,
        resume_at: usize,
    ) {
        let collision_radius_sq = self.config.collision_radius * self.config.collision_radius;
        let escape_radius_sq = self.config.escape_radius * self.config.escape_radius;
        let resolve = self.config.resolve_encounters;
        let (r1, r2) = (self.config.encounter_r1, self.config.encounter_r2);

        let end = begin + length;
        let planet_rh = &self.planet_rh;
        let a_slice = &mut self.particle_a[begin..end];
        let enc_slice = &mut self.encounter[begin..end];
        let r_slice = &pa.r[begin..end];
        let flag_slice = &mut pa.deathflags[begin..end];
        let time_slice = &mut pa.deathtime[begin..end];

        let pass = |index: usize,
                    r: &Vector3<f64>,
                    accel: &mut Vector3<f64>,
                    flags: &mut u16,
                    deathtime: &mut f64,
                    enc: &mut Option<EncounterState>| {
            if *flags != 0 || enc.is_some() {
                return;
            }

            let shells = if resolve {
                Some((planet_rh.as_slice(), r1, r2))
            } else {
                None
            };
            let result = forces::helio_acc_particle(
                planet_m,
                planet_r,
                h0,
                *r,
                collision_radius_sq,
                escape_radius_sq,
                shells,
            );
            *accel = result.accel;

            if result.flags != 0 {
                *deathtime = time;
                *flags |= result.flags;
                tracing::debug!(particle = index, flags = result.flags, time, "particle death");
            } else if result.encounter_level > 0 {
                *enc = Some(EncounterState {
                    planet: result.encounter_planet,
                    level: result.encounter_level,
                    resume_at,
                });
                tracing::debug!(
                    particle = index,
                    planet = result.encounter_planet,
                    level = result.encounter_level,
                    "encounter shell crossed"
                );
            }
        };

        #[cfg(not(feature = "parallel"))]
        {
            let items = r_slice
                .iter()
                .zip(a_slice.iter_mut())
                .zip(flag_slice.iter_mut())
                .zip(time_slice.iter_mut())
                .zip(enc_slice.iter_mut())
                .enumerate();
            for (offset, ((((r, accel), flags), deathtime), enc)) in items {
                pass(begin + offset, r, accel, flags, deathtime, enc);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            r_slice
                .par_iter()
                .zip(a_slice.par_iter_mut())
                .zip(flag_slice.par_iter_mut())
                .zip(time_slice.par_iter_mut())
                .zip(enc_slice.par_iter_mut())
                .enumerate()
                .for_each(|(offset, ((((r, accel), flags), deathtime), enc))| {
                    pass(begin + offset, r, accel, flags, deathtime, enc);
                });
        }
    }

    /// Runs encounter catch-up for every flagged particle in the range,
    /// clearing the transient state of particles that re-emerged or
    /// died. Survivors still inside a shell resume from the top of the
    /// next block.
    fn resolve_encounters_timeblock(
        &mut self,
        pl: &PlanetState,
        pa: &mut ParticleState,
        begin: usize,
        length: usize,
        t: f64,
    ) -> Result<()> {
        for i in begin..begin + length {
            let Some(mut state) = self.encounter[i].take() else {
                continue;
            };

            let emerged = encounter::integrate_encounter_particle_catchup(
                pl,
                pa,
                i,
                &mut state,
                t,
                &self.config,
                &self.planet_rh,
            )?;

            if emerged || pa.deathflags[i] != 0 {
                tracing::debug!(particle = i, emerged, "encounter finished");
            } else {
                state.resume_at = 0;
                self.encounter[i] = Some(state);
            }
        }
        Ok(())
    }
}

impl Integrator for WhIntegrator {
    fn integrate_planets_timeblock(&mut self, pl: &mut PlanetState, t: f64) -> Result<()> {
        self.refresh_hill_radii(pl);
        for timestep in 0..self.config.tbsize {
            self.step_planets(pl, timestep).map_err(|err| {
                tracing::error!(timestep, t, %err, "planet step failed");
                err
            })?;
        }
        Ok(())
    }

    fn integrate_particles_timeblock(
        &mut self,
        pl: &PlanetState,
        pa: &mut ParticleState,
        begin: usize,
        length: usize,
        t: f64,
    ) -> Result<()> {
        for timestep in 0..self.config.tbsize {
            let time = t + self.config.dt * (timestep as f64 + 1.0);
            self.step_particles(pl, pa, begin, length, time, timestep)?;
        }

        if self.config.resolve_encounters {
            self.resolve_encounters_timeblock(pl, pa, begin, length, t)?;
        }

        Ok(())
    }

    fn gather_particles(&mut self, indices: &[usize], begin: usize, length: usize) {
        assert_eq!(indices.len(), length, "gather length mismatch");
        gather(&mut self.particle_a, indices, begin);
        gather(&mut self.encounter, indices, begin);
    }
}
