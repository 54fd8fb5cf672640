//! Phase-space state for massive planets and massless test particles.
//!
//! Both populations are stored struct-of-arrays: parallel `Vec`s indexed
//! by body. The integrator borrows these mutably for the duration of a
//! step; the per-block planet logs are written by the planet step and
//! only read afterward.

use nalgebra::Vector3;

/// Low byte of `deathflags`: the particle hit a planet. The high byte
/// holds the index of the colliding planet.
pub const DEATH_COLLISION: u16 = 0x0001;

/// Low byte of `deathflags`: the particle left the escape radius.
pub const DEATH_ESCAPE: u16 = 0x0002;

/// Death flags for a collision with planet `planet`.
pub fn collision_flags(planet: usize) -> u16 {
    ((planet as u16) << 8) | DEATH_COLLISION
}

/// The massive bodies. Body 0 is the central mass; in heliocentric
/// representation its coordinates are zero by construction.
///
/// Alive bodies occupy the prefix `0..n_alive`.
#[derive(Debug, Clone)]
pub struct PlanetState {
    /// Masses (solar masses, all positive).
    pub m: Vec<f64>,
    /// Heliocentric positions (AU).
    pub r: Vec<Vector3<f64>>,
    /// Heliocentric velocities.
    pub v: Vec<Vector3<f64>>,
    /// Number of alive bodies, including the central mass.
    pub n_alive: usize,

    /// Reference heliocentric acceleration from the most recent planet
    /// acceleration pass; consumed by particles before any log exists.
    pub h0: Vector3<f64>,

    /// Per-block position log: `n_alive - 1` entries per timestep
    /// (planets 1.., the central body is pinned at the origin).
    pub r_log: Vec<Vector3<f64>>,
    /// Per-block velocity log, same layout as `r_log`.
    pub v_log: Vec<Vector3<f64>>,
    /// Per-block reference acceleration, one entry per timestep.
    pub h0_log: Vec<Vector3<f64>>,

    tbsize: usize,
}

impl PlanetState {
    /// Creates a planet state from parallel mass/position/velocity
    /// arrays. Coordinates may be barycentric or heliocentric; the
    /// integrator converts to heliocentric at construction.
    ///
    /// # Panics
    ///
    /// Panics if the arrays disagree in length or any mass is not
    /// positive.
    pub fn new(m: Vec<f64>, r: Vec<Vector3<f64>>, v: Vec<Vector3<f64>>) -> Self {
        assert_eq!(m.len(), r.len(), "mass/position length mismatch");
        assert_eq!(m.len(), v.len(), "mass/velocity length mismatch");
        assert!(!m.is_empty(), "need at least a central body");
        assert!(m.iter().all(|&mass| mass > 0.0), "masses must be positive");

        let n_alive = m.len();
        Self {
            m,
            r,
            v,
            n_alive,
            h0: Vector3::zeros(),
            r_log: Vec::new(),
            v_log: Vec::new(),
            h0_log: Vec::new(),
            tbsize: 0,
        }
    }

    /// Total number of bodies, alive or not.
    pub fn n(&self) -> usize {
        self.m.len()
    }

    pub fn total_mass(&self) -> f64 {
        self.m[..self.n_alive].iter().sum()
    }

    /// Sizes the per-block logs for `tbsize` timesteps.
    pub(crate) fn prepare_logs(&mut self, tbsize: usize) {
        self.tbsize = tbsize;
        let width = self.n_alive - 1;
        self.r_log.resize(width * tbsize, Vector3::zeros());
        self.v_log.resize(width * tbsize, Vector3::zeros());
        self.h0_log.resize(tbsize, Vector3::zeros());
    }

    /// Logged positions of planets `1..n_alive` at a timestep.
    pub fn logged_r(&self, timestep: usize) -> &[Vector3<f64>] {
        let width = self.n_alive - 1;
        &self.r_log[width * timestep..width * (timestep + 1)]
    }

    /// Logged velocities of planets `1..n_alive` at a timestep.
    pub fn logged_v(&self, timestep: usize) -> &[Vector3<f64>] {
        let width = self.n_alive - 1;
        &self.v_log[width * timestep..width * (timestep + 1)]
    }

    /// Appends the current positions, velocities, and h0 to the logs.
    /// Called exactly once per timestep by the planet step.
    pub(crate) fn record_step(&mut self, timestep: usize) {
        let width = self.n_alive - 1;
        let offset = width * timestep;
        self.r_log[offset..offset + width].copy_from_slice(&self.r[1..self.n_alive]);
        self.v_log[offset..offset + width].copy_from_slice(&self.v[1..self.n_alive]);
        self.h0_log[timestep] = self.h0;
    }
}

/// The massless test particles.
///
/// A particle is alive iff `deathflags == 0`. Flags are monotone: once a
/// bit is set it is never cleared, and `deathtime` records the
/// simulation time at which the first flag appeared.
#[derive(Debug, Clone, Default)]
pub struct ParticleState {
    /// Heliocentric positions (AU).
    pub r: Vec<Vector3<f64>>,
    /// Heliocentric velocities.
    pub v: Vec<Vector3<f64>>,
    /// Death bitset: low byte is the cause ([`DEATH_COLLISION`],
    /// [`DEATH_ESCAPE`]), high byte the colliding planet index.
    pub deathflags: Vec<u16>,
    /// Simulation time of the first death flag.
    pub deathtime: Vec<f64>,
}

impl ParticleState {
    pub fn new(r: Vec<Vector3<f64>>, v: Vec<Vector3<f64>>) -> Self {
        assert_eq!(r.len(), v.len(), "position/velocity length mismatch");
        let n = r.len();
        Self {
            r,
            v,
            deathflags: vec![0; n],
            deathtime: vec![0.0; n],
        }
    }

    pub fn n(&self) -> usize {
        self.r.len()
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.deathflags[index] == 0
    }

    pub fn n_alive(&self) -> usize {
        self.deathflags.iter().filter(|&&flags| flags == 0).count()
    }

    /// Index of the planet a dead particle collided with, if any.
    pub fn killer_planet(&self, index: usize) -> Option<usize> {
        let flags = self.deathflags[index];
        (flags & DEATH_COLLISION != 0).then(|| (flags >> 8) as usize)
    }

    /// ORs `flags` into the particle's death bitset, stamping
    /// `deathtime` if this is the first flag.
    pub(crate) fn kill(&mut self, index: usize, flags: u16, time: f64) {
        debug_assert_ne!(flags, 0);
        if self.deathflags[index] == 0 {
            self.deathtime[index] = time;
        }
        self.deathflags[index] |= flags;
    }

    /// Stably reorders the range `[begin, begin + length)` so that alive
    /// particles occupy its prefix, and returns the permutation applied:
    /// entry `k` is the old index of the particle now at `begin + k`.
    ///
    /// The integrator's per-particle working arrays must be reordered
    /// with the same permutation (see `Integrator::gather_particles`).
    pub fn stable_partition_alive(&mut self, begin: usize, length: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (begin..begin + length)
            .filter(|&i| self.is_alive(i))
            .collect();
        indices.extend((begin..begin + length).filter(|&i| !self.is_alive(i)));

        gather(&mut self.r, &indices, begin);
        gather(&mut self.v, &indices, begin);
        gather(&mut self.deathflags, &indices, begin);
        gather(&mut self.deathtime, &indices, begin);

        indices
    }
}

/// Applies a gather permutation in place: `data[begin + k] =
/// old_data[indices[k]]`.
pub(crate) fn gather<T: Copy>(data: &mut [T], indices: &[usize], begin: usize) {
    let scratch: Vec<T> = indices.iter().map(|&i| data[i]).collect();
    data[begin..begin + scratch.len()].copy_from_slice(&scratch);
}
