use nalgebra::Vector3;

use crate::state::{
    collision_flags, ParticleState, PlanetState, DEATH_COLLISION, DEATH_ESCAPE,
};

fn particles(n: usize) -> ParticleState {
    let r = (0..n)
        .map(|i| Vector3::new(1.0 + i as f64, 0.0, 0.0))
        .collect();
    let v = vec![Vector3::new(0.0, 0.5, 0.0); n];
    ParticleState::new(r, v)
}

#[test]
fn collision_flags_encode_planet_in_high_byte() {
    assert_eq!(collision_flags(1), 0x0101);
    assert_eq!(collision_flags(3), 0x0301);
    assert_eq!(collision_flags(3) & 0x00ff, DEATH_COLLISION);
}

#[test]
fn killer_planet_decodes_high_byte() {
    let mut pa = particles(2);
    pa.kill(0, collision_flags(2), 4.5);

    assert_eq!(pa.killer_planet(0), Some(2));
    assert_eq!(pa.killer_planet(1), None);
}

#[test]
fn deathtime_stamps_first_flag_only() {
    let mut pa = particles(1);

    pa.kill(0, DEATH_ESCAPE, 3.0);
    assert_eq!(pa.deathtime[0], 3.0);
    assert!(!pa.is_alive(0));

    // A later flag accumulates but does not restamp the time.
    pa.kill(0, collision_flags(1), 9.0);
    assert_eq!(pa.deathtime[0], 3.0);
    assert_eq!(pa.deathflags[0], DEATH_ESCAPE | collision_flags(1));
}

#[test]
fn death_flags_are_monotone() {
    let mut pa = particles(1);
    let mut seen = 0u16;

    pa.kill(0, DEATH_ESCAPE, 1.0);
    assert_eq!(pa.deathflags[0] & seen, seen);
    seen = pa.deathflags[0];

    pa.kill(0, collision_flags(2), 2.0);
    assert_eq!(pa.deathflags[0] & seen, seen);
}

#[test]
fn stable_partition_moves_alive_to_front() {
    let mut pa = particles(5);
    pa.kill(1, DEATH_ESCAPE, 1.0);
    pa.kill(3, collision_flags(1), 2.0);

    let indices = pa.stable_partition_alive(0, 5);

    // Alive prefix in original order, dead suffix in original order.
    assert_eq!(indices, vec![0, 2, 4, 1, 3]);
    assert!(pa.is_alive(0) && pa.is_alive(1) && pa.is_alive(2));
    assert!(!pa.is_alive(3) && !pa.is_alive(4));

    // The payload moved with the flags.
    assert_eq!(pa.r[1].x, 3.0);
    assert_eq!(pa.r[3].x, 2.0);
    assert_eq!(pa.deathtime[3], 1.0);
}

#[test]
fn stable_partition_respects_range() {
    let mut pa = particles(6);
    pa.kill(2, DEATH_ESCAPE, 1.0);

    let indices = pa.stable_partition_alive(2, 3);

    assert_eq!(indices, vec![3, 4, 2]);
    // Outside the range nothing moved.
    assert_eq!(pa.r[0].x, 1.0);
    assert_eq!(pa.r[5].x, 6.0);
}

#[test]
fn planet_logs_have_block_layout() {
    let m = vec![1.0, 1e-3, 2e-3];
    let r = vec![
        Vector3::zeros(),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, 0.0),
    ];
    let v = vec![
        Vector3::zeros(),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.7, 0.0),
    ];
    let mut pl = PlanetState::new(m, r, v);
    pl.prepare_logs(4);

    assert_eq!(pl.r_log.len(), 2 * 4);
    assert_eq!(pl.h0_log.len(), 4);

    pl.h0 = Vector3::new(0.0, 0.0, 1.0);
    pl.record_step(2);

    let logged = pl.logged_r(2);
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].x, 1.0);
    assert_eq!(logged[1].x, 2.0);
    assert_eq!(pl.h0_log[2].z, 1.0);
    // Other timesteps untouched.
    assert_eq!(pl.logged_r(0)[0].x, 0.0);
}

#[test]
#[should_panic(expected = "masses must be positive")]
fn zero_mass_is_rejected() {
    PlanetState::new(
        vec![1.0, 0.0],
        vec![Vector3::zeros(); 2],
        vec![Vector3::zeros(); 2],
    );
}

#[test]
fn n_alive_counts_unflagged_particles() {
    let mut pa = particles(4);
    assert_eq!(pa.n_alive(), 4);
    pa.kill(2, DEATH_ESCAPE, 0.5);
    assert_eq!(pa.n_alive(), 3);
}
