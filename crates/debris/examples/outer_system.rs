//! Outer-planet system with a ring of test particles.
//!
//! Demonstrates the timeblock driver loop and the conservation
//! diagnostics, and reports how many particles survive.
//!
//! Run with: cargo run --package debris --example outer_system

use nalgebra::Vector3;

use debris::{
    calculate_planet_metrics, Configuration, Integrator, ParticleState, PlanetState, WhIntegrator,
};

fn main() {
    let sun_mass = 1.0;
    let jupiter_mass = 9.54e-4;
    let saturn_mass = 2.86e-4;

    let mut pl = PlanetState::new(
        vec![sun_mass, jupiter_mass, saturn_mass],
        vec![
            Vector3::zeros(),
            Vector3::new(5.2, 0.0, 0.0),
            Vector3::new(0.0, 9.58, 0.0),
        ],
        vec![
            Vector3::zeros(),
            Vector3::new(0.0, ((sun_mass + jupiter_mass) / 5.2f64).sqrt(), 0.0),
            Vector3::new(
                -((sun_mass + jupiter_mass + saturn_mass) / 9.58f64).sqrt(),
                0.0,
                0.0,
            ),
        ],
    );

    // A ring of particles between the two planets.
    let n_particles = 64;
    let mut r = Vec::with_capacity(n_particles);
    let mut v = Vec::with_capacity(n_particles);
    for k in 0..n_particles {
        let radius = 6.5 + 1.5 * (k as f64) / (n_particles as f64);
        let angle = std::f64::consts::TAU * (k as f64) / (n_particles as f64);
        let v_circ = (sun_mass / radius).sqrt();
        r.push(Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
        v.push(Vector3::new(-v_circ * angle.sin(), v_circ * angle.cos(), 0.0));
    }
    let mut pa = ParticleState::new(r, v);

    let config = Configuration {
        dt: 0.5,
        tbsize: 100,
        resolve_encounters: true,
        ..Configuration::default()
    };
    let mut integrator = WhIntegrator::new(&mut pl, &mut pa, &config);

    let before = calculate_planet_metrics(&pl);
    println!("N-body test particle run");
    println!("{}", "=".repeat(60));
    println!("Planets: {}   particles: {}", pl.n_alive - 1, pa.n());
    println!("Initial energy: {:.12e}", before.energy);

    let blocks = 50;
    let block_time = config.tbsize as f64 * config.dt;
    let mut t = 0.0;
    for block in 0..blocks {
        integrator
            .integrate_planets_timeblock(&mut pl, t)
            .expect("planet step failed");
        let n_particles = pa.n();
        integrator
            .integrate_particles_timeblock(&pl, &mut pa, 0, n_particles, t)
            .expect("particle step failed");
        t += block_time;

        if (block + 1) % 10 == 0 {
            let metrics = calculate_planet_metrics(&pl);
            let drift = ((metrics.energy - before.energy) / before.energy).abs();
            println!(
                "t = {:8.1}  alive = {:3}  |dE/E| = {:.2e}",
                t,
                pa.n_alive(),
                drift
            );
        }
    }

    let after = calculate_planet_metrics(&pl);
    let l_drift = (after.angular_momentum - before.angular_momentum).norm()
        / before.angular_momentum.norm();
    println!("{}", "=".repeat(60));
    println!("Final energy drift:  {:.2e}", ((after.energy - before.energy) / before.energy).abs());
    println!("Angular momentum drift: {:.2e}", l_drift);
    println!("Survivors: {}/{}", pa.n_alive(), pa.n());
}
