use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::physics::gravity::{MARS_RADIUS, MU_MARS};

/// Classical Keplerian orbital elements about Mars.
#[derive(Debug, Clone, Copy)]
pub struct KeplerianElements {
    pub sma: f64,       // semi-major axis, m (negative for hyperbolic)
    pub ecc: f64,       // eccentricity (0 = circular)
    pub inc: f64,       // inclination, rad
    pub raan: f64,      // right ascension of ascending node, rad
    pub argp: f64,      // argument of periapsis, rad
    pub true_anom: f64, // true anomaly, rad
}

impl KeplerianElements {
    /// Convert a planet-centred state vector to Keplerian elements.
    pub fn from_state_vector(pos: &Vector3<f64>, vel: &Vector3<f64>) -> Self {
        let mu = MU_MARS;
        let r = pos.norm();
        let v = vel.norm();

        // Angular momentum
        let h = pos.cross(vel);
        let h_mag = h.norm();

        // Node vector
        let n = Vector3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();

        // Eccentricity vector
        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        let energy = 0.5 * v * v - mu / r;
        let sma = -mu / (2.0 * energy);

        let inc = if h_mag > 0.0 {
            (h.z / h_mag).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let raan = if n_mag > 1e-10 {
            let r = (n.x / n_mag).clamp(-1.0, 1.0).acos();
            if n.y < 0.0 { 2.0 * PI - r } else { r }
        } else {
            0.0
        };

        let argp = if n_mag > 1e-10 && ecc > 1e-10 {
            let w = (n.dot(&e_vec) / (n_mag * ecc)).clamp(-1.0, 1.0).acos();
            if e_vec.z < 0.0 { 2.0 * PI - w } else { w }
        } else {
            0.0
        };

        let true_anom = if ecc > 1e-10 {
            let nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0).acos();
            if pos.dot(vel) < 0.0 { 2.0 * PI - nu } else { nu }
        } else {
            0.0
        };

        KeplerianElements { sma, ecc, inc, raan, argp, true_anom }
    }

    /// Negative specific energy. Radial trajectories have `ecc == 1` yet may be bound.
    pub fn is_bound(&self) -> bool {
        self.sma > 0.0
    }

    /// Orbital period (s). `None` for escape trajectories.
    pub fn period(&self) -> Option<f64> {
        self.is_bound()
            .then(|| 2.0 * PI * (self.sma.powi(3) / MU_MARS).sqrt())
    }

    /// Closest approach above the mean surface, m.
    pub fn periapsis_altitude(&self) -> f64 {
        self.sma * (1.0 - self.ecc) - MARS_RADIUS
    }

    /// Farthest point above the mean surface, m. `None` if unbound.
    pub fn apoapsis_altitude(&self) -> Option<f64> {
        self.is_bound().then(|| self.sma * (1.0 + self.ecc) - MARS_RADIUS)
    }
}
