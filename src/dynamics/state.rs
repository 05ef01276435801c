use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::physics::gravity::MARS_RADIUS;

// ---------------------------------------------------------------------------
// Kinematic state: planet-centred position and velocity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct KinematicState {
    pub time: f64,            // s
    pub pos: Vector3<f64>,    // m, planet-centred Cartesian
    pub vel: Vector3<f64>,    // m/s
}

impl KinematicState {
    pub fn new(pos: Vector3<f64>, vel: Vector3<f64>) -> Self {
        Self { time: 0.0, pos, vel }
    }

    /// Height above the mean planetary radius, m.
    pub fn altitude(&self) -> f64 {
        self.pos.norm() - MARS_RADIUS
    }

    /// Local vertical (unit vector pointing away from the planet centre).
    pub fn up(&self) -> Vector3<f64> {
        self.pos.normalize()
    }

    /// Radial velocity component. Negative while approaching the planet.
    pub fn closing_rate(&self) -> f64 {
        self.vel.dot(&self.up())
    }

    /// Velocity component tangential to the surface, m/s.
    pub fn ground_speed(&self) -> f64 {
        (self.vel - self.closing_rate() * self.up()).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.pos.iter().all(|c| c.is_finite()) && self.vel.iter().all(|c| c.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Vehicle state: discrete modes and control inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParachuteState {
    #[default]
    NotDeployed,
    Deployed,
    Lost,
}

#[derive(Debug, Clone)]
pub struct VehicleState {
    pub fuel: f64,                          // fraction of capacity, [0, 1]
    pub parachute: ParachuteState,
    pub throttle: f64,                      // [0, 1]
    pub autopilot_enabled: bool,
    pub stabilized_attitude: bool,
    pub attitude: UnitQuaternion<f64>,      // body -> planet frame
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            fuel: 1.0,
            parachute: ParachuteState::NotDeployed,
            throttle: 0.0,
            autopilot_enabled: false,
            stabilized_attitude: false,
            attitude: UnitQuaternion::identity(),
        }
    }
}

impl VehicleState {
    /// Body +Z axis (engine thrust axis) in the planet frame.
    pub fn thrust_axis(&self) -> Vector3<f64> {
        self.attitude * Vector3::z()
    }
}

// ---------------------------------------------------------------------------
// Recorded trajectory point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub time: f64,
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub throttle: f64,
    pub fuel: f64,
    pub parachute: ParachuteState,
    /// Ambient density of the run's atmosphere model, kg/m^3.
    pub density: f64,
}

impl Snapshot {
    pub fn capture(kin: &KinematicState, vehicle: &VehicleState, density: f64) -> Self {
        Self {
            time: kin.time,
            pos: kin.pos,
            vel: kin.vel,
            throttle: vehicle.throttle,
            fuel: vehicle.fuel,
            parachute: vehicle.parachute,
            density,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.pos.norm() - MARS_RADIUS
    }

    pub fn closing_rate(&self) -> f64 {
        self.vel.dot(&self.pos.normalize())
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,           // 10 Hz, fixed for every preset scenario
            max_time: 3600.0,  // 1 h ceiling
        }
    }
}
