use nalgebra::Vector3;

use crate::dynamics::state::{KinematicState, ParachuteState, VehicleState};
use crate::physics::aerodynamics::drag_force;
use crate::physics::atmosphere::Atmosphere;
use crate::physics::gravity::gravity_force;
use crate::vehicle::LanderSpec;

// ---------------------------------------------------------------------------
// Force model (3DOF point mass)
// ---------------------------------------------------------------------------

/// Instantaneous forces acting on the lander, planet frame, N.
#[derive(Debug, Clone, Copy)]
pub struct Forces {
    pub gravity: Vector3<f64>,
    pub lander_drag: Vector3<f64>,
    pub chute_drag: Vector3<f64>,   // exactly zero unless the chute is deployed
    pub thrust: Vector3<f64>,
    pub mass: f64,                  // kg, mass the forces were evaluated for
}

impl Forces {
    pub fn drag(&self) -> Vector3<f64> {
        self.lander_drag + self.chute_drag
    }

    pub fn total(&self) -> Vector3<f64> {
        self.gravity + self.lander_drag + self.chute_drag + self.thrust
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.total() / self.mass
    }
}

/// Evaluate every force term for an explicit state.
///
/// Forces modeled:
///   1. Gravity: inverse-square, toward the planet centre
///   2. Lander drag: quadratic, opposing velocity, area π·size²
///   3. Parachute drag: only while deployed, area 20·size²
///   4. Thrust: precomputed world-frame vector
pub fn force_breakdown(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    mass: f64,
    parachute: ParachuteState,
    thrust: &Vector3<f64>,
    lander: &LanderSpec,
    atmosphere: &dyn Atmosphere,
) -> Forces {
    let density = atmosphere.density(pos.norm() - crate::physics::MARS_RADIUS);

    let chute_drag = if parachute == ParachuteState::Deployed {
        drag_force(vel, density, lander.drag_coef_chute, lander.chute_area())
    } else {
        Vector3::zeros()
    };

    Forces {
        gravity: gravity_force(pos, mass),
        lander_drag: drag_force(vel, density, lander.drag_coef_lander, lander.lander_area()),
        chute_drag,
        thrust: *thrust,
        mass,
    }
}

/// Engine thrust along the lander's body +Z axis. Zero once the tank is dry.
pub fn thrust_force(vehicle: &VehicleState, lander: &LanderSpec) -> Vector3<f64> {
    if vehicle.fuel <= 0.0 {
        return Vector3::zeros();
    }
    vehicle.thrust_axis() * (vehicle.throttle * lander.max_thrust)
}

/// Forces for the current simulation state. Mass is recomputed from the
/// current fuel fraction on every call.
pub fn forces(
    kin: &KinematicState,
    vehicle: &VehicleState,
    lander: &LanderSpec,
    atmosphere: &dyn Atmosphere,
) -> Forces {
    force_breakdown(
        &kin.pos,
        &kin.vel,
        lander.mass(vehicle.fuel),
        vehicle.parachute,
        &thrust_force(vehicle, lander),
        lander,
        atmosphere,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
