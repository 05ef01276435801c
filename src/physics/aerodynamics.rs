use nalgebra::Vector3;

/// Quadratic drag force opposing `vel`: `-½ ρ |v|² v̂ · cd · area`.
///
/// Zero velocity yields zero drag rather than a NaN direction.
pub fn drag_force(vel: &Vector3<f64>, density: f64, cd: f64, area: f64) -> Vector3<f64> {
    let speed = vel.norm();
    if speed > 0.0 {
        let q_dyn = 0.5 * density * speed * speed;
        -vel.normalize() * (q_dyn * cd * area)
    } else {
        Vector3::zeros()
    }
}

/// Dynamic pressure `½ ρ |v|²`, Pa.
pub fn dynamic_pressure(vel: &Vector3<f64>, density: f64) -> f64 {
    0.5 * density * vel.norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn drag_opposes_velocity() {
        let vel = Vector3::new(0.0, 0.0, -300.0);
        let f = drag_force(&vel, 0.017, 1.0, 3.14);
        assert!(f.z > 0.0, "Drag should oppose downward velocity");
        assert!(f.x.abs() < 1e-12 && f.y.abs() < 1e-12);
    }

    #[test]
    fn drag_magnitude() {
        let vel = Vector3::new(30.0, 40.0, 0.0);
        let f = drag_force(&vel, 0.01, 2.0, 20.0);
        assert_relative_eq!(f.norm(), 0.5 * 0.01 * 2500.0 * 2.0 * 20.0, max_relative = 1e-12);
        assert_relative_eq!(dynamic_pressure(&vel, 0.01), 12.5, max_relative = 1e-12);
    }

    #[test]
    fn no_drag_at_rest() {
        let f = drag_force(&Vector3::zeros(), 0.017, 1.0, 3.14);
        assert_eq!(f, Vector3::zeros());
    }

    #[test]
    fn no_drag_in_vacuum() {
        let f = drag_force(&Vector3::new(1000.0, 0.0, 0.0), 0.0, 1.0, 3.14);
        assert!(f.norm() == 0.0);
    }
}
