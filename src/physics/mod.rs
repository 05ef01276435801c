pub mod aerodynamics;
pub mod atmosphere;
pub mod gravity;

pub use aerodynamics::drag_force;
pub use atmosphere::{Atmosphere, MarsAtmosphere, Vacuum, EXOSPHERE};
pub use gravity::{gravity_accel, gravity_force, MARS_MASS, MARS_RADIUS, MU_MARS};
