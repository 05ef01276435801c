use std::io::{self, Write};
use std::path::Path;

use crate::dynamics::state::{ParachuteState, Snapshot};

/// Write trajectory data to CSV format.
///
/// Columns: time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z,
///          altitude, closing_rate, throttle, fuel, parachute
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &[Snapshot]) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,\
         altitude,closing_rate,throttle,fuel,parachute"
    )?;

    for s in trajectory {
        writeln!(
            writer,
            "{:.2},{:.3},{:.3},{:.3},{:.4},{:.4},{:.4},\
             {:.3},{:.4},{:.4},{:.6},{}",
            s.time,
            s.pos.x, s.pos.y, s.pos.z,
            s.vel.x, s.vel.y, s.vel.z,
            s.altitude(),
            s.closing_rate(),
            s.throttle,
            s.fuel,
            parachute_label(s.parachute),
        )?;
    }

    Ok(())
}

fn parachute_label(state: ParachuteState) -> &'static str {
    match state {
        ParachuteState::NotDeployed => "not_deployed",
        ParachuteState::Deployed => "deployed",
        ParachuteState::Lost => "lost",
    }
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, trajectory: &[Snapshot]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, trajectory)?;
    file.flush()
}
