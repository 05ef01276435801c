use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::gnc::AutopilotGains;

// ---------------------------------------------------------------------------
// Autopilot telemetry: (altitude, closing rate) per tick
// ---------------------------------------------------------------------------

/// One autopilot observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub altitude: f64,       // m
    pub closing_rate: f64,   // m/s, negative while descending
}

/// Append-only destination for autopilot samples, in arrival order.
pub trait TelemetrySink {
    fn append(&mut self, sample: TelemetrySample) -> io::Result<()>;
}

/// Discards every sample.
#[derive(Debug, Default)]
pub struct NullTelemetrySink;

impl TelemetrySink for NullTelemetrySink {
    fn append(&mut self, _sample: TelemetrySample) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps samples in memory.
#[derive(Debug, Default)]
pub struct MemoryTelemetrySink {
    pub samples: Vec<TelemetrySample>,
}

impl TelemetrySink for MemoryTelemetrySink {
    fn append(&mut self, sample: TelemetrySample) -> io::Result<()> {
        self.samples.push(sample);
        Ok(())
    }
}

/// Writes `"<altitude> <closing_rate>"` lines to a text file.
///
/// The file is truncated when the first sample of a run arrives, so a fresh
/// run never mixes with a previous one.
pub struct FileTelemetrySink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileTelemetrySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), writer: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl TelemetrySink for FileTelemetrySink {
    fn append(&mut self, sample: TelemetrySample) -> io::Result<()> {
        if self.writer.is_none() {
            log::debug!("Opening telemetry file {}", self.path.display());
            self.writer = Some(BufWriter::new(File::create(&self.path)?));
        }
        if let Some(w) = self.writer.as_mut() {
            writeln!(w, "{} {}", sample.altitude, sample.closing_rate)?;
        }
        Ok(())
    }
}

impl Drop for FileTelemetrySink {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::warn!("Failed to flush telemetry to {}: {}", self.path.display(), e);
        }
    }
}

/// Read a telemetry file written by [`FileTelemetrySink`].
pub fn read_telemetry<R: io::Read>(reader: R) -> io::Result<Vec<TelemetrySample>> {
    let mut samples = Vec::new();
    for (n, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.split_whitespace().map(str::parse::<f64>);
        match (cols.next(), cols.next()) {
            (Some(Ok(altitude)), Some(Ok(closing_rate))) => {
                samples.push(TelemetrySample { altitude, closing_rate })
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed telemetry line {}: {:?}", n + 1, line),
                ))
            }
        }
    }
    Ok(samples)
}

/// Read telemetry from a file path.
pub fn read_telemetry_file(path: impl AsRef<Path>) -> io::Result<Vec<TelemetrySample>> {
    read_telemetry(File::open(path)?)
}

/// Closing rate the autopilot steers toward at `altitude`:
/// `-(target_offset + kh·h)`.
pub fn ideal_closing_rate(altitude: f64, gains: &AutopilotGains) -> f64 {
    -(gains.target_offset + gains.kh * altitude)
}

/// Descents starting above this altitude are not plotted against the ideal
/// profile: the autopilot spends most of the run catching up with it.
pub const IDEAL_PROFILE_CEILING: f64 = 190_000.0;

/// Whether a recorded descent starts low enough to compare with
/// [`ideal_closing_rate`].
pub fn starts_on_ideal_profile(samples: &[TelemetrySample]) -> bool {
    samples
        .first()
        .is_some_and(|s| s.altitude <= IDEAL_PROFILE_CEILING)
}
