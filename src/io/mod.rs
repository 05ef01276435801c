pub mod csv;
pub mod json;
pub mod telemetry;

pub use telemetry::{
    FileTelemetrySink, MemoryTelemetrySink, NullTelemetrySink, TelemetrySample, TelemetrySink,
};
